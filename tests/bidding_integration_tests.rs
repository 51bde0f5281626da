mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Router, routing::post};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

use reversa_backend::AppState;
use reversa_backend::entities::lots::LotStatus;
use reversa_backend::entities::prelude::*;
use reversa_backend::entities::users::ApprovalStatus;
use reversa_backend::services::bidding::{self, BidError};
use reversa_backend::services::viacep::ViaCepService;

use crate::common::{create_lot, create_user, try_test_db};

#[tokio::test]
async fn test_accepts_bid_above_starting_bid() {
    let Some(db) = try_test_db().await else { return };

    let bidder = create_user(&db, ApprovalStatus::Approved).await;
    let lot = create_lot(&db, dec!(1000), LotStatus::Active, 24).await;

    let bid = bidding::place_bid(&db, lot.id, bidder.id, dec!(1000.01))
        .await
        .expect("bid should be accepted");
    assert_eq!(bid.amount, dec!(1000.01));

    let lot = Lots::find_by_id(lot.id).one(&db).await.unwrap().unwrap();
    assert_eq!(lot.current_bid, Some(dec!(1000.01)));
}

#[tokio::test]
async fn test_rejection_leaves_no_partial_writes() {
    let Some(db) = try_test_db().await else { return };

    let bidder = create_user(&db, ApprovalStatus::Approved).await;
    let lot = create_lot(&db, dec!(1000), LotStatus::Active, 24).await;

    bidding::place_bid(&db, lot.id, bidder.id, dec!(1000.01))
        .await
        .unwrap();

    // Equal amount fails the strict-increase rule and must change nothing
    let err = bidding::place_bid(&db, lot.id, bidder.id, dec!(1000.01))
        .await
        .unwrap_err();
    match &err {
        BidError::BidTooLow { minimum } => assert_eq!(*minimum, dec!(1000.01)),
        other => panic!("expected BidTooLow, got {other:?}"),
    }
    assert!(err.to_string().contains("1000.01"));

    let lot = Lots::find_by_id(lot.id).one(&db).await.unwrap().unwrap();
    assert_eq!(lot.current_bid, Some(dec!(1000.01)));

    let bids = lot_bids(&db, lot.id).await;
    assert_eq!(bids.len(), 1);
}

#[tokio::test]
async fn test_accepted_amounts_are_strictly_increasing() {
    let Some(db) = try_test_db().await else { return };

    let bidder = create_user(&db, ApprovalStatus::Approved).await;
    let lot = create_lot(&db, dec!(100), LotStatus::Active, 24).await;

    for amount in [dec!(101), dec!(150), dec!(150.01), dec!(200)] {
        bidding::place_bid(&db, lot.id, bidder.id, amount)
            .await
            .expect("increasing bid should be accepted");
    }
    assert!(
        bidding::place_bid(&db, lot.id, bidder.id, dec!(199))
            .await
            .is_err()
    );

    let amounts: Vec<_> = lot_bids(&db, lot.id)
        .await
        .into_iter()
        .map(|bid| bid.amount)
        .collect();
    assert_eq!(amounts, vec![dec!(101), dec!(150), dec!(150.01), dec!(200)]);
    assert!(amounts.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_rejects_unapproved_bidder_without_writes() {
    let Some(db) = try_test_db().await else { return };

    let lot = create_lot(&db, dec!(1000), LotStatus::Active, 24).await;

    for approval in [ApprovalStatus::Pending, ApprovalStatus::Rejected] {
        let bidder = create_user(&db, approval).await;
        let err = bidding::place_bid(&db, lot.id, bidder.id, dec!(5000))
            .await
            .unwrap_err();
        assert!(matches!(err, BidError::NotApproved));
    }

    assert!(lot_bids(&db, lot.id).await.is_empty());
}

#[tokio::test]
async fn test_rejects_bid_on_terminal_lot() {
    let Some(db) = try_test_db().await else { return };

    let bidder = create_user(&db, ApprovalStatus::Approved).await;

    for status in [LotStatus::Finalized, LotStatus::Cancelled] {
        let lot = create_lot(&db, dec!(1000), status, 24).await;
        let err = bidding::place_bid(&db, lot.id, bidder.id, dec!(2000))
            .await
            .unwrap_err();
        assert!(matches!(err, BidError::AuctionClosed));
    }
}

#[tokio::test]
async fn test_rejects_bid_after_close_time() {
    let Some(db) = try_test_db().await else { return };

    let bidder = create_user(&db, ApprovalStatus::Approved).await;
    let lot = create_lot(&db, dec!(1000), LotStatus::Active, -1).await;

    let err = bidding::place_bid(&db, lot.id, bidder.id, dec!(2000))
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::AuctionExpired));
}

#[tokio::test]
async fn test_missing_lot_and_bidder_are_reported() {
    let Some(db) = try_test_db().await else { return };

    let bidder = create_user(&db, ApprovalStatus::Approved).await;

    let err = bidding::place_bid(&db, i32::MAX, bidder.id, dec!(100))
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::LotNotFound));

    let lot = create_lot(&db, dec!(100), LotStatus::Active, 24).await;
    let err = bidding::place_bid(&db, lot.id, i32::MAX, dec!(200))
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::BidderNotFound));
}

/// Two concurrent bids A < B over the same lot must never leave the lot at
/// A: either both are accepted in order, or B lands first and A fails the
/// strict-increase check.
#[tokio::test]
async fn test_concurrent_bids_serialize_on_the_lot_row() {
    let Some(db) = try_test_db().await else { return };

    let first = create_user(&db, ApprovalStatus::Approved).await;
    let second = create_user(&db, ApprovalStatus::Approved).await;
    let lot = create_lot(&db, dec!(1000), LotStatus::Active, 24).await;

    let (low, high) = tokio::join!(
        bidding::place_bid(&db, lot.id, first.id, dec!(1100)),
        bidding::place_bid(&db, lot.id, second.id, dec!(1200)),
    );

    // The higher bid always survives
    assert!(high.is_ok(), "higher bid failed: {:?}", high.err());

    let lot_row = Lots::find_by_id(lot.id).one(&db).await.unwrap().unwrap();
    assert_eq!(lot_row.current_bid, Some(dec!(1200)));

    let bids = lot_bids(&db, lot.id).await;
    match low {
        Ok(_) => assert_eq!(bids.len(), 2),
        Err(BidError::BidTooLow { minimum }) => {
            assert_eq!(minimum, dec!(1200));
            assert_eq!(bids.len(), 1);
        }
        Err(other) => panic!("unexpected error for lower bid: {other:?}"),
    }

    let amounts: Vec<_> = bids.into_iter().map(|bid| bid.amount).collect();
    assert!(amounts.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_place_bid_route_requires_identity() {
    let Some(db) = try_test_db().await else { return };

    let app = bid_router(db);
    let request = Request::builder()
        .method("POST")
        .uri("/api/bids")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"lotId": 1, "amount": "100"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_place_bid_route_accepts_and_echoes_current_bid() {
    let Some(db) = try_test_db().await else { return };

    let bidder = create_user(&db, ApprovalStatus::Approved).await;
    let lot = create_lot(&db, dec!(1000), LotStatus::Active, 24).await;

    let app = bid_router(db);
    let request = Request::builder()
        .method("POST")
        .uri("/api/bids")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", bidder.id.to_string())
        .body(Body::from(
            json!({"lotId": lot.id, "amount": "1250.50"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["currentBid"], json!("1250.50"));
    assert_eq!(body["bid"]["lot_id"], json!(lot.id));
}

fn bid_router(db: sea_orm::DatabaseConnection) -> Router {
    let state = AppState {
        db,
        viacep: ViaCepService::new(),
    };
    Router::new()
        .route("/api/bids", post(reversa_backend::handlers::bids::place_bid))
        .with_state(state)
}

/// Bids for a lot in acceptance order. Ids are assigned under the lot's row
/// lock, so ascending id is commit order.
async fn lot_bids(
    db: &sea_orm::DatabaseConnection,
    lot_id: i32,
) -> Vec<reversa_backend::entities::bids::Model> {
    use reversa_backend::entities::bids;
    use sea_orm::{ColumnTrait, QueryFilter, QueryOrder};

    Bids::find()
        .filter(bids::Column::LotId.eq(lot_id))
        .order_by_asc(bids::Column::Id)
        .all(db)
        .await
        .unwrap()
}
