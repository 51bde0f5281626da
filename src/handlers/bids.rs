//! Bid placement and bid history endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::AppState;
use crate::entities::{bids, lots, prelude::*, users};
use crate::handlers::{HandlerError, authenticated_user, db_error, require_admin};
use crate::models::bid::{
    BidHistoryEntry, BidHistoryQuery, BidHistoryResponse, BidderAdminView, OwnBidEntry,
    OwnBidsResponse, PlaceBidRequest, PlaceBidResponse,
};
use crate::models::error::ErrorResponse;
use crate::services::bidding::{self, BidError};

/// POST /api/bids
pub async fn place_bid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PlaceBidRequest>,
) -> Result<Json<PlaceBidResponse>, HandlerError> {
    let bidder_id = authenticated_user(&headers)?;
    let correlation_id = uuid::Uuid::new_v4().to_string();

    info!(
        correlation_id = %correlation_id,
        lot_id = payload.lot_id,
        bidder_id,
        amount = %payload.amount,
        "bid request received"
    );

    let bid = bidding::place_bid(&state.db, payload.lot_id, bidder_id, payload.amount)
        .await
        .map_err(|e| {
            warn!(correlation_id = %correlation_id, error = %e, "bid rejected");
            map_bid_error(e)
        })?;

    Ok(Json(PlaceBidResponse {
        message: "Bid placed successfully!".to_string(),
        current_bid: bid.amount,
        bid,
    }))
}

/// GET /api/bids : the caller's own bids, newest first, with lot context.
pub async fn my_bids(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OwnBidsResponse>, HandlerError> {
    let bidder_id = authenticated_user(&headers)?;

    let bids = Bids::find()
        .filter(bids::Column::BidderId.eq(bidder_id))
        .order_by_desc(bids::Column::CreatedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let lot_ids: Vec<i32> = bids.iter().map(|bid| bid.lot_id).collect();
    let lots_by_id: HashMap<i32, lots::Model> = if lot_ids.is_empty() {
        HashMap::new()
    } else {
        Lots::find()
            .filter(lots::Column::Id.is_in(lot_ids))
            .all(&state.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|lot| (lot.id, lot))
            .collect()
    };

    let entries = bids
        .into_iter()
        .map(|bid| OwnBidEntry {
            lot: lots_by_id.get(&bid.lot_id).cloned(),
            bid,
        })
        .collect();

    Ok(Json(OwnBidsResponse { bids: entries }))
}

/// GET /api/admin/bids?lotId= : full bid history with bidder and lot context.
pub async fn admin_bid_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BidHistoryQuery>,
) -> Result<Json<BidHistoryResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let mut select = Bids::find().order_by_desc(bids::Column::CreatedAt);
    if let Some(lot_id) = query.lot_id {
        select = select.filter(bids::Column::LotId.eq(lot_id));
    }
    let bids = select.all(&state.db).await.map_err(db_error)?;

    let bidder_ids: Vec<i32> = bids.iter().map(|bid| bid.bidder_id).collect();
    let bidders: HashMap<i32, users::Model> = if bidder_ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(users::Column::Id.is_in(bidder_ids))
            .all(&state.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|user| (user.id, user))
            .collect()
    };

    let lot_ids: Vec<i32> = bids.iter().map(|bid| bid.lot_id).collect();
    let lot_titles: HashMap<i32, String> = if lot_ids.is_empty() {
        HashMap::new()
    } else {
        Lots::find()
            .filter(lots::Column::Id.is_in(lot_ids))
            .all(&state.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|lot| (lot.id, lot.title))
            .collect()
    };

    let entries = bids
        .into_iter()
        .map(|bid| {
            let bidder = bidders.get(&bid.bidder_id);
            BidHistoryEntry {
                id: bid.id,
                lot_id: bid.lot_id,
                lot_title: lot_titles.get(&bid.lot_id).cloned().unwrap_or_default(),
                amount: bid.amount,
                created_at: bid.created_at,
                bidder: BidderAdminView {
                    name: bidder.map(|user| user.name.clone()).unwrap_or_default(),
                    email: bidder.map(|user| user.email.clone()).unwrap_or_default(),
                    cpf: bidder.map(|user| user.cpf.clone()).unwrap_or_default(),
                },
            }
        })
        .collect();

    Ok(Json(BidHistoryResponse { bids: entries }))
}

/// Map a bid acceptance failure to an HTTP response.
fn map_bid_error(err: BidError) -> HandlerError {
    let message = err.to_string();
    let (status, code) = match err {
        BidError::BidderNotFound => (StatusCode::NOT_FOUND, "BIDDER_NOT_FOUND"),
        BidError::NotApproved => (StatusCode::FORBIDDEN, "NOT_APPROVED"),
        BidError::LotNotFound => (StatusCode::NOT_FOUND, "LOT_NOT_FOUND"),
        BidError::AuctionClosed => (StatusCode::BAD_REQUEST, "AUCTION_CLOSED"),
        BidError::AuctionExpired => (StatusCode::BAD_REQUEST, "AUCTION_EXPIRED"),
        BidError::BidTooLow { .. } => (StatusCode::BAD_REQUEST, "BID_TOO_LOW"),
        BidError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR"),
    };
    (status, Json(ErrorResponse::new(message, code)))
}
