//! Lot browsing and administration endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::info;

use crate::AppState;
use crate::entities::lots::LotStatus;
use crate::entities::{bids, lots, prelude::*, users};
use crate::handlers::{HandlerError, db_error, require_admin};
use crate::models::MessageResponse;
use crate::models::bid::{BidWithBidder, BidderPublic};
use crate::models::error::ErrorResponse;
use crate::models::lot::{
    CreateLotRequest, LotDetailResponse, LotListQuery, LotListResponse, LotMutationResponse,
    LotWithStats, UpdateLotRequest,
};

/// A lot carries at most this many photos.
const MAX_LOT_PHOTOS: usize = 20;

/// GET /api/lots?status= : public listing, soonest-closing first.
pub async fn list_lots(
    State(state): State<AppState>,
    Query(query): Query<LotListQuery>,
) -> Result<Json<LotListResponse>, HandlerError> {
    let status = parse_status(query.status.as_deref().unwrap_or("active"))?;

    let lots = Lots::find()
        .filter(lots::Column::Status.eq(status))
        .order_by_asc(lots::Column::ClosesAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let lots = with_bid_counts(&state, lots).await?;

    Ok(Json(LotListResponse { lots }))
}

/// GET /api/lots/{id} : lot detail with full bid history.
pub async fn get_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i32>,
) -> Result<Json<LotDetailResponse>, HandlerError> {
    let lot = Lots::find_by_id(lot_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(lot_not_found)?;

    let bids = lot
        .find_related(Bids)
        .order_by_desc(bids::Column::CreatedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

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

    let bid_count = bids.len() as u64;
    let bid_entries = bids
        .into_iter()
        .map(|bid| {
            let bidder = bidders.get(&bid.bidder_id);
            BidWithBidder {
                id: bid.id,
                amount: bid.amount,
                created_at: bid.created_at,
                bidder: BidderPublic {
                    name: bidder.map(|user| user.name.clone()).unwrap_or_default(),
                    email: bidder.map(|user| user.email.clone()).unwrap_or_default(),
                },
            }
        })
        .collect();

    Ok(Json(LotDetailResponse {
        lot,
        bid_count,
        bids: bid_entries,
    }))
}

/// GET /api/admin/lots?status= : admin listing, newest first, optional filter.
pub async fn admin_list_lots(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LotListQuery>,
) -> Result<Json<LotListResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let mut select = Lots::find().order_by_desc(lots::Column::CreatedAt);
    if let Some(status) = query.status.as_deref() {
        select = select.filter(lots::Column::Status.eq(parse_status(status)?));
    }
    let lots = select.all(&state.db).await.map_err(db_error)?;

    let lots = with_bid_counts(&state, lots).await?;

    Ok(Json(LotListResponse { lots }))
}

/// POST /api/admin/lots
pub async fn create_lot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateLotRequest>,
) -> Result<(StatusCode, Json<LotMutationResponse>), HandlerError> {
    require_admin(&state.db, &headers).await?;

    let opens_at = payload.opens_at.unwrap_or_else(Utc::now);
    validate_lot_fields(
        Some(payload.title.as_str()),
        Some(payload.description.as_str()),
        Some(payload.starting_bid),
        opens_at,
        payload.closes_at,
    )?;

    let photo_urls = clean_urls(&payload.photo_urls);
    if photo_urls.len() > MAX_LOT_PHOTOS {
        return Err(too_many_photos());
    }

    let txn = state.db.begin().await.map_err(db_error)?;

    // Sequential display number; the unique index backstops a racing create
    let next_number = Lots::find()
        .order_by_desc(lots::Column::Number)
        .one(&txn)
        .await
        .map_err(db_error)?
        .map(|lot| lot.number + 1)
        .unwrap_or(1);

    let lot = lots::ActiveModel {
        number: Set(next_number),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        origin: Set(payload.origin.filter(|origin| !origin.trim().is_empty())),
        starting_bid: Set(payload.starting_bid),
        current_bid: Set(None),
        status: Set(LotStatus::Active),
        opens_at: Set(opens_at.into()),
        closes_at: Set(payload.closes_at.into()),
        photo_urls: Set(json!(photo_urls)),
        video_url: Set(payload
            .video_url
            .filter(|url| !url.trim().is_empty())),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(db_error)?;

    txn.commit().await.map_err(db_error)?;

    info!(lot_id = lot.id, number = lot.number, "lot created");

    Ok((
        StatusCode::CREATED,
        Json(LotMutationResponse {
            message: "Lot created successfully".to_string(),
            lot,
        }),
    ))
}

/// PUT /api/admin/lots/{id} : partial update; absent fields stay unchanged.
pub async fn update_lot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lot_id): Path<i32>,
    Json(payload): Json<UpdateLotRequest>,
) -> Result<Json<LotMutationResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let lot = Lots::find_by_id(lot_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(lot_not_found)?;

    // Validate the row as it would look after the patch
    let opens_at = payload
        .opens_at
        .unwrap_or_else(|| lot.opens_at.to_utc());
    let closes_at = payload
        .closes_at
        .unwrap_or_else(|| lot.closes_at.to_utc());
    validate_lot_fields(
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.starting_bid,
        opens_at,
        closes_at,
    )?;

    let photo_urls = payload.photo_urls.as_deref().map(clean_urls);
    if let Some(urls) = &photo_urls {
        if urls.len() > MAX_LOT_PHOTOS {
            return Err(too_many_photos());
        }
    }

    let mut active: lots::ActiveModel = lot.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(origin) = payload.origin {
        active.origin = Set(Some(origin).filter(|origin| !origin.trim().is_empty()));
    }
    if let Some(starting_bid) = payload.starting_bid {
        active.starting_bid = Set(starting_bid);
    }
    if let Some(opens_at) = payload.opens_at {
        active.opens_at = Set(opens_at.into());
    }
    if let Some(closes_at) = payload.closes_at {
        active.closes_at = Set(closes_at.into());
    }
    if let Some(urls) = photo_urls {
        active.photo_urls = Set(json!(urls));
    }
    if let Some(video_url) = payload.video_url {
        active.video_url = Set(Some(video_url).filter(|url| !url.trim().is_empty()));
    }

    let lot = active.update(&state.db).await.map_err(db_error)?;

    Ok(Json(LotMutationResponse {
        message: "Lot updated successfully".to_string(),
        lot,
    }))
}

/// POST /api/admin/lots/{id}/cancel : one-way active to cancelled.
pub async fn cancel_lot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lot_id): Path<i32>,
) -> Result<Json<LotMutationResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let txn = state.db.begin().await.map_err(db_error)?;

    let lot = Lots::find_by_id(lot_id)
        .lock_exclusive()
        .one(&txn)
        .await
        .map_err(db_error)?
        .ok_or_else(lot_not_found)?;

    if lot.status != LotStatus::Active {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "Only active lots can be cancelled",
                "LOT_NOT_ACTIVE",
            )),
        ));
    }

    let mut active: lots::ActiveModel = lot.into();
    active.status = Set(LotStatus::Cancelled);
    let lot = active.update(&txn).await.map_err(db_error)?;

    txn.commit().await.map_err(db_error)?;

    info!(lot_id, "lot cancelled");

    Ok(Json(LotMutationResponse {
        message: "Lot cancelled successfully".to_string(),
        lot,
    }))
}

/// DELETE /api/admin/lots/{id} : cascades over the lot's bids first.
pub async fn delete_lot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lot_id): Path<i32>,
) -> Result<Json<MessageResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let txn = state.db.begin().await.map_err(db_error)?;

    let lot = Lots::find_by_id(lot_id)
        .one(&txn)
        .await
        .map_err(db_error)?
        .ok_or_else(lot_not_found)?;

    Bids::delete_many()
        .filter(bids::Column::LotId.eq(lot.id))
        .exec(&txn)
        .await
        .map_err(db_error)?;

    lot.delete(&txn).await.map_err(db_error)?;

    txn.commit().await.map_err(db_error)?;

    info!(lot_id, "lot deleted");

    Ok(Json(MessageResponse {
        message: "Lot deleted successfully".to_string(),
    }))
}

async fn with_bid_counts(
    state: &AppState,
    lots: Vec<lots::Model>,
) -> Result<Vec<LotWithStats>, HandlerError> {
    let mut out = Vec::with_capacity(lots.len());
    for lot in lots {
        let bid_count = lot
            .find_related(Bids)
            .count(&state.db)
            .await
            .map_err(db_error)?;
        out.push(LotWithStats { lot, bid_count });
    }
    Ok(out)
}

fn parse_status(value: &str) -> Result<LotStatus, HandlerError> {
    LotStatus::try_from_value(&value.to_string()).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                format!("Unknown lot status '{value}'"),
                "INVALID_STATUS",
            )),
        )
    })
}

fn lot_not_found() -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Lot not found", "LOT_NOT_FOUND")),
    )
}

fn too_many_photos() -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(
            format!("A lot may carry at most {MAX_LOT_PHOTOS} photos"),
            "TOO_MANY_PHOTOS",
        )),
    )
}

/// Field checks shared by create (all fields present) and update (only the
/// patched fields present).
fn validate_lot_fields(
    title: Option<&str>,
    description: Option<&str>,
    starting_bid: Option<Decimal>,
    opens_at: DateTime<Utc>,
    closes_at: DateTime<Utc>,
) -> Result<(), HandlerError> {
    if let Some(title) = title {
        if title.trim().is_empty() {
            return Err(validation_error("Title must not be empty", "INVALID_TITLE"));
        }
    }
    if let Some(description) = description {
        if description.trim().is_empty() {
            return Err(validation_error(
                "Description must not be empty",
                "INVALID_DESCRIPTION",
            ));
        }
    }
    if let Some(starting_bid) = starting_bid {
        if starting_bid < Decimal::ZERO {
            return Err(validation_error(
                "Starting bid must not be negative",
                "INVALID_STARTING_BID",
            ));
        }
    }
    if closes_at <= opens_at {
        return Err(validation_error(
            "Close time must come after open time",
            "INVALID_WINDOW",
        ));
    }
    Ok(())
}

fn validation_error(message: &str, code: &str) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, code)),
    )
}

/// Drop empty entries and surrounding whitespace from a URL list.
fn clean_urls(urls: &[String]) -> Vec<String> {
    urls.iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 8, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_validate_accepts_well_formed_lot() {
        let (opens, closes) = window();
        let result = validate_lot_fields(
            Some("Returned electronics"),
            Some("Fifteen notebooks"),
            Some(dec!(5000)),
            opens,
            closes,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let (opens, closes) = window();
        let result = validate_lot_fields(Some("   "), Some("desc"), Some(dec!(1)), opens, closes);
        let (status, _) = result.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validate_rejects_blank_description() {
        let (opens, closes) = window();
        let result = validate_lot_fields(Some("Lot"), Some(""), Some(dec!(1)), opens, closes);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_negative_starting_bid() {
        let (opens, closes) = window();
        let result =
            validate_lot_fields(Some("Lot"), Some("desc"), Some(dec!(-0.01)), opens, closes);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_accepts_zero_starting_bid() {
        let (opens, closes) = window();
        let result = validate_lot_fields(Some("Lot"), Some("desc"), Some(dec!(0)), opens, closes);
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let (opens, closes) = window();
        let result = validate_lot_fields(Some("Lot"), Some("desc"), Some(dec!(1)), closes, opens);
        assert!(result.is_err());

        // Equal open and close times are also rejected
        let result = validate_lot_fields(Some("Lot"), Some("desc"), Some(dec!(1)), opens, opens);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_skips_absent_patch_fields() {
        let (opens, closes) = window();
        let result = validate_lot_fields(None, None, None, opens, closes);
        assert!(result.is_ok());
    }

    #[test]
    fn test_clean_urls_drops_empty_entries() {
        let urls = vec![
            " https://img.example/a.jpg ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "https://img.example/b.jpg".to_string(),
        ];
        assert_eq!(
            clean_urls(&urls),
            vec![
                "https://img.example/a.jpg".to_string(),
                "https://img.example/b.jpg".to_string(),
            ]
        );
    }
}
