//! Lot finalization and settlement-summary endpoints (admin surface).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use tracing::{info, warn};

use crate::AppState;
use crate::handlers::{HandlerError, authenticated_user};
use crate::models::error::ErrorResponse;
use crate::models::settlement::FinalizeLotResponse;
use crate::services::settlement::{self, SettlementError};

/// POST /api/admin/lots/{id}/finalize
///
/// One-way transition: a second call observes the terminal status and gets
/// `ALREADY_FINALIZED`. Use the GET endpoint to re-read the summary.
pub async fn finalize_lot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lot_id): Path<i32>,
) -> Result<Json<FinalizeLotResponse>, HandlerError> {
    let caller_id = authenticated_user(&headers)?;
    let correlation_id = uuid::Uuid::new_v4().to_string();

    info!(
        correlation_id = %correlation_id,
        lot_id,
        caller_id,
        "finalize request received"
    );

    let summary = settlement::finalize_lot(&state.db, lot_id, caller_id)
        .await
        .map_err(|e| {
            warn!(correlation_id = %correlation_id, error = %e, "finalize failed");
            map_settlement_error(e)
        })?;

    let notification_text = settlement::notification_text(&summary);
    let winner_phone = summary.winner.phone.clone();
    let winner_email = summary.winner.email.clone();

    Ok(Json(FinalizeLotResponse {
        summary,
        notification_text,
        winner_phone,
        winner_email,
    }))
}

/// GET /api/admin/lots/{id}/settlement
///
/// Read-only recomputation for an already-finalized lot. Repeated calls
/// yield identical output as long as nothing was written in between.
pub async fn get_settlement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lot_id): Path<i32>,
) -> Result<Json<FinalizeLotResponse>, HandlerError> {
    let caller_id = authenticated_user(&headers)?;

    let summary = settlement::settlement_summary(&state.db, lot_id, caller_id)
        .await
        .map_err(map_settlement_error)?;

    let notification_text = settlement::notification_text(&summary);
    let winner_phone = summary.winner.phone.clone();
    let winner_email = summary.winner.email.clone();

    Ok(Json(FinalizeLotResponse {
        summary,
        notification_text,
        winner_phone,
        winner_email,
    }))
}

fn map_settlement_error(err: SettlementError) -> HandlerError {
    let message = err.to_string();
    let (status, code) = match err {
        SettlementError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        SettlementError::LotNotFound => (StatusCode::NOT_FOUND, "LOT_NOT_FOUND"),
        SettlementError::AlreadyFinalized => (StatusCode::CONFLICT, "ALREADY_FINALIZED"),
        SettlementError::NotFinalized => (StatusCode::CONFLICT, "NOT_FINALIZED"),
        SettlementError::NoBids => (StatusCode::BAD_REQUEST, "NO_BIDS"),
        SettlementError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR"),
    };
    (status, Json(ErrorResponse::new(message, code)))
}
