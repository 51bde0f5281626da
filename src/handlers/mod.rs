//! HTTP handlers.
//!
//! Requests are authenticated upstream; the `x-user-id` header carries the
//! session's user id. Capability checks (approval status, admin role) are
//! performed here and in the services against the database.

pub mod banners;
pub mod bids;
pub mod cep;
pub mod lots;
pub mod settlement;
pub mod users;

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use sea_orm::{DatabaseConnection, DbErr};

use crate::models::error::ErrorResponse;
use crate::services::auth;

pub(crate) type HandlerError = (StatusCode, Json<ErrorResponse>);

/// User id of the authenticated caller, as set by the upstream session layer.
pub(crate) fn authenticated_user(headers: &HeaderMap) -> Result<i32, HandlerError> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i32>().ok())
        .ok_or_else(unauthorized)
}

/// Admin guard for the administrative surface: resolves the caller and
/// requires the admin capability.
pub(crate) async fn require_admin(
    db: &DatabaseConnection,
    headers: &HeaderMap,
) -> Result<i32, HandlerError> {
    let user_id = authenticated_user(headers)?;
    match auth::is_admin(db, user_id).await {
        Ok(true) => Ok(user_id),
        Ok(false) => Err(unauthorized()),
        Err(e) => Err(db_error(e)),
    }
}

pub(crate) fn unauthorized() -> HandlerError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Not authorized", "UNAUTHORIZED")),
    )
}

pub(crate) fn db_error(e: DbErr) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            format!("Database error: {e}"),
            "DB_ERROR",
        )),
    )
}
