//! Postal-code address lookup endpoint.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::handlers::HandlerError;
use crate::models::error::ErrorResponse;
use crate::services::viacep::{CepAddress, CepError};

/// GET /api/cep/{cep}
pub async fn lookup_cep(
    State(state): State<AppState>,
    Path(cep): Path<String>,
) -> Result<Json<CepAddress>, HandlerError> {
    let address = state.viacep.lookup(&cep).await.map_err(map_cep_error)?;
    Ok(Json(address))
}

fn map_cep_error(err: CepError) -> HandlerError {
    let message = err.to_string();
    let (status, code) = match err {
        CepError::InvalidCep => (StatusCode::BAD_REQUEST, "INVALID_CEP"),
        CepError::NotFound => (StatusCode::NOT_FOUND, "CEP_NOT_FOUND"),
        CepError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
    };
    (status, Json(ErrorResponse::new(message, code)))
}
