//! Home-page banner endpoints. Listing is public; mutations are admin-only.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;

use crate::AppState;
use crate::entities::{banners, prelude::*};
use crate::handlers::{HandlerError, db_error, require_admin};
use crate::models::MessageResponse;
use crate::models::banner::{
    BannerListQuery, BannerListResponse, BannerMutationResponse, CreateBannerRequest,
    UpdateBannerRequest,
};
use crate::models::error::ErrorResponse;

/// GET /api/banners?active=true
pub async fn list_banners(
    State(state): State<AppState>,
    Query(query): Query<BannerListQuery>,
) -> Result<Json<BannerListResponse>, HandlerError> {
    let mut select = Banners::find().order_by_asc(banners::Column::Position);
    if query.active == Some(true) {
        select = select.filter(banners::Column::Active.eq(true));
    }
    let banners = select.all(&state.db).await.map_err(db_error)?;

    Ok(Json(BannerListResponse { banners }))
}

/// POST /api/admin/banners
pub async fn create_banner(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateBannerRequest>,
) -> Result<(StatusCode, Json<BannerMutationResponse>), HandlerError> {
    require_admin(&state.db, &headers).await?;

    if payload.image_url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Banner image URL is required",
                "INVALID_IMAGE_URL",
            )),
        ));
    }

    let banner = banners::ActiveModel {
        title: Set(payload.title.filter(|title| !title.trim().is_empty())),
        image_url: Set(payload.image_url.trim().to_string()),
        link: Set(payload.link.filter(|link| !link.trim().is_empty())),
        position: Set(payload.position.unwrap_or(0)),
        active: Set(payload.active.unwrap_or(true)),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(banner_id = banner.id, "banner created");

    Ok((
        StatusCode::CREATED,
        Json(BannerMutationResponse {
            message: "Banner created successfully".to_string(),
            banner,
        }),
    ))
}

/// PUT /api/admin/banners/{id} : partial update.
pub async fn update_banner(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(banner_id): Path<i32>,
    Json(payload): Json<UpdateBannerRequest>,
) -> Result<Json<BannerMutationResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let banner = Banners::find_by_id(banner_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(banner_not_found)?;

    let mut active: banners::ActiveModel = banner.into();
    if let Some(title) = payload.title {
        active.title = Set(Some(title).filter(|title| !title.trim().is_empty()));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url.trim().to_string());
    }
    if let Some(link) = payload.link {
        active.link = Set(Some(link).filter(|link| !link.trim().is_empty()));
    }
    if let Some(position) = payload.position {
        active.position = Set(position);
    }
    if let Some(is_active) = payload.active {
        active.active = Set(is_active);
    }

    let banner = active.update(&state.db).await.map_err(db_error)?;

    Ok(Json(BannerMutationResponse {
        message: "Banner updated successfully".to_string(),
        banner,
    }))
}

/// DELETE /api/admin/banners/{id}
pub async fn delete_banner(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(banner_id): Path<i32>,
) -> Result<Json<MessageResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let banner = Banners::find_by_id(banner_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(banner_not_found)?;

    banner.delete(&state.db).await.map_err(db_error)?;

    info!(banner_id, "banner deleted");

    Ok(Json(MessageResponse {
        message: "Banner deleted successfully".to_string(),
    }))
}

fn banner_not_found() -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Banner not found", "BANNER_NOT_FOUND")),
    )
}
