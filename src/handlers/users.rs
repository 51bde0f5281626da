//! Registration and account administration endpoints.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::{error, info};

use crate::AppState;
use crate::entities::users::ApprovalStatus;
use crate::entities::{prelude::*, users};
use crate::handlers::{HandlerError, db_error, require_admin};
use crate::models::error::ErrorResponse;
use crate::models::user::{
    ApprovalUpdateRequest, ApprovalUpdateResponse, SignupRequest, SignupResponse,
    UserDetailResponse, UserListQuery, UserListResponse, UserSummary,
};
use crate::services::cpf;

/// POST /api/signup
///
/// New accounts start as `pending`; an administrator reviews the uploaded
/// documents and flips the approval status before the account may bid.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), HandlerError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    validate_signup(&payload)?;

    let cpf_digits = cpf::normalize(&payload.cpf);

    let existing = Users::find()
        .filter(
            Condition::any()
                .add(users::Column::Email.eq(payload.email.trim()))
                .add(users::Column::Cpf.eq(cpf_digits.clone())),
        )
        .one(&state.db)
        .await
        .map_err(db_error)?;

    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "An account with this email or CPF already exists",
                "DUPLICATE_ACCOUNT",
            )),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| {
            error!(correlation_id = %correlation_id, error = %e, "password hashing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to process password", "HASH_ERROR")),
            )
        })?
        .to_string();

    let user = users::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        email: Set(payload.email.trim().to_string()),
        password_hash: Set(password_hash),
        cpf: Set(cpf_digits),
        phone: Set(payload.phone.trim().to_string()),
        postal_code: Set(payload.postal_code.trim().to_string()),
        street: Set(payload.street.trim().to_string()),
        street_number: Set(payload.street_number.trim().to_string()),
        complement: Set(payload
            .complement
            .filter(|complement| !complement.trim().is_empty())),
        district: Set(payload.district.trim().to_string()),
        city: Set(payload.city.trim().to_string()),
        state: Set(payload.state.trim().to_uppercase()),
        approval_status: Set(ApprovalStatus::Pending),
        doc_front_key: Set(payload.doc_front_key),
        doc_back_key: Set(payload.doc_back_key),
        selfie_key: Set(payload.selfie_key),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(correlation_id = %correlation_id, user_id = user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Registration complete! Wait for approval.".to_string(),
            user_id: user.id,
        }),
    ))
}

/// GET /api/admin/users?status=
pub async fn admin_list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let mut select = Users::find().order_by_desc(users::Column::CreatedAt);
    if let Some(status) = query.status.as_deref() {
        select = select.filter(users::Column::ApprovalStatus.eq(parse_approval_status(status)?));
    }
    let users = select.all(&state.db).await.map_err(db_error)?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserSummary::from).collect(),
    }))
}

/// GET /api/admin/users/{id} : full record, document keys included.
pub async fn admin_get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
) -> Result<Json<UserDetailResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let user = Users::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserDetailResponse { user }))
}

/// PUT /api/admin/users/{id}/approval
pub async fn admin_update_approval(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
    Json(payload): Json<ApprovalUpdateRequest>,
) -> Result<Json<ApprovalUpdateResponse>, HandlerError> {
    require_admin(&state.db, &headers).await?;

    let user = Users::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(user_not_found)?;

    let mut active: users::ActiveModel = user.into();
    active.approval_status = Set(payload.approval_status);
    let user = active.update(&state.db).await.map_err(db_error)?;

    info!(user_id, status = ?payload.approval_status, "approval status updated");

    Ok(Json(ApprovalUpdateResponse {
        message: "Approval status updated successfully".to_string(),
        user: user.into(),
    }))
}

fn parse_approval_status(value: &str) -> Result<ApprovalStatus, HandlerError> {
    ApprovalStatus::try_from_value(&value.to_string()).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                format!("Unknown approval status '{value}'"),
                "INVALID_STATUS",
            )),
        )
    })
}

fn user_not_found() -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("User not found", "USER_NOT_FOUND")),
    )
}

fn validate_signup(payload: &SignupRequest) -> Result<(), HandlerError> {
    let required = [
        &payload.email,
        &payload.password,
        &payload.name,
        &payload.cpf,
        &payload.phone,
        &payload.postal_code,
        &payload.street,
        &payload.street_number,
        &payload.district,
        &payload.city,
        &payload.state,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "All required fields must be filled",
                "MISSING_FIELDS",
            )),
        ));
    }

    if !cpf::validate(&payload.cpf) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid CPF", "INVALID_CPF")),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SignupRequest {
        SignupRequest {
            email: "maria@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            name: "Maria Silva".to_string(),
            cpf: "529.982.247-25".to_string(),
            phone: "(15) 98888-1111".to_string(),
            postal_code: "18095-100".to_string(),
            street: "Av. General Carneiro".to_string(),
            street_number: "456".to_string(),
            complement: None,
            district: "Alto da Boa Vista".to_string(),
            city: "Sorocaba".to_string(),
            state: "SP".to_string(),
            doc_front_key: None,
            doc_back_key: None,
            selfie_key: None,
        }
    }

    #[test]
    fn test_validate_signup_accepts_complete_request() {
        assert!(validate_signup(&request()).is_ok());
    }

    #[test]
    fn test_validate_signup_rejects_blank_required_field() {
        let mut payload = request();
        payload.city = "   ".to_string();
        let (status, Json(body)) = validate_signup(&payload).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code.as_deref(), Some("MISSING_FIELDS"));
    }

    #[test]
    fn test_validate_signup_rejects_bad_cpf() {
        let mut payload = request();
        payload.cpf = "12345678900".to_string();
        let (status, Json(body)) = validate_signup(&payload).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code.as_deref(), Some("INVALID_CPF"));
    }

    #[test]
    fn test_parse_approval_status() {
        assert!(matches!(
            parse_approval_status("approved"),
            Ok(ApprovalStatus::Approved)
        ));
        assert!(parse_approval_status("unknown").is_err());
    }
}
