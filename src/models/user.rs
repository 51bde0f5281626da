use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::entities::users::{self, ApprovalStatus};

/// Registration payload. Document keys arrive from the upload flow, which is
/// an external collaborator; only the references are stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub postal_code: String,
    pub street: String,
    pub street_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_front_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_back_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selfie_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserListQuery {
    pub status: Option<String>,
}

/// Listing view of an account: enough for the approval queue, nothing more.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub approval_status: ApprovalStatus,
    pub doc_front_key: Option<String>,
    pub doc_back_key: Option<String>,
    pub selfie_key: Option<String>,
    pub created_at: Option<DateTimeWithTimeZone>,
}

impl From<users::Model> for UserSummary {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            cpf: user.cpf,
            phone: user.phone,
            city: user.city,
            state: user.state,
            approval_status: user.approval_status,
            doc_front_key: user.doc_front_key,
            doc_back_key: user.doc_back_key,
            selfie_key: user.selfie_key,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetailResponse {
    pub user: users::Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalUpdateRequest {
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalUpdateResponse {
    pub message: String,
    pub user: UserSummary,
}
