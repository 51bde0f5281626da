use serde::{Deserialize, Serialize};

use crate::entities::banners;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBannerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub position: Option<i32>,
    pub active: Option<bool>,
}

/// Partial update: absent fields leave the stored value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBannerRequest {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub position: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BannerListQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerListResponse {
    pub banners: Vec<banners::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerMutationResponse {
    pub message: String,
    pub banner: banners::Model,
}
