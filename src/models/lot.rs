use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::lots;
use crate::models::bid::BidWithBidder;

/// Payload for creating a lot. Title, description, starting bid, and close
/// time are required; the bidding window defaults to opening immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotRequest {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub starting_bid: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opens_at: Option<DateTime<Utc>>,
    pub closes_at: DateTime<Utc>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Partial update: absent fields leave the stored value unchanged. Status is
/// deliberately not part of this payload; the lifecycle moves only through
/// bid acceptance, cancel, and finalize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLotRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub starting_bid: Option<Decimal>,
    pub opens_at: Option<DateTime<Utc>>,
    pub closes_at: Option<DateTime<Utc>>,
    pub photo_urls: Option<Vec<String>>,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LotListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LotWithStats {
    #[serde(flatten)]
    pub lot: lots::Model,
    pub bid_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LotListResponse {
    pub lots: Vec<LotWithStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LotDetailResponse {
    #[serde(flatten)]
    pub lot: lots::Model,
    pub bid_count: u64,
    pub bids: Vec<BidWithBidder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LotMutationResponse {
    pub message: String,
    pub lot: lots::Model,
}
