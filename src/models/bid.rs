use rust_decimal::Decimal;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::entities::{bids, lots};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidRequest {
    pub lot_id: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidResponse {
    pub message: String,
    pub bid: bids::Model,
    pub current_bid: Decimal,
}

/// Public view of a bidder on lot detail pages.
#[derive(Debug, Clone, Serialize)]
pub struct BidderPublic {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidWithBidder {
    pub id: i32,
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub bidder: BidderPublic,
}

/// One of the caller's own bids, with the lot it targets.
#[derive(Debug, Clone, Serialize)]
pub struct OwnBidEntry {
    #[serde(flatten)]
    pub bid: bids::Model,
    pub lot: Option<lots::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnBidsResponse {
    pub bids: Vec<OwnBidEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidHistoryQuery {
    pub lot_id: Option<i32>,
}

/// Admin view of a bidder: includes the tax id.
#[derive(Debug, Clone, Serialize)]
pub struct BidderAdminView {
    pub name: String,
    pub email: String,
    pub cpf: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidHistoryEntry {
    pub id: i32,
    pub lot_id: i32,
    pub lot_title: String,
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub bidder: BidderAdminView,
}

#[derive(Debug, Clone, Serialize)]
pub struct BidHistoryResponse {
    pub bids: Vec<BidHistoryEntry>,
}
