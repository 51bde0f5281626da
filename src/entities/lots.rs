//! SeaORM entity for auction lots.
//!
//! A lot is the unit under auction: a bundle of returned goods with a
//! starting bid, a bidding window, and a one-way status lifecycle.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "lots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Sequential display number shown to users ("Lot #42")
    pub number: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Origin category, free string (e.g. "Marketplace Return", "Damaged Box")
    pub origin: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub starting_bid: Decimal,
    /// Highest accepted bid; None means no bids yet and starting_bid is authoritative
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub current_bid: Option<Decimal>,
    pub status: LotStatus,
    pub opens_at: DateTimeWithTimeZone,
    pub closes_at: DateTimeWithTimeZone,
    /// Photo URLs as a JSON array (at most 20 entries)
    #[sea_orm(column_type = "JsonBinary")]
    pub photo_urls: Json,
    pub video_url: Option<String>,
    /// Stamped exactly once, when the lot is settled
    pub finalized_at: Option<DateTimeWithTimeZone>,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// Lifecycle status. Transitions are one-directional: `Active` may move to
/// `Finalized` or `Cancelled`; terminal states never change again. "Active"
/// does not imply "biddable"; the close time is re-checked on every bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum LotStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "finalized")]
    Finalized,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
