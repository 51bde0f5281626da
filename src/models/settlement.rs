use rust_decimal::Decimal;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

/// Monetary breakdown of a settlement: winning bid plus the two fixed-rate
/// charges, each rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementAmounts {
    pub bid_amount: Decimal,
    pub commission: Decimal,
    pub admin_fee: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledLot {
    pub id: i32,
    pub number: i32,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledWinner {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    /// Single assembled address line, empty optional parts omitted
    pub address: String,
}

/// Read-time projection of a finalized lot. Derived entirely from persisted
/// rows, so recomputing it without intervening writes yields identical
/// output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    pub lot: SettledLot,
    pub winner: SettledWinner,
    pub amounts: SettlementAmounts,
    /// When the winning bid was placed
    pub won_at: DateTimeWithTimeZone,
    pub finalized_at: DateTimeWithTimeZone,
}

/// Finalization response: the structured summary plus the notification text
/// handed to manual dispatch channels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeLotResponse {
    pub summary: SettlementSummary,
    pub notification_text: String,
    pub winner_phone: String,
    pub winner_email: String,
}
