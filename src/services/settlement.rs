//! Lot settlement: winner selection, fee computation, and the guarded
//! `active → finalized` transition.
//!
//! Finalization is a one-way transition taken at most once per lot. The
//! summary itself is a read-time projection over persisted rows: the
//! read-only [`settlement_summary`] recomputes it for an already-finalized
//! lot and returns identical output as long as nothing was written in
//! between.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::fmt;
use tracing::info;

use crate::entities::lots::LotStatus;
use crate::entities::{bids, lots, prelude::*, users};
use crate::models::settlement::{
    SettledLot, SettledWinner, SettlementAmounts, SettlementSummary,
};
use crate::services::auth;

/// Auctioneer commission applied to the winning bid
pub const AUCTIONEER_COMMISSION_RATE: Decimal = dec!(0.05);

/// Administrative fee applied to the winning bid
pub const ADMIN_FEE_RATE: Decimal = dec!(0.02);

#[derive(Debug)]
pub enum SettlementError {
    /// Caller does not hold the admin capability
    Unauthorized,
    LotNotFound,
    /// Lot already left the active state; finalize is one-way
    AlreadyFinalized,
    /// Summary requested for a lot that was never finalized
    NotFinalized,
    /// A lot cannot be settled without a winner
    NoBids,
    Database(DbErr),
}

impl fmt::Display for SettlementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementError::Unauthorized => write!(f, "Administrator capability required"),
            SettlementError::LotNotFound => write!(f, "Lot not found"),
            SettlementError::AlreadyFinalized => {
                write!(f, "This lot is no longer active and cannot be finalized again")
            }
            SettlementError::NotFinalized => write!(f, "This lot has not been finalized"),
            SettlementError::NoBids => write!(f, "No bids recorded for this lot"),
            SettlementError::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for SettlementError {}

impl From<DbErr> for SettlementError {
    fn from(e: DbErr) -> Self {
        SettlementError::Database(e)
    }
}

/// Fee breakdown for a winning bid amount, rounded to cents.
pub fn amounts_for(bid_amount: Decimal) -> SettlementAmounts {
    let commission = (bid_amount * AUCTIONEER_COMMISSION_RATE).round_dp(2);
    let admin_fee = (bid_amount * ADMIN_FEE_RATE).round_dp(2);

    SettlementAmounts {
        bid_amount,
        commission,
        admin_fee,
        total: bid_amount + commission + admin_fee,
    }
}

/// One-line postal address for the winner; empty optional parts are omitted.
pub fn format_address(user: &users::Model) -> String {
    let mut parts = vec![user.street.clone(), user.street_number.clone()];
    if let Some(complement) = &user.complement {
        if !complement.is_empty() {
            parts.push(complement.clone());
        }
    }
    parts.push(user.district.clone());
    parts.push(format!("{}/{}", user.city, user.state));
    parts.push(format!("CEP: {}", user.postal_code));
    parts.join(", ")
}

fn money(value: Decimal) -> String {
    format!("{value:.2}").replace('.', ",")
}

/// Notification text for manual dispatch (chat/email). The dispatch channel
/// itself is an external collaborator; responsibility ends at this string.
pub fn notification_text(summary: &SettlementSummary) -> String {
    format!(
        "\u{1F3C6} *AUCTION SETTLED - REVERSA AUCTIONS*\n\
         \n\
         \u{1F4E6} *LOT #{number}:* {title}\n\
         \u{1F4DD} *Description:* {description}\n\
         \n\
         \u{1F464} *WINNER:*\n\
         Name: {name}\n\
         CPF: {cpf}\n\
         Phone: {phone}\n\
         Email: {email}\n\
         Address: {address}\n\
         \n\
         \u{1F4B0} *AMOUNTS:*\n\
         Winning bid: R$ {bid}\n\
         Auctioneer commission (5%): R$ {commission}\n\
         Administrative fee (2%): R$ {admin_fee}\n\
         \n\
         \u{1F4B5} *TOTAL DUE: R$ {total}*\n\
         \n\
         \u{1F4C5} Winning bid placed at: {won_at}\n\
         \n\
         \u{26A0} *IMPORTANT:*\n\
         - Payment is due within 48 hours\n\
         - Backing out is subject to a 20% penalty plus fees\n\
         - Pickup within 5 business days after payment\n\
         \n\
         ---\n\
         Reversa Auctions - Reverse Logistics",
        number = summary.lot.number,
        title = summary.lot.title,
        description = summary.lot.description,
        name = summary.winner.name,
        cpf = summary.winner.cpf,
        phone = summary.winner.phone,
        email = summary.winner.email,
        address = summary.winner.address,
        bid = money(summary.amounts.bid_amount),
        commission = money(summary.amounts.commission),
        admin_fee = money(summary.amounts.admin_fee),
        total = money(summary.amounts.total),
        won_at = summary.won_at.format("%d/%m/%Y %H:%M"),
    )
}

/// Winning bid for a lot: highest amount, earliest placement on a tie.
/// Ties cannot arise under the strict-increase rule, but the ordering is
/// still fully defined.
async fn winning_bid<C: ConnectionTrait>(
    conn: &C,
    lot_id: i32,
) -> Result<Option<(bids::Model, users::Model)>, DbErr> {
    let Some(bid) = Bids::find()
        .filter(bids::Column::LotId.eq(lot_id))
        .order_by_desc(bids::Column::Amount)
        .order_by_asc(bids::Column::CreatedAt)
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let bidder = Users::find_by_id(bid.bidder_id)
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("bidder {} for bid {}", bid.bidder_id, bid.id)))?;

    Ok(Some((bid, bidder)))
}

fn build_summary(
    lot: &lots::Model,
    bid: &bids::Model,
    winner: &users::Model,
    finalized_at: DateTimeWithTimeZone,
) -> SettlementSummary {
    SettlementSummary {
        lot: SettledLot {
            id: lot.id,
            number: lot.number,
            title: lot.title.clone(),
            description: lot.description.clone(),
        },
        winner: SettledWinner {
            name: winner.name.clone(),
            email: winner.email.clone(),
            cpf: winner.cpf.clone(),
            phone: winner.phone.clone(),
            address: format_address(winner),
        },
        amounts: amounts_for(bid.amount),
        won_at: bid.created_at,
        finalized_at,
    }
}

/// Finalize a lot: select the winner, compute fees, and take the one-way
/// `active → finalized` transition.
///
/// The status check and the status write run in one transaction holding the
/// lot row under `FOR UPDATE`, so a concurrent second finalize observes the
/// terminal state and fails with `AlreadyFinalized` instead of recomputing.
pub async fn finalize_lot(
    db: &DatabaseConnection,
    lot_id: i32,
    caller_user_id: i32,
) -> Result<SettlementSummary, SettlementError> {
    if !auth::is_admin(db, caller_user_id).await? {
        return Err(SettlementError::Unauthorized);
    }

    let txn = db.begin().await?;

    let lot = Lots::find_by_id(lot_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(SettlementError::LotNotFound)?;

    if lot.status != LotStatus::Active {
        return Err(SettlementError::AlreadyFinalized);
    }

    let (bid, winner) = winning_bid(&txn, lot.id)
        .await?
        .ok_or(SettlementError::NoBids)?;

    let finalized_at: DateTimeWithTimeZone = Utc::now().into();

    let mut active: lots::ActiveModel = lot.clone().into();
    active.status = Set(LotStatus::Finalized);
    active.finalized_at = Set(Some(finalized_at));
    active.update(&txn).await?;

    txn.commit().await?;

    info!(
        lot_id,
        winner_id = winner.id,
        amount = %bid.amount,
        "lot finalized"
    );

    Ok(build_summary(&lot, &bid, &winner, finalized_at))
}

/// Recompute the settlement summary of an already-finalized lot without
/// writing anything. Uses the stored finalization timestamp, so repeated
/// reads are identical.
pub async fn settlement_summary(
    db: &DatabaseConnection,
    lot_id: i32,
    caller_user_id: i32,
) -> Result<SettlementSummary, SettlementError> {
    if !auth::is_admin(db, caller_user_id).await? {
        return Err(SettlementError::Unauthorized);
    }

    let lot = Lots::find_by_id(lot_id)
        .one(db)
        .await?
        .ok_or(SettlementError::LotNotFound)?;

    let finalized_at = match (lot.status, lot.finalized_at) {
        (LotStatus::Finalized, Some(at)) => at,
        _ => return Err(SettlementError::NotFinalized),
    };

    let (bid, winner) = winning_bid(db, lot.id)
        .await?
        .ok_or(SettlementError::NoBids)?;

    Ok(build_summary(&lot, &bid, &winner, finalized_at))
}
