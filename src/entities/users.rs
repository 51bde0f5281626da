//! SeaORM entity for bidder accounts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string; never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Tax id (CPF), digits only
    pub cpf: String,
    pub phone: String,
    pub postal_code: String,
    pub street: String,
    pub street_number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    /// Two-letter state code
    pub state: String,
    /// Only `Approved` accounts may have bids accepted
    pub approval_status: ApprovalStatus,
    /// Storage keys for the verification documents uploaded at signup
    pub doc_front_key: Option<String>,
    pub doc_back_key: Option<String>,
    pub selfie_key: Option<String>,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
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
