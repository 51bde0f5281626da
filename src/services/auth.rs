//! Administrator capability checks.
//!
//! The upstream session layer authenticates requests and supplies a user
//! id; whether that user holds the admin capability is decided here, by a
//! lookup against the `admins` table through the user's email.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::entities::{admins, prelude::*};

/// Resolve the caller to an admin capability row, if any.
pub async fn find_admin(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<admins::Model>, DbErr> {
    let Some(user) = Users::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };

    Admins::find()
        .filter(admins::Column::Email.eq(user.email))
        .one(db)
        .await
}

pub async fn is_admin(db: &DatabaseConnection, user_id: i32) -> Result<bool, DbErr> {
    Ok(find_admin(db, user_id).await?.is_some())
}
