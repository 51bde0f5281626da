// src/bin/seed.rs
//
// Seeds a development database with the default admin, demo accounts, and a
// handful of open lots with bids. Safe to re-run: existing rows are kept.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;

use reversa_backend::entities::lots::LotStatus;
use reversa_backend::entities::users::ApprovalStatus;
use reversa_backend::entities::{admins, lots, prelude::*, users};
use reversa_backend::services::bidding;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url).await?;

    println!("Running migrations...");
    migration::Migrator::up(&db, None).await?;

    println!("Seeding admin account...");
    let admin_user = ensure_admin(&db, "admin@reversa.test", "Lead Administrator").await?;

    println!("Seeding demo accounts...");
    let maria = ensure_user(
        &db,
        "maria@example.com",
        "Maria Silva",
        "52998224725",
        ApprovalStatus::Approved,
    )
    .await?;
    ensure_user(
        &db,
        "jose@example.com",
        "Jose Santos",
        "11144477735",
        ApprovalStatus::Pending,
    )
    .await?;

    let existing_lots = Lots::find().count(&db).await?;
    if existing_lots > 0 {
        println!("Lots already present ({existing_lots}), skipping lot seed");
        println!("Seed complete");
        return Ok(());
    }

    println!("Seeding lots...");
    let lot_specs: [(&str, &str, Decimal); 4] = [
        (
            "Electronics - notebooks and tablets",
            "Fifteen used notebooks from reverse logistics, assorted brands (Dell, HP, Lenovo), \
             in good condition, plus eight Samsung tablets. All tested and working.",
            dec!(5000),
        ),
        (
            "Smartphones",
            "Thirty smartphones from reverse logistics. Assorted brands: Samsung, Motorola, \
             Xiaomi. Some with minor cosmetic defects; all power on and work.",
            dec!(3500),
        ),
        (
            "Small home appliances",
            "Mixed reverse-logistics appliances: ten blenders, eight mixers, twelve irons, six \
             electric coffee makers. Tested, several in original packaging.",
            dec!(2000),
        ),
        (
            "LED televisions",
            "Eight LED televisions, 32 to 55 inches. LG, Samsung, Philco. All fully working, \
             some with light scratches on the frame.",
            dec!(4000),
        ),
    ];

    let opens_at = Utc::now();
    let closes_at = opens_at + Duration::days(7);

    let mut lot_ids = Vec::new();
    for (index, (title, description, starting_bid)) in lot_specs.iter().enumerate() {
        let lot = lots::ActiveModel {
            number: Set(index as i32 + 1),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            origin: Set(Some("Marketplace Return".to_string())),
            starting_bid: Set(*starting_bid),
            current_bid: Set(None),
            status: Set(LotStatus::Active),
            opens_at: Set(opens_at.into()),
            closes_at: Set(closes_at.into()),
            photo_urls: Set(json!([])),
            video_url: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        println!("  Lot #{}: {}", lot.number, lot.title);
        lot_ids.push(lot.id);
    }

    println!("Seeding bids...");
    let bids: [(usize, i32, Decimal); 5] = [
        (0, maria.id, dec!(5200)),
        (0, admin_user.id, dec!(5500)),
        (1, maria.id, dec!(3800)),
        (1, admin_user.id, dec!(4200)),
        (2, maria.id, dec!(2500)),
    ];
    for (lot_index, bidder_id, amount) in bids {
        bidding::place_bid(&db, lot_ids[lot_index], bidder_id, amount).await?;
    }

    println!("Seed complete");
    Ok(())
}

/// Create the admin capability row and its matching user account, unless
/// they already exist. Returns the user account (used to place demo bids).
async fn ensure_admin(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
) -> Result<users::Model, Box<dyn std::error::Error>> {
    if Admins::find()
        .filter(admins::Column::Email.eq(email))
        .one(db)
        .await?
        .is_none()
    {
        admins::ActiveModel {
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            password_hash: Set(hash_password("adm123")?),
            ..Default::default()
        }
        .insert(db)
        .await?;
        println!("  Admin created: {email}");
    }

    ensure_user(db, email, name, "12345678909", ApprovalStatus::Approved).await
}

async fn ensure_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    cpf: &str,
    approval_status: ApprovalStatus,
) -> Result<users::Model, Box<dyn std::error::Error>> {
    if let Some(user) = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?
    {
        return Ok(user);
    }

    let user = users::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password("password123")?),
        cpf: Set(cpf.to_string()),
        phone: Set("(15) 99999-0000".to_string()),
        postal_code: Set("18095-000".to_string()),
        street: Set("Rua das Flores".to_string()),
        street_number: Set("100".to_string()),
        complement: Set(None),
        district: Set("Centro".to_string()),
        city: Set("Sorocaba".to_string()),
        state: Set("SP".to_string()),
        approval_status: Set(approval_status),
        doc_front_key: Set(None),
        doc_back_key: Set(None),
        selfie_key: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    println!("  User created: {email}");
    Ok(user)
}

fn hash_password(password: &str) -> Result<String, Box<dyn std::error::Error>> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("password hashing failed: {e}").into())
}
