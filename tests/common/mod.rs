use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;

use reversa_backend::entities::lots::LotStatus;
use reversa_backend::entities::users::ApprovalStatus;
use reversa_backend::entities::{admins, lots, users};

/// Connect to the test database named by TEST_DATABASE_URL and bring the
/// schema up to date. Returns None when the variable is unset so DB-backed
/// tests can skip instead of failing on machines without Postgres.
pub async fn try_test_db() -> Option<DatabaseConnection> {
    let Ok(url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping DB-backed test");
        return None;
    };

    let db = Database::connect(&url)
        .await
        .expect("failed to connect to test database");
    migration::Migrator::up(&db, None)
        .await
        .expect("failed to migrate test database");
    Some(db)
}

/// Unique, checksum-valid CPF derived from a UUID, so parallel tests never
/// collide on the unique index.
pub fn unique_cpf() -> String {
    let seed = uuid::Uuid::new_v4().as_u128();
    let mut digits: Vec<u32> = (0..9).map(|i| ((seed >> (i * 4)) % 10) as u32).collect();

    for n in [9usize, 10] {
        let sum: u32 = digits[..n]
            .iter()
            .zip((2..=n as u32 + 1).rev())
            .map(|(digit, weight)| digit * weight)
            .sum();
        let rest = (sum * 10) % 11;
        digits.push(if rest == 10 { 0 } else { rest });
    }

    digits.into_iter().map(|d| d.to_string()).collect()
}

pub async fn create_user(db: &DatabaseConnection, approval: ApprovalStatus) -> users::Model {
    let tag = uuid::Uuid::new_v4();
    users::ActiveModel {
        name: Set("Test Bidder".to_string()),
        email: Set(format!("bidder-{tag}@test.example")),
        password_hash: Set("test-only".to_string()),
        cpf: Set(unique_cpf()),
        phone: Set("(15) 90000-0000".to_string()),
        postal_code: Set("18095-000".to_string()),
        street: Set("Rua de Teste".to_string()),
        street_number: Set("1".to_string()),
        complement: Set(None),
        district: Set("Centro".to_string()),
        city: Set("Sorocaba".to_string()),
        state: Set("SP".to_string()),
        approval_status: Set(approval),
        doc_front_key: Set(None),
        doc_back_key: Set(None),
        selfie_key: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert test user")
}

/// A user holding the admin capability.
#[allow(dead_code)]
pub async fn create_admin_user(db: &DatabaseConnection) -> users::Model {
    let user = create_user(db, ApprovalStatus::Approved).await;
    admins::ActiveModel {
        email: Set(user.email.clone()),
        name: Set(user.name.clone()),
        password_hash: Set("test-only".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert test admin");
    user
}

pub async fn create_lot(
    db: &DatabaseConnection,
    starting_bid: Decimal,
    status: LotStatus,
    closes_in_hours: i64,
) -> lots::Model {
    let now = Utc::now();
    let number = (uuid::Uuid::new_v4().as_u128() % 2_000_000_000) as i32;
    lots::ActiveModel {
        number: Set(number),
        title: Set("Test lot".to_string()),
        description: Set("Assorted returned goods".to_string()),
        origin: Set(Some("Marketplace Return".to_string())),
        starting_bid: Set(starting_bid),
        current_bid: Set(None),
        status: Set(status),
        opens_at: Set((now - Duration::hours(1)).into()),
        closes_at: Set((now + Duration::hours(closes_in_hours)).into()),
        photo_urls: Set(json!([])),
        video_url: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert test lot")
}
