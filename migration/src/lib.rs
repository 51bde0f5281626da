pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_users;
mod m20260801_000002_create_admins;
mod m20260801_000003_create_lots;
mod m20260801_000004_create_bids;
mod m20260801_000005_create_banners;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_users::Migration),
            Box::new(m20260801_000002_create_admins::Migration),
            Box::new(m20260801_000003_create_lots::Migration),
            Box::new(m20260801_000004_create_bids::Migration),
            Box::new(m20260801_000005_create_banners::Migration),
        ]
    }
}
