// src/lib.rs

use sea_orm::DatabaseConnection;
use services::viacep::ViaCepService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub viacep: ViaCepService,
}

pub mod entities {
    pub mod prelude;
    pub mod admins;
    pub mod banners;
    pub mod bids;
    pub mod lots;
    pub mod users;
}

pub mod services {
    pub mod auth;
    pub mod bidding;
    pub mod cpf;
    pub mod settlement;
    pub mod viacep;
}

pub mod models;
pub mod handlers;
