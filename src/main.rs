use axum::{
    Router,
    routing::{get, post, put},
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reversa_backend::services::viacep::ViaCepService;
use reversa_backend::{AppState, handlers};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reversa_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let state = AppState {
        db,
        viacep: ViaCepService::new(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/", get(health))
        .route("/api/lots", get(handlers::lots::list_lots))
        .route("/api/lots/{id}", get(handlers::lots::get_lot))
        .route(
            "/api/bids",
            post(handlers::bids::place_bid).get(handlers::bids::my_bids),
        )
        .route("/api/signup", post(handlers::users::signup))
        .route("/api/banners", get(handlers::banners::list_banners))
        .route("/api/cep/{cep}", get(handlers::cep::lookup_cep))
        .route(
            "/api/admin/lots",
            get(handlers::lots::admin_list_lots).post(handlers::lots::create_lot),
        )
        .route(
            "/api/admin/lots/{id}",
            put(handlers::lots::update_lot).delete(handlers::lots::delete_lot),
        )
        .route(
            "/api/admin/lots/{id}/cancel",
            post(handlers::lots::cancel_lot),
        )
        .route(
            "/api/admin/lots/{id}/finalize",
            post(handlers::settlement::finalize_lot),
        )
        .route(
            "/api/admin/lots/{id}/settlement",
            get(handlers::settlement::get_settlement),
        )
        .route("/api/admin/users", get(handlers::users::admin_list_users))
        .route("/api/admin/users/{id}", get(handlers::users::admin_get_user))
        .route(
            "/api/admin/users/{id}/approval",
            put(handlers::users::admin_update_approval),
        )
        .route("/api/admin/bids", get(handlers::bids::admin_bid_history))
        .route("/api/admin/banners", post(handlers::banners::create_banner))
        .route(
            "/api/admin/banners/{id}",
            put(handlers::banners::update_banner).delete(handlers::banners::delete_banner),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

async fn health() -> &'static str {
    "Reversa Auctions backend"
}
