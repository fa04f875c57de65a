pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthRouterExt;
pub use crate::handlers::AppServices;

/// Shared state threaded through every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: AppServices,
}

/// Assembles the public API surface. Routes that mutate the ledger or touch
/// rentals sit behind bearer authentication; read-only catalog data is open,
/// matching what the counter UI expects.
pub fn api_routes() -> Router<AppState> {
    let materials_read = Router::new()
        .route("/materials", get(handlers::materials::list_materials))
        .route("/materials/:id", get(handlers::materials::get_material));

    let materials_mutate = Router::new()
        .route("/materials", post(handlers::materials::create_material))
        .route("/materials/:id", put(handlers::materials::update_material))
        .route(
            "/materials/:id",
            delete(handlers::materials::delete_material),
        )
        .route(
            "/materials/update-stock",
            post(handlers::materials::update_stock),
        )
        .route(
            "/materials/restore-stock",
            post(handlers::materials::restore_stock),
        )
        .with_auth();

    let customers = Router::new()
        .route("/customers", get(handlers::customers::list_customers))
        .route("/customers", post(handlers::customers::create_customer))
        .route("/customers/:id", get(handlers::customers::get_customer))
        .route("/customers/:id", put(handlers::customers::update_customer))
        .route(
            "/customers/:id",
            delete(handlers::customers::delete_customer),
        );

    let rentals = Router::new()
        .route("/rentals", get(handlers::rentals::list_rentals))
        .route("/rentals", post(handlers::rentals::create_rental))
        .route("/rentals/price", get(handlers::rentals::lookup_price))
        .route("/rentals/:id", get(handlers::rentals::get_rental))
        .route("/rentals/:id", put(handlers::rentals::update_rental))
        .route("/rentals/:id", delete(handlers::rentals::delete_rental))
        .with_auth();

    let suggestions = Router::new()
        .route("/suggestions", get(handlers::suggestions::suggest))
        .with_auth();

    let reports = Router::new()
        .route("/reports", get(handlers::reports::rental_report))
        .with_auth();

    Router::new()
        .merge(materials_read)
        .merge(materials_mutate)
        .merge(customers)
        .merge(rentals)
        .merge(suggestions)
        .merge(reports)
}

pub async fn api_status() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    Json(json!({
        "status": "ok",
        "version": version,
        "service": "rentals-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(json!({
        "status": db_status,
        "database": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
