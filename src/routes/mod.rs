pub mod categories;
pub mod expenses;
pub mod seed;
pub mod trips;

use axum::{routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    // Development posture: any origin, any method, any header.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_root))
        .route("/health", get(health))
        .merge(trips::router())
        .merge(expenses::router())
        .merge(categories::router())
        .merge(seed::router())
        .layer(cors)
        .with_state(state)
}

async fn health_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Expense Tracker API is running",
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
