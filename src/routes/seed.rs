use axum::{extract::State, routing::post, Json, Router};

use crate::error::AppError;
use crate::seed::seed_demo_data;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/seed", post(seed))
}

async fn seed(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let message = seed_demo_data(&state.db).await?;
    Ok(Json(serde_json::json!({ "message": message })))
}
