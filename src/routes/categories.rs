use axum::{extract::State, routing::get, Json, Router};

use crate::db;
use crate::error::AppError;
use crate::schemas::CategoryOut;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryOut>>, AppError> {
    let categories = db::list_categories(&state.db).await?;
    Ok(Json(categories.into_iter().map(CategoryOut::from).collect()))
}
