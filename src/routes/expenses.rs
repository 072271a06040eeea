use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::schemas::{ExpenseCreate, ExpenseOut};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/:expense_id", delete(delete_expense))
}

async fn create_expense(
    State(state): State<AppState>,
    Json(body): Json<ExpenseCreate>,
) -> Result<(StatusCode, Json<ExpenseOut>), AppError> {
    body.validate()?;

    let user = db::get_or_create_dummy_user(&state.db).await?;
    let expense = db::insert_expense(&state.db, &body, user.id).await?;

    // Re-read through the join so the response carries the nested
    // category/trip representations.
    let row = db::find_expense_joined(&state.db, expense.id)
        .await?
        .ok_or_else(|| AppError::Other(anyhow!("expense {} vanished after insert", expense.id)))?;

    Ok((StatusCode::CREATED, Json(ExpenseOut::from_joined(row)?)))
}

#[derive(Debug, Deserialize)]
struct ListExpensesParams {
    /// When absent, expenses across all trips are returned.
    trip_id: Option<i64>,
}

async fn list_expenses(
    State(state): State<AppState>,
    Query(params): Query<ListExpensesParams>,
) -> Result<Json<Vec<ExpenseOut>>, AppError> {
    let rows = db::list_expenses(&state.db, params.trip_id).await?;
    let out = rows
        .into_iter()
        .map(ExpenseOut::from_joined)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(out))
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let message = remove_expense(&state.db, expense_id).await?;
    Ok(Json(serde_json::json!({ "message": message })))
}

pub async fn remove_expense(pool: &DbPool, expense_id: i64) -> Result<String, AppError> {
    if !db::delete_expense(pool, expense_id).await? {
        return Err(AppError::NotFound("Expense not found".to_string()));
    }
    info!("deleted expense {expense_id}");
    Ok("Expense deleted successfully".to_string())
}
