use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted expense row. `category_id` is nullable in storage even though
/// the create schema requires it; legacy rows without one fall into the
/// "Uncategorized" bucket of the trip summary.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub description: Option<String>,
    pub date: String,
    pub user_id: i64,
    pub trip_id: Option<i64>,
    pub category_id: Option<i64>,
}
