use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted trip row. Dates are ISO 8601 text in storage; the transport
/// schemas parse them back into `NaiveDate`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub user_id: i64,
}
