use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted user row. `created_at` is stored as RFC 3339 text so the row
/// decodes on both backends.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}
