use std::sync::Once;
use std::time::Duration;

use chrono::Utc;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, FromRow};

use crate::error::AppError;
use crate::models::{Category, Expense, Trip, User};
use crate::schemas::{ExpenseCreate, TripCreate};

pub type DbPool = AnyPool;

/// Which relational backend a database URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Postgres,
}

impl StoreKind {
    pub fn from_url(database_url: &str) -> Self {
        if database_url.starts_with("sqlite") {
            StoreKind::Sqlite
        } else {
            StoreKind::Postgres
        }
    }
}

/// SQLAlchemy-era deployments hand out `postgres://` URLs; the driver wants
/// `postgresql://`.
fn normalize_postgres_scheme(database_url: &str) -> String {
    if let Some(rest) = database_url.strip_prefix("postgres://") {
        format!("postgresql://{rest}")
    } else {
        database_url.to_string()
    }
}

static INSTALL_DRIVERS: Once = Once::new();

pub async fn init_pool(database_url: &str) -> Result<DbPool, AppError> {
    // The Any driver registry accepts exactly one installation per process.
    INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

    let pool = match StoreKind::from_url(database_url) {
        StoreKind::Sqlite => {
            // mode=rwc so a fresh local database file is created on first run.
            let url = if database_url.contains('?') {
                database_url.to_string()
            } else {
                format!("{database_url}?mode=rwc")
            };
            AnyPoolOptions::new().max_connections(10).connect(&url).await?
        }
        StoreKind::Postgres => {
            let url = normalize_postgres_scheme(database_url);
            // Close connections as soon as they are released so an external
            // transaction pooler (e.g. Supabase on port 6543) sees one
            // short-lived connection per request.
            AnyPoolOptions::new()
                .max_connections(10)
                .max_lifetime(Duration::ZERO)
                .connect(&url)
                .await?
        }
    };

    Ok(pool)
}

/// Issue `CREATE TABLE IF NOT EXISTS` for the whole schema. There is no
/// migration system; schema changes need manual intervention or a fresh store.
pub async fn create_tables(pool: &DbPool, kind: StoreKind) -> Result<(), AppError> {
    let pk = match kind {
        StoreKind::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        StoreKind::Postgres => "BIGSERIAL PRIMARY KEY",
    };

    let statements = [
        format!(
            "CREATE TABLE IF NOT EXISTS users (
                id {pk},
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS trips (
                id {pk},
                name TEXT NOT NULL,
                description TEXT,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                user_id BIGINT NOT NULL REFERENCES users (id)
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS categories (
                id {pk},
                name TEXT NOT NULL UNIQUE,
                description TEXT
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS expenses (
                id {pk},
                amount DOUBLE PRECISION NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                user_id BIGINT NOT NULL REFERENCES users (id),
                trip_id BIGINT REFERENCES trips (id),
                category_id BIGINT REFERENCES categories (id)
            )"
        ),
    ];

    for statement in &statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// The single implicit owner of all data until real authentication lands.
pub const DUMMY_USERNAME: &str = "dummy_user";

pub async fn get_or_create_dummy_user(pool: &DbPool) -> Result<User, sqlx::Error> {
    let existing = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE username = $1",
    )
    .bind(DUMMY_USERNAME)
    .fetch_optional(pool)
    .await?;

    if let Some(user) = existing {
        return Ok(user);
    }

    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, created_at) VALUES ($1, $2, $3)
         RETURNING id, username, email, created_at",
    )
    .bind(DUMMY_USERNAME)
    .bind("dummy@example.com")
    .bind(Utc::now().to_rfc3339())
    .fetch_one(pool)
    .await
}

pub async fn insert_trip(
    pool: &DbPool,
    trip: &TripCreate,
    user_id: i64,
) -> Result<Trip, sqlx::Error> {
    sqlx::query_as::<_, Trip>(
        "INSERT INTO trips (name, description, start_date, end_date, user_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, name, description, start_date, end_date, user_id",
    )
    .bind(&trip.name)
    .bind(&trip.description)
    .bind(trip.start_date.to_string())
    .bind(trip.end_date.to_string())
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn list_trips(pool: &DbPool, skip: i64, limit: i64) -> Result<Vec<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>(
        "SELECT id, name, description, start_date, end_date, user_id
         FROM trips LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await
}

pub async fn find_trip(pool: &DbPool, trip_id: i64) -> Result<Option<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>(
        "SELECT id, name, description, start_date, end_date, user_id
         FROM trips WHERE id = $1",
    )
    .bind(trip_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_trip_by_name(pool: &DbPool, name: &str) -> Result<Option<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>(
        "SELECT id, name, description, start_date, end_date, user_id
         FROM trips WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn insert_expense(
    pool: &DbPool,
    expense: &ExpenseCreate,
    user_id: i64,
) -> Result<Expense, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        "INSERT INTO expenses (amount, description, date, user_id, trip_id, category_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, amount, description, date, user_id, trip_id, category_id",
    )
    .bind(expense.amount)
    .bind(&expense.description)
    .bind(expense.date.to_string())
    .bind(user_id)
    .bind(expense.trip_id)
    .bind(expense.category_id)
    .fetch_one(pool)
    .await
}

/// An expense row joined with the names of its (optional) category and trip,
/// so read schemas can nest simplified representations without extra queries.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseJoined {
    pub id: i64,
    pub amount: f64,
    pub description: Option<String>,
    pub date: String,
    pub user_id: i64,
    pub trip_id: Option<i64>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub trip_name: Option<String>,
}

const EXPENSE_JOIN: &str = "SELECT e.id, e.amount, e.description, e.date, e.user_id,
        e.trip_id, e.category_id, c.name AS category_name, t.name AS trip_name
     FROM expenses e
     LEFT JOIN categories c ON c.id = e.category_id
     LEFT JOIN trips t ON t.id = e.trip_id";

pub async fn list_expenses(
    pool: &DbPool,
    trip_id: Option<i64>,
) -> Result<Vec<ExpenseJoined>, sqlx::Error> {
    match trip_id {
        Some(trip_id) => {
            sqlx::query_as::<_, ExpenseJoined>(&format!("{EXPENSE_JOIN} WHERE e.trip_id = $1"))
                .bind(trip_id)
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query_as::<_, ExpenseJoined>(EXPENSE_JOIN)
                .fetch_all(pool)
                .await
        }
    }
}

pub async fn find_expense_joined(
    pool: &DbPool,
    expense_id: i64,
) -> Result<Option<ExpenseJoined>, sqlx::Error> {
    sqlx::query_as::<_, ExpenseJoined>(&format!("{EXPENSE_JOIN} WHERE e.id = $1"))
        .bind(expense_id)
        .fetch_optional(pool)
        .await
}

/// Returns `true` when a row was actually deleted.
pub async fn delete_expense(pool: &DbPool, expense_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
        .bind(expense_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Store-side sum of all expense amounts for a trip; 0.0 when there are none.
pub async fn sum_trip_expenses(pool: &DbPool, trip_id: i64) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(amount), 0.0) FROM expenses WHERE trip_id = $1",
    )
    .bind(trip_id)
    .fetch_one(pool)
    .await
}

pub async fn list_categories(pool: &DbPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories")
        .fetch_all(pool)
        .await
}

pub async fn find_category_by_name(
    pool: &DbPool,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn insert_category(
    pool: &DbPool,
    name: &str,
    description: &str,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, description) VALUES ($1, $2)
         RETURNING id, name, description",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}
