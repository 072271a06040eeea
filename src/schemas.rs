//! Transport contracts for the HTTP boundary.
//!
//! These are deliberately separate from the persisted row types in
//! [`crate::models`]: what a client may send or receive is not the same
//! contract as what the store holds.

use std::collections::BTreeMap;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::ExpenseJoined;
use crate::error::AppError;
use crate::models::{Category, Trip, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryOut {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryOut {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

/// Minimal nested representation of a related entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleCategory {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleTrip {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub trip_id: Option<i64>,
    pub category_id: i64,
}

impl ExpenseCreate {
    /// Rejects non-positive amounts before any row is written.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.amount <= 0.0 {
            return Err(AppError::Validation(
                "amount must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseOut {
    pub id: i64,
    pub amount: f64,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub user_id: i64,
    pub trip_id: Option<i64>,
    pub category_id: Option<i64>,
    pub category: Option<SimpleCategory>,
    pub trip: Option<SimpleTrip>,
}

impl ExpenseOut {
    pub fn from_joined(row: ExpenseJoined) -> Result<Self, AppError> {
        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(SimpleCategory { id, name }),
            _ => None,
        };
        let trip = match (row.trip_id, row.trip_name) {
            (Some(id), Some(name)) => Some(SimpleTrip { id, name }),
            _ => None,
        };
        Ok(Self {
            id: row.id,
            amount: row.amount,
            description: row.description,
            date: parse_date(&row.date)?,
            user_id: row.user_id,
            trip_id: row.trip_id,
            category_id: row.category_id,
            category,
            trip,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    // start_date > end_date is accepted as-is; nothing orders the two.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripOut {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub user_id: i64,
    pub expenses: Vec<ExpenseOut>,
}

impl TripOut {
    pub fn from_row(trip: Trip, expenses: Vec<ExpenseOut>) -> Result<Self, AppError> {
        Ok(Self {
            id: trip.id,
            name: trip.name,
            description: trip.description,
            start_date: parse_date(&trip.start_date)?,
            end_date: parse_date(&trip.end_date)?,
            user_id: trip.user_id,
            expenses,
        })
    }
}

/// Unused by the current handlers; kept as the contract a future
/// registration endpoint would accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation(format!(
                "{} is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserOut {
    pub fn from_row(user: User) -> Result<Self, AppError> {
        let created_at = DateTime::parse_from_rfc3339(&user.created_at)
            .map_err(|err| AppError::Other(anyhow!("bad created_at in users row: {err}")))?
            .with_timezone(&Utc);
        Ok(Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSummary {
    pub trip_id: i64,
    pub trip_name: String,
    pub total_spent: f64,
    pub category_breakdown: BTreeMap<String, f64>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    raw.parse::<NaiveDate>()
        .map_err(|err| AppError::Other(anyhow!("bad date in stored row '{raw}': {err}")))
}

fn is_valid_email(raw: &str) -> bool {
    match raw.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
