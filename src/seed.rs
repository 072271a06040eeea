//! Idempotent demo data: a fixed category set plus one demo trip with two
//! expenses. Safe to invoke repeatedly; the demo trip is matched by name and
//! never duplicated.

use anyhow::anyhow;
use chrono::NaiveDate;
use tracing::info;

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::schemas::{ExpenseCreate, TripCreate};

const DEMO_TRIP_NAME: &str = "Malaysia Trip (Langkawi & KL)";

const SEED_CATEGORIES: [(&str, &str); 6] = [
    ("Commute", "Auto/Uber/Rapido, Fuel, Metro"),
    ("Food & Drink", "Dining out, Swiggy/Zomato, Filter Coffee"),
    ("Groceries", "Saravana Stores, Pazhamudir Nilayam, Blinkit"),
    ("Lifestyle", "Shopping (EA/Phoenix), Grooming/Salon"),
    ("Social", "Movie tickets, Besant Nagar/ECR"),
    ("Fixed", "Rent, EB Bill, Mobile Recharge"),
];

pub async fn seed_demo_data(pool: &DbPool) -> Result<String, AppError> {
    let user = db::get_or_create_dummy_user(pool).await?;

    for (name, description) in SEED_CATEGORIES {
        if db::find_category_by_name(pool, name).await?.is_none() {
            db::insert_category(pool, name, description).await?;
        }
    }

    let category = db::find_category_by_name(pool, "Commute")
        .await?
        .ok_or_else(|| AppError::Other(anyhow!("seed category 'Commute' missing after insert")))?;

    if db::find_trip_by_name(pool, DEMO_TRIP_NAME).await?.is_some() {
        return Ok(format!(
            "Trip '{DEMO_TRIP_NAME}' already exists. Skipping seed to prevent duplicates."
        ));
    }

    let trip = db::insert_trip(
        pool,
        &TripCreate {
            name: DEMO_TRIP_NAME.to_string(),
            description: Some("Vacation to Malaysia".to_string()),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 21).unwrap(),
        },
        user.id,
    )
    .await?;

    let demo_expenses = [("Airbnb in KL", 150.0), ("Street Food", 20.0)];
    for (description, amount) in demo_expenses {
        db::insert_expense(
            pool,
            &ExpenseCreate {
                amount,
                description: Some(description.to_string()),
                date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
                trip_id: Some(trip.id),
                category_id: category.id,
            },
            user.id,
        )
        .await?;
    }

    info!("seeded demo trip '{DEMO_TRIP_NAME}' with 2 expenses");
    Ok("Database seeded successfully with Malaysia trip and 2 expenses.".to_string())
}
