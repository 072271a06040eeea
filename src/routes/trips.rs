use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::schemas::{ExpenseOut, TripCreate, TripOut, TripSummary};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/:trip_id/summary", get(trip_summary))
}

async fn create_trip(
    State(state): State<AppState>,
    Json(body): Json<TripCreate>,
) -> Result<(StatusCode, Json<TripOut>), AppError> {
    let user = db::get_or_create_dummy_user(&state.db).await?;
    let trip = db::insert_trip(&state.db, &body, user.id).await?;
    let out = TripOut::from_row(trip, Vec::new())?;
    Ok((StatusCode::CREATED, Json(out)))
}

#[derive(Debug, Deserialize)]
struct ListTripsParams {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    100
}

async fn list_trips(
    State(state): State<AppState>,
    Query(params): Query<ListTripsParams>,
) -> Result<Json<Vec<TripOut>>, AppError> {
    let trips = db::list_trips(&state.db, params.skip, params.limit).await?;

    let mut out = Vec::with_capacity(trips.len());
    for trip in trips {
        let rows = db::list_expenses(&state.db, Some(trip.id)).await?;
        let expenses = rows
            .into_iter()
            .map(ExpenseOut::from_joined)
            .collect::<Result<Vec<_>, _>>()?;
        out.push(TripOut::from_row(trip, expenses)?);
    }

    Ok(Json(out))
}

async fn trip_summary(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripSummary>, AppError> {
    Ok(Json(build_trip_summary(&state.db, trip_id).await?))
}

/// Total via a store-side sum; per-category breakdown via an in-process fold
/// over the trip's expense rows, keyed by category display name with an
/// "Uncategorized" fallback.
pub async fn build_trip_summary(pool: &DbPool, trip_id: i64) -> Result<TripSummary, AppError> {
    let trip = db::find_trip(pool, trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    let total_spent = db::sum_trip_expenses(pool, trip_id).await?;

    let mut category_breakdown: BTreeMap<String, f64> = BTreeMap::new();
    for row in db::list_expenses(pool, Some(trip_id)).await? {
        let name = row
            .category_name
            .unwrap_or_else(|| "Uncategorized".to_string());
        *category_breakdown.entry(name).or_insert(0.0) += row.amount;
    }

    Ok(TripSummary {
        trip_id: trip.id,
        trip_name: trip.name,
        total_spent,
        category_breakdown,
    })
}
