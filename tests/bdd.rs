use std::{fmt, fs::File};

use anyhow::Context;
use chrono::NaiveDate;
use cucumber::{given, then, when, World as _};
use tempfile::TempDir;
use tripledger::{
    db::{self, create_tables, init_pool, DbPool, StoreKind},
    error::AppError,
    routes::{expenses::remove_expense, trips::build_trip_summary},
    schemas::{ExpenseCreate, TripCreate},
    seed::seed_demo_data,
};

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    state: Option<TestState>,
    last_delete: Option<Result<String, AppError>>,
    last_validation: Option<Result<(), AppError>>,
}

impl AppWorld {
    fn pool(&self) -> &DbPool {
        self.state
            .as_ref()
            .expect("state must be initialised first")
            .pool()
    }
}

struct TestState {
    pool: DbPool,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        File::create(&db_path)?;
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let pool = init_pool(&database_url).await?;
        create_tables(&pool, StoreKind::Sqlite).await?;

        Ok(Self { pool, _root: root })
    }

    fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[given("a fresh expense store")]
async fn given_fresh_store(world: &mut AppWorld) {
    world.state = Some(TestState::new().await.expect("state"));
    world.last_delete = None;
    world.last_validation = None;
}

#[when("I seed the demo data")]
async fn when_seed(world: &mut AppWorld) {
    seed_demo_data(world.pool()).await.expect("seed");
}

#[when(regex = r#"^I create a trip named "([^"]+)"$"#)]
async fn when_create_trip(world: &mut AppWorld, name: String) {
    let user = db::get_or_create_dummy_user(world.pool())
        .await
        .expect("dummy user");
    let trip = TripCreate {
        name,
        description: None,
        start_date: NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2026, 4, 3).expect("valid date"),
    };
    db::insert_trip(world.pool(), &trip, user.id)
        .await
        .expect("insert trip");
}

#[when(
    regex = r#"^I record an expense of (-?\d+(?:\.\d+)?) in category "([^"]+)" for the trip named "([^"]+)"$"#
)]
async fn when_record_expense(world: &mut AppWorld, amount: f64, category: String, trip: String) {
    let user = db::get_or_create_dummy_user(world.pool())
        .await
        .expect("dummy user");
    let category = db::find_category_by_name(world.pool(), &category)
        .await
        .expect("query category")
        .expect("category must exist");
    let trip = db::find_trip_by_name(world.pool(), &trip)
        .await
        .expect("query trip")
        .expect("trip must exist");

    let expense = ExpenseCreate {
        amount,
        description: None,
        date: NaiveDate::from_ymd_opt(2026, 4, 2).expect("valid date"),
        trip_id: Some(trip.id),
        category_id: category.id,
    };
    expense.validate().expect("expense should be valid");
    db::insert_expense(world.pool(), &expense, user.id)
        .await
        .expect("insert expense");
}

#[when(regex = r#"^I record an expense of (-?\d+(?:\.\d+)?) in category "([^"]+)" with no trip$"#)]
async fn when_record_expense_no_trip(world: &mut AppWorld, amount: f64, category: String) {
    let user = db::get_or_create_dummy_user(world.pool())
        .await
        .expect("dummy user");
    let category = db::find_category_by_name(world.pool(), &category)
        .await
        .expect("query category")
        .expect("category must exist");

    let expense = ExpenseCreate {
        amount,
        description: None,
        date: NaiveDate::from_ymd_opt(2026, 4, 2).expect("valid date"),
        trip_id: None,
        category_id: category.id,
    };
    expense.validate().expect("expense should be valid");
    db::insert_expense(world.pool(), &expense, user.id)
        .await
        .expect("insert expense");
}

#[when(regex = r#"^I record an uncategorized expense of (-?\d+(?:\.\d+)?) for the trip named "([^"]+)"$"#)]
async fn when_record_uncategorized_expense(world: &mut AppWorld, amount: f64, trip: String) {
    let user = db::get_or_create_dummy_user(world.pool())
        .await
        .expect("dummy user");
    let trip = db::find_trip_by_name(world.pool(), &trip)
        .await
        .expect("query trip")
        .expect("trip must exist");

    // The create schema requires a category, but storage does not; legacy
    // rows like this one land in the "Uncategorized" bucket.
    sqlx::query(
        "INSERT INTO expenses (amount, description, date, user_id, trip_id, category_id)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(amount)
    .bind(Option::<String>::None)
    .bind("2026-04-02")
    .bind(user.id)
    .bind(Some(trip.id))
    .bind(Option::<i64>::None)
    .execute(world.pool())
    .await
    .expect("insert uncategorized expense");
}

#[when(regex = r"^I delete expense (\d+)$")]
async fn when_delete_expense(world: &mut AppWorld, expense_id: i64) {
    world.last_delete = Some(remove_expense(world.pool(), expense_id).await);
}

#[when(regex = r#"^I delete the expense described as "([^"]+)"$"#)]
async fn when_delete_expense_by_description(world: &mut AppWorld, description: String) {
    let rows = db::list_expenses(world.pool(), None)
        .await
        .expect("list expenses");
    let target = rows
        .into_iter()
        .find(|row| row.description.as_deref() == Some(description.as_str()))
        .expect("expense with that description must exist");
    world.last_delete = Some(remove_expense(world.pool(), target.id).await);
}

#[when(regex = r"^I validate an expense with amount (-?\d+(?:\.\d+)?)$")]
async fn when_validate_expense(world: &mut AppWorld, amount: f64) {
    let expense = ExpenseCreate {
        amount,
        description: None,
        date: NaiveDate::from_ymd_opt(2026, 4, 2).expect("valid date"),
        trip_id: None,
        category_id: 1,
    };
    world.last_validation = Some(expense.validate());
}

#[then(regex = r"^there are (\d+) categories$")]
async fn then_category_count(world: &mut AppWorld, expected: usize) {
    let categories = db::list_categories(world.pool())
        .await
        .expect("list categories");
    assert_eq!(categories.len(), expected);
}

#[then(regex = r#"^there is exactly (\d+) trip named "([^"]+)"$"#)]
async fn then_trip_count(world: &mut AppWorld, expected: usize, name: String) {
    let trips = db::list_trips(world.pool(), 0, 1000)
        .await
        .expect("list trips");
    let matching = trips.iter().filter(|trip| trip.name == name).count();
    assert_eq!(matching, expected);
}

#[then(regex = r#"^the summary for the trip named "([^"]+)" has total (-?\d+(?:\.\d+)?)$"#)]
async fn then_summary_total(world: &mut AppWorld, name: String, expected: f64) {
    let trip = db::find_trip_by_name(world.pool(), &name)
        .await
        .expect("query trip")
        .expect("trip must exist");
    let summary = build_trip_summary(world.pool(), trip.id)
        .await
        .expect("summary");
    assert!(
        (summary.total_spent - expected).abs() < 1e-9,
        "expected total {expected}, got {}",
        summary.total_spent
    );
}

#[then(
    regex = r#"^the summary for the trip named "([^"]+)" lists (-?\d+(?:\.\d+)?) under "([^"]+)"$"#
)]
async fn then_summary_breakdown(world: &mut AppWorld, name: String, expected: f64, key: String) {
    let trip = db::find_trip_by_name(world.pool(), &name)
        .await
        .expect("query trip")
        .expect("trip must exist");
    let summary = build_trip_summary(world.pool(), trip.id)
        .await
        .expect("summary");
    let value = summary
        .category_breakdown
        .get(&key)
        .unwrap_or_else(|| panic!("breakdown has no entry for '{key}'"));
    assert!((value - expected).abs() < 1e-9);
}

#[then(regex = r#"^the summary for the trip named "([^"]+)" has (\d+) breakdown entries$"#)]
async fn then_summary_breakdown_size(world: &mut AppWorld, name: String, expected: usize) {
    let trip = db::find_trip_by_name(world.pool(), &name)
        .await
        .expect("query trip")
        .expect("trip must exist");
    let summary = build_trip_summary(world.pool(), trip.id)
        .await
        .expect("summary");
    assert_eq!(summary.category_breakdown.len(), expected);
}

#[then("the deletion fails with not found")]
async fn then_delete_not_found(world: &mut AppWorld) {
    let result = world.last_delete.as_ref().expect("a delete was attempted");
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[then("the deletion succeeds")]
async fn then_delete_succeeds(world: &mut AppWorld) {
    let result = world.last_delete.as_ref().expect("a delete was attempted");
    assert!(result.is_ok(), "delete failed: {result:?}");
}

#[then("the expense is rejected as invalid")]
async fn then_expense_rejected(world: &mut AppWorld) {
    let result = world
        .last_validation
        .as_ref()
        .expect("a validation was attempted");
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[then(regex = r"^listing expenses without a filter returns (\d+) expenses$")]
async fn then_all_expense_count(world: &mut AppWorld, expected: usize) {
    let rows = db::list_expenses(world.pool(), None)
        .await
        .expect("list expenses");
    assert_eq!(rows.len(), expected);
}

#[then(regex = r#"^listing expenses for the trip named "([^"]+)" returns (\d+) expenses$"#)]
async fn then_trip_expense_count(world: &mut AppWorld, name: String, expected: usize) {
    let trip = db::find_trip_by_name(world.pool(), &name)
        .await
        .expect("query trip")
        .expect("trip must exist");
    let rows = db::list_expenses(world.pool(), Some(trip.id))
        .await
        .expect("list expenses");
    assert_eq!(rows.len(), expected);
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
