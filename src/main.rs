use tokio::net::TcpListener;
use tracing::info;
use tripledger::config::AppConfig;
use tripledger::db::{create_tables, init_pool, StoreKind};
use tripledger::error::AppError;
use tripledger::routes::create_router;
use tripledger::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    info!("starting in '{}' environment", config.app_env);

    let kind = StoreKind::from_url(&config.database_url);
    let db = init_pool(&config.database_url).await?;
    create_tables(&db, kind).await?;

    let state = AppState::new(config.clone(), db);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tripledger=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
