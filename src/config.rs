use std::{env, net::SocketAddr};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_env: String,
    pub database_url: String,
    pub api_key: String,
    pub listen_addr: SocketAddr,
}

impl AppConfig {
    /// Resolve configuration for the current environment (local, sit, uat).
    ///
    /// `APP_ENV` selects an optional `.env.{APP_ENV}` file; a missing file is
    /// fine, the defaults below apply.
    pub fn from_env() -> Result<Self, AppError> {
        let app_env = env::var("APP_ENV")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase();

        dotenvy::from_filename(format!(".env.{app_env}")).ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://expense_tracker_local.db".to_string());

        // Read but not yet enforced by any handler.
        let api_key = env::var("API_KEY").unwrap_or_else(|_| "my_local_secret".to_string());

        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        Ok(Self {
            app_env,
            database_url,
            api_key,
            listen_addr,
        })
    }
}
