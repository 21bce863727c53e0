use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true);

        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("open sqlite database")?;

        // Schema must be in place before serving; a failed migration is fatal.
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        Ok(Self { db, config })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }
}
