use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{manager, schema, seed};

/// Shared handles every handler receives through axum's `State`
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// Open the database, apply the schema and, when configured, load demo data
    pub async fn initialize(config: AppConfig) -> anyhow::Result<Self> {
        let db = manager::connect(&config.database).await?;
        schema::migrate(&db).await?;

        if config.database.seed_demo_data {
            if seed::seed_demo_data(&db, config.security.bcrypt_cost).await? {
                info!("Loaded demo data");
            } else {
                info!("Database already populated, skipping demo data");
            }
        }

        Ok(Self::new(db, Arc::new(config)))
    }
}
