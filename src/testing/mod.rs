//! In-memory database fixtures for unit tests.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::database::{manager, schema, seed};
use crate::state::AppState;

/// Lowest cost bcrypt accepts; keeps hashing fast under test
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.url = "sqlite::memory:".to_string();
    config.database.seed_demo_data = false;
    config.security.bcrypt_cost = TEST_BCRYPT_COST;
    config
}

/// A private in-memory database with the schema applied
pub struct TestContext {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl TestContext {
    /// Migrated, no rows
    pub async fn empty() -> Self {
        let config = test_config();
        let pool = manager::connect(&config.database).await.expect("open in-memory database");
        schema::migrate(&pool).await.expect("apply schema");

        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// Migrated and loaded with the demo users, employees and tasks
    pub async fn seeded() -> Self {
        let ctx = Self::empty().await;
        seed::seed_demo_data(&ctx.pool, TEST_BCRYPT_COST)
            .await
            .expect("seed demo data");
        ctx
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.pool.clone(), self.config.clone())
    }
}
