use tracing::info;

use crate::config::AppConfig;
use crate::database::{manager, schema, seed};

/// Apply the schema; demo data is loaded only when `--seed` is passed
pub async fn handle(config: AppConfig, with_seed: bool) -> anyhow::Result<()> {
    let pool = manager::connect(&config.database).await?;
    schema::migrate(&pool).await?;
    info!("Schema is up to date");

    if with_seed {
        let seeded = seed::seed_demo_data(&pool, config.security.bcrypt_cost).await?;
        info!("Demo data {}", if seeded { "loaded" } else { "already present" });
    }

    manager::close(&pool).await;
    Ok(())
}
