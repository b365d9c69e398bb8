use tracing::info;

use crate::config::AppConfig;
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Workforce API in {:?} mode", config.environment);
    let state = AppState::initialize(config).await?;
    crate::serve(state).await
}
