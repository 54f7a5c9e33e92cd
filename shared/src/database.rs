use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
pub use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::Config;

/// Pooled Sea-ORM connection shared by the workers and the API.
/// Workers check a connection out per cycle and release it between ticks.
pub async fn connect(config: &Config) -> Result<DatabaseConnection> {
    info!("Connecting to database at: {}", config.database_url);
    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.max_connections(10)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300));
    let db = Database::connect(opts).await?;
    Ok(db)
}
