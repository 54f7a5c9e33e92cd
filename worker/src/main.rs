use anyhow::Result;
use std::sync::Arc;

use shared::{Config, Notifier};

mod lifecycle;
mod runner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting trade automation worker...");

    let config = Arc::new(Config::from_env()?);
    let db = shared::connect(&config).await?;
    tracing::info!("Connected to database");

    let notifier = Notifier::from_config(&config);
    if notifier.is_none() {
        tracing::info!("Telegram notifications disabled (BOT_TOKEN/NOTIFY_CHAT_ID not set)");
    }

    let lifecycle = lifecycle::Lifecycle::new();

    let aggregates = tokio::spawn(runner::aggregate_loop(
        db.clone(),
        config.clone(),
        lifecycle.subscribe(),
    ));
    let sltp = tokio::spawn(runner::sltp_loop(
        db.clone(),
        config.clone(),
        lifecycle.subscribe(),
    ));
    let promotion = tokio::spawn(runner::promotion_loop(
        db.clone(),
        config.clone(),
        notifier,
        lifecycle.subscribe(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    lifecycle.shutdown();

    let _ = tokio::join!(aggregates, sltp, promotion);
    tracing::info!("Worker stopped");
    Ok(())
}
