//! The three fixed-interval worker loops. Each holds the store briefly per
//! cycle, logs and survives per-cycle failures, and exits only on shutdown.

use std::sync::Arc;
use std::time::Duration;

use shared::config::Config;
use shared::database::DatabaseConnection;
use shared::services::{aggregates, promotion, sltp};
use shared::Notifier;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{error, info};

use crate::lifecycle::ShutdownSignal;

/// Rolling aggregate refresh. After a failed cycle the loop drops to the
/// dedicated retry cadence until a refresh succeeds again.
pub async fn aggregate_loop(
    db: DatabaseConnection,
    config: Arc<Config>,
    mut shutdown: ShutdownSignal,
) {
    let normal = Duration::from_secs(config.refresh_interval_secs);
    let retry = Duration::from_secs(config.refresh_retry_interval_secs);
    let store_timeout = Duration::from_secs(config.store_timeout_secs);
    let mut delay = normal;

    info!(
        "Aggregate refresher started ({}s cadence, {}s retry)",
        config.refresh_interval_secs, config.refresh_retry_interval_secs
    );
    loop {
        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.triggered() => break,
        }
        if shutdown.is_shutdown() {
            break;
        }

        match timeout(
            store_timeout,
            aggregates::refresh_rolling_aggregates(&db, &config),
        )
        .await
        {
            Ok(Ok(_rows)) => {
                delay = normal;
            }
            Ok(Err(e)) => {
                error!("Aggregate refresh failed: {}; retrying in {:?}", e, retry);
                delay = retry;
            }
            Err(_) => {
                error!(
                    "Aggregate refresh timed out after {:?}; retrying in {:?}",
                    store_timeout, retry
                );
                delay = retry;
            }
        }
    }
    info!("Aggregate refresher stopped");
}

pub async fn sltp_loop(db: DatabaseConnection, config: Arc<Config>, mut shutdown: ShutdownSignal) {
    let params = config.sltp_params();
    let store_timeout = Duration::from_secs(config.store_timeout_secs);
    let mut ticker = interval(Duration::from_secs(config.sltp_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("SL/TP calculator started ({}s cadence)", config.sltp_interval_secs);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.triggered() => break,
        }
        if shutdown.is_shutdown() {
            break;
        }

        match timeout(store_timeout, sltp::run_batch(&db, &params)).await {
            Ok(Ok(report)) => {
                if report.computed + report.failed > 0 {
                    info!(
                        "SL/TP batch: {} computed, {} skipped, {} failed",
                        report.computed, report.skipped, report.failed
                    );
                }
            }
            Ok(Err(e)) => error!("SL/TP batch failed: {}", e),
            Err(_) => error!("SL/TP batch timed out after {:?}", store_timeout),
        }
    }
    info!("SL/TP calculator stopped");
}

pub async fn promotion_loop(
    db: DatabaseConnection,
    config: Arc<Config>,
    notifier: Option<Notifier>,
    mut shutdown: ShutdownSignal,
) {
    let store_timeout = Duration::from_secs(config.store_timeout_secs);
    let mut ticker = interval(Duration::from_secs(config.promotion_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Signal promotion worker started ({}s cadence)",
        config.promotion_interval_secs
    );
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.triggered() => break,
        }
        if shutdown.is_shutdown() {
            break;
        }

        match timeout(
            store_timeout,
            promotion::promote_new_signals(&db, notifier.as_ref()),
        )
        .await
        {
            Ok(Ok(report)) => {
                if report.promoted + report.skipped + report.failed > 0 {
                    info!(
                        "Promotion cycle: {} promoted, {} skipped, {} failed",
                        report.promoted, report.skipped, report.failed
                    );
                }
            }
            Ok(Err(e)) => error!("Promotion cycle failed: {}", e),
            Err(_) => error!("Promotion cycle timed out after {:?}", store_timeout),
        }
    }
    info!("Signal promotion worker stopped");
}
