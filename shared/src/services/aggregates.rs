//! Rolling Aggregate Refresh Service

use anyhow::Result;
use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement, TransactionTrait};
use tracing::info;

use crate::config::Config;

/// Recompute the trailing OHLC bucket window from the raw tick table.
///
/// Delete and re-insert run in one transaction, so a failure rolls back to
/// the previous window (readers never observe a partially refreshed one).
/// Returns the number of bucket rows produced.
pub async fn refresh_rolling_aggregates(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<u64, anyhow::Error> {
    let bucket_secs = config.bucket_minutes * 60;
    // Align the window boundary to a bucket start. The DELETE must cover
    // every bucket the INSERT regenerates; a raw now-24h boundary would
    // leave the partial trailing bucket in place and collide with its
    // rebuild on the (symbol, bucket_start) unique key.
    let raw_start = (Utc::now() - Duration::hours(config.aggregate_window_hours)).timestamp();
    let window_start = raw_start - raw_start.rem_euclid(bucket_secs);

    let txn = db.begin().await?;

    txn.execute(Statement::from_sql_and_values(
        DbBackend::MySql,
        "DELETE FROM rolling_aggregates WHERE bucket_start >= FROM_UNIXTIME(?)",
        [window_start.into()],
    ))
    .await?;

    // Open/close per bucket via the ordered GROUP_CONCAT trick; high/low are
    // plain aggregates. Bucket boundaries are aligned to the bucket width.
    let insert_sql = format!(
        "INSERT INTO rolling_aggregates \
           (symbol, open, high, low, close, bucket_start, bucket_end, created_at) \
         SELECT \
           symbol, \
           CAST(SUBSTRING_INDEX(GROUP_CONCAT(price ORDER BY tick_time ASC), ',', 1) AS DECIMAL(20, 8)) AS open, \
           MAX(price) AS high, \
           MIN(price) AS low, \
           CAST(SUBSTRING_INDEX(GROUP_CONCAT(price ORDER BY tick_time DESC), ',', 1) AS DECIMAL(20, 8)) AS close, \
           FROM_UNIXTIME(FLOOR(UNIX_TIMESTAMP(tick_time) / {bucket}) * {bucket}) AS bucket_start, \
           FROM_UNIXTIME(FLOOR(UNIX_TIMESTAMP(tick_time) / {bucket}) * {bucket} + {bucket}) AS bucket_end, \
           NOW() \
         FROM market_ticks \
         WHERE tick_time >= FROM_UNIXTIME(?) \
         GROUP BY symbol, bucket_start",
        bucket = bucket_secs
    );

    let result = txn
        .execute(Statement::from_sql_and_values(
            DbBackend::MySql,
            insert_sql,
            [window_start.into()],
        ))
        .await?;

    txn.commit().await?;

    let rows = result.rows_affected();
    info!(
        "Refreshed rolling aggregates: {} buckets over the last {}h",
        rows, config.aggregate_window_hours
    );
    Ok(rows)
}
