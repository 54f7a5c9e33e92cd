//! SL/TP Calculation Service
//!
//! Derives stop-loss/take-profit levels per instrument from the rolling
//! aggregate window using ATR. Output rows are append-only so the history
//! of levels the gate saw stays queryable.

use std::str::FromStr;

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{error, info};

use crate::entity::{rolling_aggregates, sltp_outputs};
use crate::indicators::Atr;

#[derive(Debug, Clone)]
pub struct SltpParams {
    pub atr_period: usize,
    /// Minimum bar count below which no levels are produced. Computing on a
    /// shorter history would yield unstable ATR estimates.
    pub min_bars: usize,
    pub sl_multiplier: f64,
    pub tp_multiplier: f64,
}

impl Default for SltpParams {
    fn default() -> Self {
        Self {
            atr_period: 14,
            min_bars: 50,
            sl_multiplier: 1.5,
            tp_multiplier: 3.0,
        }
    }
}

/// One OHLC bar in chronological position.
#[derive(Debug, Clone, Copy)]
pub struct Bar {
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SltpLevels {
    pub close: f64,
    pub atr: f64,
    pub sl_price: f64,
    pub tp_price: f64,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub computed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Compute long-bias levels from chronological bars; short-bias consumers
/// mirror around the close. Returns None when history is too short.
pub fn compute_levels(bars: &[Bar], params: &SltpParams) -> Option<SltpLevels> {
    if bars.len() < params.min_bars {
        return None;
    }

    let mut atr = Atr::new(params.atr_period);
    for bar in bars {
        atr.update(bar.high, bar.low, bar.close);
    }
    let atr_value = atr.value()?;
    let close = bars.last()?.close;

    Some(SltpLevels {
        close,
        atr: atr_value,
        sl_price: close - params.sl_multiplier * atr_value,
        tp_price: close + params.tp_multiplier * atr_value,
    })
}

/// Load the most recent bars for a symbol, compute levels, and append one
/// output row. Returns Ok(None) when there is not enough history.
pub async fn calculate_and_store(
    db: &DatabaseConnection,
    symbol: &str,
    params: &SltpParams,
) -> Result<Option<sltp_outputs::Model>, anyhow::Error> {
    let recent = rolling_aggregates::Entity::find()
        .filter(rolling_aggregates::Column::Symbol.eq(symbol))
        .order_by(rolling_aggregates::Column::BucketStart, Order::Desc)
        .limit(params.min_bars as u64)
        .all(db)
        .await?;

    let mut bars: Vec<Bar> = recent
        .iter()
        .map(|row| Bar {
            high: f64::from_str(&row.high.to_string()).unwrap_or(0.0),
            low: f64::from_str(&row.low.to_string()).unwrap_or(0.0),
            close: f64::from_str(&row.close.to_string()).unwrap_or(0.0),
        })
        .collect();
    bars.reverse(); // newest-first from the store, chronological for the ATR

    let levels = match compute_levels(&bars, params) {
        Some(levels) => levels,
        None => return Ok(None),
    };

    let output = sltp_outputs::ActiveModel {
        symbol: ActiveValue::Set(symbol.to_string()),
        close: ActiveValue::Set(decimal_from(levels.close)),
        atr: ActiveValue::Set(decimal_from(levels.atr)),
        sl_price: ActiveValue::Set(decimal_from(levels.sl_price)),
        tp_price: ActiveValue::Set(decimal_from(levels.tp_price)),
        computed_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    };

    let inserted = sltp_outputs::Entity::insert(output).exec(db).await?;
    let model = sltp_outputs::Entity::find_by_id(inserted.last_insert_id)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("sltp output {} vanished after insert", inserted.last_insert_id))?;

    Ok(Some(model))
}

/// Run the calculator across every symbol present in the rolling window.
/// A failure on one symbol is logged and does not abort the rest.
pub async fn run_batch(
    db: &DatabaseConnection,
    params: &SltpParams,
) -> Result<BatchReport, anyhow::Error> {
    let symbols: Vec<String> = rolling_aggregates::Entity::find()
        .select_only()
        .column(rolling_aggregates::Column::Symbol)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;

    let mut report = BatchReport::default();
    for symbol in &symbols {
        match calculate_and_store(db, symbol, params).await {
            Ok(Some(output)) => {
                info!(
                    "SL/TP for {}: close={} atr={} sl={} tp={}",
                    symbol, output.close, output.atr, output.sl_price, output.tp_price
                );
                report.computed += 1;
            }
            Ok(None) => {
                report.skipped += 1;
            }
            Err(e) => {
                error!("SL/TP calculation failed for {}: {}", symbol, e);
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

fn decimal_from(value: f64) -> Decimal {
    Decimal::from_str(&value.to_string()).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(count: usize, range: f64) -> Vec<Bar> {
        (0..count)
            .map(|_| Bar {
                high: 100.0 + range / 2.0,
                low: 100.0 - range / 2.0,
                close: 100.0,
            })
            .collect()
    }

    #[test]
    fn too_few_bars_yields_nothing() {
        let params = SltpParams::default();
        assert!(compute_levels(&bars(10, 2.0), &params).is_none());
        assert!(compute_levels(&bars(49, 2.0), &params).is_none());
    }

    #[test]
    fn minimum_history_yields_levels() {
        let params = SltpParams::default();
        let levels = compute_levels(&bars(50, 2.0), &params).unwrap();
        assert!(levels.atr > 0.0);
        assert!(levels.sl_price < levels.close);
        assert!(levels.tp_price > levels.close);
    }

    #[test]
    fn levels_follow_multipliers() {
        let params = SltpParams {
            atr_period: 14,
            min_bars: 50,
            sl_multiplier: 1.0,
            tp_multiplier: 2.0,
        };
        // Constant 2.0 range series settles at ATR = 2.0.
        let levels = compute_levels(&bars(100, 2.0), &params).unwrap();
        assert!((levels.atr - 2.0).abs() < 1e-6);
        assert!((levels.sl_price - 98.0).abs() < 1e-6);
        assert!((levels.tp_price - 104.0).abs() < 1e-6);
    }

    #[test]
    fn wider_ranges_widen_the_stops() {
        let params = SltpParams::default();
        let narrow = compute_levels(&bars(60, 1.0), &params).unwrap();
        let wide = compute_levels(&bars(60, 3.0), &params).unwrap();
        assert!(wide.atr >= narrow.atr);
        assert!(wide.sl_price < narrow.sl_price);
        assert!(wide.tp_price > narrow.tp_price);
    }
}
