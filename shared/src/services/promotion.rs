//! Signal Promotion Service
//!
//! Polls newly detected signals and promotes each into a normalized trade
//! intent. Each signal is handled in its own transaction: the intent insert
//! and the source status flip commit together, and a pre-insert existence
//! check on the source reference makes crash-and-retry a no-op instead of a
//! double promotion.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, Order, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, warn};

use crate::entity::{generated_signals, signal_generations, strategy_configs, universal_settings};
use crate::models::{Direction, GenerationStatus, SignalStatus};
use crate::notify::Notifier;
use crate::services::compliance;

#[derive(Debug, Default)]
pub struct PromotionReport {
    pub promoted: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum PromotionOutcome {
    Promoted(signal_generations::Model),
    AlreadyPromoted,
}

/// Map a signal plus its owning strategy config onto a trade intent.
/// Order/product/sizing defaults come from the config; price levels come
/// from the signal itself.
pub fn map_signal(
    signal: &generated_signals::Model,
    config: &strategy_configs::Model,
    market_session: Option<String>,
) -> Result<signal_generations::ActiveModel, anyhow::Error> {
    let direction = Direction::parse(&signal.direction).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown direction {:?} on signal {}",
            signal.direction,
            signal.id
        )
    })?;

    let now = Utc::now();
    Ok(signal_generations::ActiveModel {
        user_id: ActiveValue::Set(config.user_id),
        strategy_id: ActiveValue::Set(config.id),
        source_signal_id: ActiveValue::Set(Some(signal.id)),
        symbol: ActiveValue::Set(signal.symbol.clone()),
        exchange: ActiveValue::Set(config.exchange.clone()),
        order_type: ActiveValue::Set(config.order_type.clone()),
        product_type: ActiveValue::Set(config.product_type.clone()),
        side: ActiveValue::Set(direction.to_side().as_str().to_string()),
        contract_size: ActiveValue::Set(config.contract_size),
        quantity: ActiveValue::Set(config.default_quantity),
        entry_price: ActiveValue::Set(signal.price),
        stop_loss: ActiveValue::Set(signal.stop_loss),
        take_profit: ActiveValue::Set(signal.take_profit),
        status: ActiveValue::Set(GenerationStatus::Pending.as_str().to_string()),
        market_session: ActiveValue::Set(market_session),
        is_active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(Some(now)),
        updated_at: ActiveValue::Set(Some(now)),
        ..Default::default()
    })
}

async fn mark_promoted(
    txn: &DatabaseTransaction,
    signal: &generated_signals::Model,
) -> Result<(), sea_orm::DbErr> {
    let mut update: generated_signals::ActiveModel = signal.clone().into();
    update.status = ActiveValue::Set(SignalStatus::Promoted.as_str().to_string());
    update.update(txn).await?;
    Ok(())
}

async fn promote_in_txn(
    txn: &DatabaseTransaction,
    signal: &generated_signals::Model,
    market_session: Option<String>,
) -> Result<PromotionOutcome, anyhow::Error> {
    // A generation referencing this source means a previous run already
    // inserted and crashed before the status flip: finish the flip only.
    let existing = signal_generations::Entity::find()
        .filter(signal_generations::Column::SourceSignalId.eq(signal.id))
        .one(txn)
        .await?;
    if existing.is_some() {
        mark_promoted(txn, signal).await?;
        return Ok(PromotionOutcome::AlreadyPromoted);
    }

    let config = strategy_configs::Entity::find_by_id(signal.config_id)
        .one(txn)
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "strategy config {} not found for signal {}",
                signal.config_id,
                signal.id
            )
        })?;

    let generation = map_signal(signal, &config, market_session)?;
    let inserted = generation.insert(txn).await?;
    mark_promoted(txn, signal).await?;
    Ok(PromotionOutcome::Promoted(inserted))
}

async fn promote_one(
    db: &DatabaseConnection,
    signal: &generated_signals::Model,
    market_session: Option<String>,
) -> Result<PromotionOutcome, anyhow::Error> {
    let txn = db.begin().await?;
    match promote_in_txn(&txn, signal, market_session).await {
        Ok(outcome) => {
            txn.commit().await?;
            Ok(outcome)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Poll for NEW signals and promote each in its own transaction. One bad
/// signal is rolled back and logged without aborting the rest of the batch.
pub async fn promote_new_signals(
    db: &DatabaseConnection,
    notifier: Option<&Notifier>,
) -> Result<PromotionReport, anyhow::Error> {
    let now = Utc::now();
    let universal = universal_settings::Entity::find().one(db).await?;
    let market_session = universal
        .as_ref()
        .and_then(|settings| compliance::session_label(settings, now));

    let pending = generated_signals::Entity::find()
        .filter(generated_signals::Column::Status.eq(SignalStatus::New.as_str()))
        .order_by(generated_signals::Column::GeneratedAt, Order::Asc)
        .all(db)
        .await?;

    let mut report = PromotionReport::default();
    for signal in &pending {
        match promote_one(db, signal, market_session.clone()).await {
            Ok(PromotionOutcome::Promoted(generation)) => {
                info!(
                    "Promoted signal {} ({} {}) as generation {}",
                    signal.id, signal.symbol, signal.direction, generation.id
                );
                if let Some(notifier) = notifier {
                    notifier.signal_promoted(&generation);
                }
                report.promoted += 1;
            }
            Ok(PromotionOutcome::AlreadyPromoted) => {
                warn!(
                    "Signal {} already had a generation; completed its status flip",
                    signal.id
                );
                report.skipped += 1;
            }
            Err(e) => {
                warn!(
                    "Promotion failed for signal {}: {}; it stays NEW for the next poll",
                    signal.id, e
                );
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config() -> strategy_configs::Model {
        strategy_configs::Model {
            id: 7,
            user_id: 42,
            name: "mes-breakout".to_string(),
            symbol: "MES".to_string(),
            exchange: "CME".to_string(),
            timeframe: "15m".to_string(),
            order_type: "MARKET".to_string(),
            product_type: "INTRADAY".to_string(),
            contract_size: Decimal::from(5),
            default_quantity: Decimal::from(2),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn signal() -> generated_signals::Model {
        generated_signals::Model {
            id: 11,
            config_id: 7,
            symbol: "MES".to_string(),
            direction: "LONG".to_string(),
            price: Decimal::from_str("6496.00").unwrap(),
            stop_loss: Some(Decimal::from_str("6486.00").unwrap()),
            take_profit: Some(Decimal::from_str("6526.00").unwrap()),
            timeframe: "15m".to_string(),
            status: "NEW".to_string(),
            generated_at: Utc::now(),
            created_at: None,
        }
    }

    #[test]
    fn long_signal_maps_to_buy_intent() {
        let mapped = map_signal(&signal(), &config(), Some("REGULAR".to_string())).unwrap();
        assert_eq!(mapped.user_id.clone().unwrap(), 42);
        assert_eq!(mapped.strategy_id.clone().unwrap(), 7);
        assert_eq!(mapped.source_signal_id.clone().unwrap(), Some(11));
        assert_eq!(mapped.side.clone().unwrap(), "BUY");
        assert_eq!(mapped.status.clone().unwrap(), "PENDING");
        assert_eq!(mapped.quantity.clone().unwrap(), Decimal::from(2));
        assert_eq!(
            mapped.entry_price.clone().unwrap(),
            Decimal::from_str("6496.00").unwrap()
        );
        assert_eq!(
            mapped.market_session.clone().unwrap(),
            Some("REGULAR".to_string())
        );
    }

    #[test]
    fn short_signal_maps_to_sell_intent() {
        let mut short = signal();
        short.direction = "SHORT".to_string();
        let mapped = map_signal(&short, &config(), None).unwrap();
        assert_eq!(mapped.side.clone().unwrap(), "SELL");
    }

    #[test]
    fn unknown_direction_is_a_mapping_error() {
        let mut bad = signal();
        bad.direction = "SIDEWAYS".to_string();
        assert!(map_signal(&bad, &config(), None).is_err());
    }

    #[test]
    fn defaults_come_from_the_config() {
        let mapped = map_signal(&signal(), &config(), None).unwrap();
        assert_eq!(mapped.exchange.clone().unwrap(), "CME");
        assert_eq!(mapped.order_type.clone().unwrap(), "MARKET");
        assert_eq!(mapped.product_type.clone().unwrap(), "INTRADAY");
        assert_eq!(mapped.contract_size.clone().unwrap(), Decimal::from(5));
    }
}
