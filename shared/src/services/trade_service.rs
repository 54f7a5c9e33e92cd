//! Trade Lifecycle Service
//!
//! Owns the trade state machine from creation through closure. Creation is
//! gate-checked and persisted in one transaction; order routing is an
//! external collaborator, so a freshly created trade is live (RUNNING) from
//! the core's point of view. Callers that stage intents first use the
//! WAITING path and activate later.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IsolationLevel, Order, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entity::{signal_generations, trades, universal_settings};
use crate::error::TradeError;
use crate::models::{GenerationStatus, TradeRequest, TradeSide, TradeStatus};
use crate::notify::Notifier;
use crate::services::risk_gate;

/// Signed realized pnl for a filled round trip.
pub fn realized_pnl(side: TradeSide, entry: Decimal, exit: Decimal, quantity: Decimal) -> Decimal {
    match side {
        TradeSide::Buy => (exit - entry) * quantity,
        TradeSide::Sell => (entry - exit) * quantity,
    }
}

fn parse_status(trade: &trades::Model) -> Result<TradeStatus, TradeError> {
    TradeStatus::parse(&trade.status).ok_or_else(|| {
        TradeError::technical(format!(
            "trade {} has unknown status {:?}",
            trade.id, trade.status
        ))
    })
}

fn parse_side(trade: &trades::Model) -> Result<TradeSide, TradeError> {
    TradeSide::parse(&trade.side).ok_or_else(|| {
        TradeError::technical(format!("trade {} has unknown side {:?}", trade.id, trade.side))
    })
}

fn ensure_transition(from: TradeStatus, to: TradeStatus) -> Result<(), TradeError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TradeError::InvalidTransition { from, to })
    }
}

async fn find_trade(db: &DatabaseConnection, trade_id: u64) -> Result<trades::Model, TradeError> {
    trades::Entity::find_by_id(trade_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            TradeError::Technical(DbErr::RecordNotFound(format!("trade {}", trade_id)))
        })
}

async fn create_in_txn(
    txn: &DatabaseTransaction,
    request: &TradeRequest,
    initial: TradeStatus,
) -> Result<trades::Model, TradeError> {
    let settings = risk_gate::resolve_settings(txn, request.user_id, request.strategy_id)
        .await?
        .ok_or_else(|| TradeError::technical("no risk settings configured for this scope"))?;
    let universal = universal_settings::Entity::find()
        .one(txn)
        .await?
        .ok_or_else(|| TradeError::technical("universal settings row is missing"))?;

    let now = Utc::now();
    risk_gate::evaluate(txn, request, &settings, &universal, now).await?;

    let trade = trades::ActiveModel {
        user_id: ActiveValue::Set(request.user_id),
        strategy_id: ActiveValue::Set(request.strategy_id),
        signal_id: ActiveValue::Set(request.signal_id),
        request_key: ActiveValue::Set(Uuid::new_v4().to_string()),
        symbol: ActiveValue::Set(request.symbol.clone()),
        exchange: ActiveValue::Set(request.exchange.clone()),
        side: ActiveValue::Set(request.side.as_str().to_string()),
        quantity: ActiveValue::Set(request.quantity),
        entry_price: ActiveValue::Set(request.entry_price),
        exit_price: ActiveValue::Set(None),
        stop_loss: ActiveValue::Set(request.stop_loss),
        take_profit: ActiveValue::Set(request.take_profit),
        status: ActiveValue::Set(initial.as_str().to_string()),
        pnl: ActiveValue::Set(None),
        risk_reduced: ActiveValue::Set(false),
        risk_reduction_qty: ActiveValue::Set(None),
        is_active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(Some(now)),
        updated_at: ActiveValue::Set(Some(now)),
        closed_at: ActiveValue::Set(None),
        ..Default::default()
    };

    Ok(trade.insert(txn).await?)
}

async fn create_with_status(
    db: &DatabaseConnection,
    request: TradeRequest,
    initial: TradeStatus,
) -> Result<trades::Model, TradeError> {
    request.validate()?;

    // Read-committed plus the exclusive lock on the scope's settings row
    // keeps two concurrent creates for one scope from both passing the
    // aggregate risk check on a stale exposure read. The settings row is
    // locked rather than the trade rows because it exists even when the
    // scope has no trades yet.
    let txn = db
        .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
        .await?;
    match create_in_txn(&txn, &request, initial).await {
        Ok(trade) => {
            txn.commit().await?;
            info!(
                "Created trade {} ({} {} {} @ {})",
                trade.id, trade.side, trade.quantity, trade.symbol, trade.entry_price
            );
            Ok(trade)
        }
        Err(e) => {
            let _ = txn.rollback().await;
            Err(e)
        }
    }
}

/// Gate-checked creation; the trade is persisted live.
pub async fn create_trade(
    db: &DatabaseConnection,
    request: TradeRequest,
) -> Result<trades::Model, TradeError> {
    create_with_status(db, request, TradeStatus::Running).await
}

/// Gate-checked creation of a staged intent; goes live via `activate_trade`.
pub async fn create_trade_waiting(
    db: &DatabaseConnection,
    request: TradeRequest,
) -> Result<trades::Model, TradeError> {
    create_with_status(db, request, TradeStatus::Waiting).await
}

pub async fn activate_trade(
    db: &DatabaseConnection,
    trade_id: u64,
) -> Result<trades::Model, TradeError> {
    let trade = find_trade(db, trade_id).await?;
    ensure_transition(parse_status(&trade)?, TradeStatus::Running)?;

    let mut update: trades::ActiveModel = trade.into();
    update.status = ActiveValue::Set(TradeStatus::Running.as_str().to_string());
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    Ok(update.update(db).await?)
}

/// RUNNING -> CLOSED with the realized pnl backfilled from the exit price.
pub async fn close_trade(
    db: &DatabaseConnection,
    trade_id: u64,
    exit_price: Decimal,
) -> Result<trades::Model, TradeError> {
    if exit_price <= Decimal::ZERO {
        return Err(TradeError::InvalidRequest(format!(
            "exit price must be positive, got {}",
            exit_price
        )));
    }

    let trade = find_trade(db, trade_id).await?;
    ensure_transition(parse_status(&trade)?, TradeStatus::Closed)?;
    let side = parse_side(&trade)?;
    let pnl = realized_pnl(side, trade.entry_price, exit_price, trade.quantity);
    let now = Utc::now();

    let mut update: trades::ActiveModel = trade.into();
    update.status = ActiveValue::Set(TradeStatus::Closed.as_str().to_string());
    update.exit_price = ActiveValue::Set(Some(exit_price));
    update.pnl = ActiveValue::Set(Some(pnl));
    update.is_active = ActiveValue::Set(false);
    update.closed_at = ActiveValue::Set(Some(now));
    update.updated_at = ActiveValue::Set(Some(now));
    let closed = update.update(db).await?;
    info!("Closed trade {} with pnl {}", closed.id, pnl);
    Ok(closed)
}

/// Recompute the realized pnl of a CLOSED trade from its recorded exit
/// price. The one mutation a terminal state admits.
pub async fn backfill_pnl(
    db: &DatabaseConnection,
    trade_id: u64,
) -> Result<trades::Model, TradeError> {
    let trade = find_trade(db, trade_id).await?;
    if parse_status(&trade)? != TradeStatus::Closed {
        return Err(TradeError::InvalidRequest(format!(
            "pnl backfill requires a CLOSED trade, trade {} is {}",
            trade.id, trade.status
        )));
    }
    let exit_price = trade.exit_price.ok_or_else(|| {
        TradeError::InvalidRequest(format!("trade {} has no recorded exit price", trade.id))
    })?;
    let side = parse_side(&trade)?;
    let pnl = realized_pnl(side, trade.entry_price, exit_price, trade.quantity);

    let mut update: trades::ActiveModel = trade.into();
    update.pnl = ActiveValue::Set(Some(pnl));
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    Ok(update.update(db).await?)
}

/// Withdraw an intent or a live trade before it fills.
pub async fn cancel_trade(
    db: &DatabaseConnection,
    trade_id: u64,
) -> Result<trades::Model, TradeError> {
    let trade = find_trade(db, trade_id).await?;
    ensure_transition(parse_status(&trade)?, TradeStatus::Cancelled)?;

    let mut update: trades::ActiveModel = trade.into();
    update.status = ActiveValue::Set(TradeStatus::Cancelled.as_str().to_string());
    update.is_active = ActiveValue::Set(false);
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    Ok(update.update(db).await?)
}

/// Downstream rejection. Entry parameters stay untouched for audit; only
/// the status and activity flags change.
pub async fn fail_trade(
    db: &DatabaseConnection,
    trade_id: u64,
    reason: &str,
) -> Result<trades::Model, TradeError> {
    let trade = find_trade(db, trade_id).await?;
    ensure_transition(parse_status(&trade)?, TradeStatus::Failed)?;
    warn!("Trade {} failed downstream: {}", trade.id, reason);

    let mut update: trades::ActiveModel = trade.into();
    update.status = ActiveValue::Set(TradeStatus::Failed.as_str().to_string());
    update.is_active = ActiveValue::Set(false);
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    Ok(update.update(db).await?)
}

/// Partial risk-reduction inside RUNNING: quantity shrinks, status stays.
pub async fn reduce_risk(
    db: &DatabaseConnection,
    trade_id: u64,
    reduce_by: Decimal,
) -> Result<trades::Model, TradeError> {
    let trade = find_trade(db, trade_id).await?;
    if parse_status(&trade)? != TradeStatus::Running {
        return Err(TradeError::InvalidRequest(format!(
            "risk reduction requires a RUNNING trade, trade {} is {}",
            trade.id, trade.status
        )));
    }
    if reduce_by <= Decimal::ZERO || reduce_by >= trade.quantity {
        return Err(TradeError::InvalidRequest(format!(
            "reduction {} must be positive and below the open quantity {}",
            reduce_by, trade.quantity
        )));
    }

    let remaining = trade.quantity - reduce_by;
    let reduced_total = trade.risk_reduction_qty.unwrap_or(Decimal::ZERO) + reduce_by;

    let mut update: trades::ActiveModel = trade.into();
    update.quantity = ActiveValue::Set(remaining);
    update.risk_reduced = ActiveValue::Set(true);
    update.risk_reduction_qty = ActiveValue::Set(Some(reduced_total));
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    let reduced = update.update(db).await?;
    info!(
        "Reduced trade {} by {}, {} remaining",
        reduced.id, reduce_by, remaining
    );
    Ok(reduced)
}

async fn set_generation_status(
    db: &DatabaseConnection,
    generation: signal_generations::Model,
    status: GenerationStatus,
    still_active: bool,
) -> Result<(), TradeError> {
    let mut update: signal_generations::ActiveModel = generation.into();
    update.status = ActiveValue::Set(status.as_str().to_string());
    update.is_active = ActiveValue::Set(still_active);
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    update.update(db).await?;
    Ok(())
}

async fn find_generation(
    db: &DatabaseConnection,
    generation_id: u64,
) -> Result<signal_generations::Model, TradeError> {
    signal_generations::Entity::find_by_id(generation_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            TradeError::Technical(DbErr::RecordNotFound(format!(
                "signal generation {}",
                generation_id
            )))
        })
}

/// Mark a pending intent ACTIVE. Intents already resolved by processing
/// (REJECTED, EXECUTED) cannot be reactivated.
pub async fn activate_generation(
    db: &DatabaseConnection,
    generation_id: u64,
) -> Result<signal_generations::Model, TradeError> {
    let generation = find_generation(db, generation_id).await?;
    let status = GenerationStatus::parse(&generation.status).ok_or_else(|| {
        TradeError::technical(format!(
            "signal generation {} has unknown status {:?}",
            generation.id, generation.status
        ))
    })?;
    if matches!(status, GenerationStatus::Rejected | GenerationStatus::Executed) {
        return Err(TradeError::InvalidRequest(format!(
            "signal generation {} is already {}",
            generation.id, generation.status
        )));
    }

    let mut update: signal_generations::ActiveModel = generation.into();
    update.status = ActiveValue::Set(GenerationStatus::Active.as_str().to_string());
    update.is_active = ActiveValue::Set(true);
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    Ok(update.update(db).await?)
}

/// Soft-disable an intent without resolving its status.
pub async fn deactivate_generation(
    db: &DatabaseConnection,
    generation_id: u64,
) -> Result<signal_generations::Model, TradeError> {
    let generation = find_generation(db, generation_id).await?;
    let mut update: signal_generations::ActiveModel = generation.into();
    update.is_active = ActiveValue::Set(false);
    update.updated_at = ActiveValue::Set(Some(Utc::now()));
    Ok(update.update(db).await?)
}

/// Convert a PENDING trade intent into a trade. Returns Ok(true) when a
/// trade was created, Ok(false) on a deliberate rejection (the intent is
/// marked REJECTED). Technical failures leave the intent PENDING so a later
/// call can retry.
pub async fn process_signal(
    db: &DatabaseConnection,
    generation_id: u64,
    notifier: Option<&Notifier>,
) -> Result<bool, TradeError> {
    let generation = find_generation(db, generation_id).await?;

    let status = GenerationStatus::parse(&generation.status).ok_or_else(|| {
        TradeError::technical(format!(
            "signal generation {} has unknown status {:?}",
            generation.id, generation.status
        ))
    })?;
    if status != GenerationStatus::Pending {
        return Err(TradeError::InvalidRequest(format!(
            "signal generation {} is {}, expected PENDING",
            generation.id, generation.status
        )));
    }

    let side = TradeSide::parse(&generation.side).ok_or_else(|| {
        TradeError::technical(format!(
            "signal generation {} has unknown side {:?}",
            generation.id, generation.side
        ))
    })?;

    let request = TradeRequest {
        user_id: generation.user_id,
        strategy_id: Some(generation.strategy_id),
        signal_id: Some(generation.id),
        symbol: generation.symbol.clone(),
        exchange: generation.exchange.clone(),
        side,
        quantity: generation.quantity,
        entry_price: generation.entry_price,
        stop_loss: generation.stop_loss,
        take_profit: generation.take_profit,
    };

    match create_trade(db, request).await {
        Ok(trade) => {
            if let Some(notifier) = notifier {
                notifier.trade_created(&trade);
            }
            set_generation_status(db, generation, GenerationStatus::Executed, false).await?;
            Ok(true)
        }
        Err(e) if e.is_rejection() => {
            warn!(
                "Signal generation {} rejected by the gate: {}",
                generation.id, e
            );
            if let Some(notifier) = notifier {
                notifier.trade_failed(&generation.symbol, &e.to_string());
            }
            set_generation_status(db, generation, GenerationStatus::Rejected, false).await?;
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

pub async fn get_trade(
    db: &DatabaseConnection,
    trade_id: u64,
) -> Result<Option<trades::Model>, TradeError> {
    Ok(trades::Entity::find_by_id(trade_id).one(db).await?)
}

pub async fn list_trades_by_user(
    db: &DatabaseConnection,
    user_id: i64,
    limit: Option<u64>,
) -> Result<Vec<trades::Model>, TradeError> {
    let mut query = trades::Entity::find()
        .filter(trades::Column::UserId.eq(user_id))
        .order_by(trades::Column::CreatedAt, Order::Desc);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    Ok(query.all(db).await?)
}

pub async fn list_active_trades(
    db: &DatabaseConnection,
) -> Result<Vec<trades::Model>, TradeError> {
    Ok(trades::Entity::find()
        .filter(trades::Column::IsActive.eq(true))
        .filter(trades::Column::Status.is_in([
            TradeStatus::Waiting.as_str(),
            TradeStatus::Running.as_str(),
        ]))
        .order_by(trades::Column::CreatedAt, Order::Desc)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn pnl_is_signed_by_side() {
        assert_eq!(
            realized_pnl(TradeSide::Buy, dec("6496"), dec("6520"), dec("2")),
            dec("48")
        );
        assert_eq!(
            realized_pnl(TradeSide::Buy, dec("6496"), dec("6480"), dec("2")),
            dec("-32")
        );
        assert_eq!(
            realized_pnl(TradeSide::Sell, dec("6496"), dec("6480"), dec("2")),
            dec("32")
        );
        assert_eq!(
            realized_pnl(TradeSide::Sell, dec("6496"), dec("6520"), dec("2")),
            dec("-48")
        );
    }

    #[test]
    fn terminal_transitions_are_rejected() {
        for terminal in [
            TradeStatus::Closed,
            TradeStatus::Cancelled,
            TradeStatus::Failed,
        ] {
            let err = ensure_transition(terminal, TradeStatus::Running).unwrap_err();
            assert!(matches!(err, TradeError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn waiting_cannot_close_directly() {
        assert!(matches!(
            ensure_transition(TradeStatus::Waiting, TradeStatus::Closed),
            Err(TradeError::InvalidTransition { .. })
        ));
        assert!(ensure_transition(TradeStatus::Waiting, TradeStatus::Running).is_ok());
        assert!(ensure_transition(TradeStatus::Running, TradeStatus::Closed).is_ok());
    }
}
