//! Risk & Compliance Gate
//!
//! Layered validation invoked by the trade-creation path before any trade
//! row is persisted. Checks are sequential and short-circuiting; the first
//! failing limit is reported. Settings resolution locks the scope's
//! settings row, so two concurrent create calls cannot both pass the
//! aggregate risk check on a stale exposure view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    QueryTrait, Select,
};

use crate::entity::{risk_settings, trades, universal_settings};
use crate::error::{RiskViolation, TradeError};
use crate::models::{TradeRequest, TradeStatus};
use crate::services::compliance;

/// Exposure of a (user, strategy) scope at evaluation time.
#[derive(Debug, Clone, Default)]
pub struct ExposureSnapshot {
    pub active_trades: u64,
    pub trades_today: u64,
    /// Sum of quantity x |entry - stop| over active trades.
    pub open_risk: Decimal,
    /// Net realized loss since the drawdown reference point; zero when the
    /// scope is net positive.
    pub realized_loss: Decimal,
}

/// Resolve the applicable limits: (user, strategy), then the user's
/// default, then the global default row. The winning row is read FOR
/// UPDATE: it is the serialization point for concurrent creates in the
/// scope. The active-trade set cannot play that role because a scope with
/// no trades yet matches zero rows, and an empty FOR-UPDATE scan takes no
/// lock under read committed.
pub async fn resolve_settings<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    strategy_id: Option<u64>,
) -> Result<Option<risk_settings::Model>, DbErr> {
    if let Some(sid) = strategy_id {
        let found = risk_settings::Entity::find()
            .filter(risk_settings::Column::UserId.eq(user_id))
            .filter(risk_settings::Column::StrategyId.eq(sid))
            .lock_exclusive()
            .one(conn)
            .await?;
        if found.is_some() {
            return Ok(found);
        }
    }

    let found = risk_settings::Entity::find()
        .filter(risk_settings::Column::UserId.eq(user_id))
        .filter(risk_settings::Column::StrategyId.is_null())
        .lock_exclusive()
        .one(conn)
        .await?;
    if found.is_some() {
        return Ok(found);
    }

    risk_settings::Entity::find()
        .filter(risk_settings::Column::UserId.is_null())
        .filter(risk_settings::Column::StrategyId.is_null())
        .lock_exclusive()
        .one(conn)
        .await
}

fn scoped(select: Select<trades::Entity>, user_id: i64, strategy_id: Option<u64>) -> Select<trades::Entity> {
    select
        .filter(trades::Column::UserId.eq(user_id))
        .apply_if(strategy_id, |query, sid| {
            query.filter(trades::Column::StrategyId.eq(sid))
        })
}

/// Gather the scope's exposure inside the caller's transaction. Concurrent
/// creates are already serialized on the settings row; the exclusive lock
/// on the active trade scan additionally pins those rows against a
/// concurrent close or risk-reduction while the checks run.
pub async fn gather_exposure<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    strategy_id: Option<u64>,
    drawdown_reference_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<ExposureSnapshot, DbErr> {
    let open_statuses = [TradeStatus::Waiting.as_str(), TradeStatus::Running.as_str()];

    let active = scoped(trades::Entity::find(), user_id, strategy_id)
        .filter(trades::Column::IsActive.eq(true))
        .filter(trades::Column::Status.is_in(open_statuses))
        .lock_exclusive()
        .all(conn)
        .await?;

    let open_risk: Decimal = active
        .iter()
        .filter_map(|trade| {
            trade
                .stop_loss
                .map(|sl| trade.quantity * (trade.entry_price - sl).abs())
        })
        .sum();

    // Day boundary in UTC; the per-day limit is a coarse throttle, not a
    // session-aligned one.
    let day_start = now
        .date_naive()
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    let trades_today = scoped(trades::Entity::find(), user_id, strategy_id)
        .filter(trades::Column::CreatedAt.gte(day_start))
        .count(conn)
        .await?;

    let closed = scoped(trades::Entity::find(), user_id, strategy_id)
        .filter(trades::Column::Status.eq(TradeStatus::Closed.as_str()))
        .filter(trades::Column::ClosedAt.gte(drawdown_reference_at))
        .all(conn)
        .await?;
    let net_realized: Decimal = closed.iter().filter_map(|trade| trade.pnl).sum();
    let realized_loss = if net_realized < Decimal::ZERO {
        -net_realized
    } else {
        Decimal::ZERO
    };

    Ok(ExposureSnapshot {
        active_trades: active.len() as u64,
        trades_today,
        open_risk,
        realized_loss,
    })
}

/// Pure limit enforcement over a gathered snapshot, in check order:
/// active count, daily count, per-trade risk, aggregate risk, drawdown.
pub fn enforce_limits(
    settings: &risk_settings::Model,
    capital: Decimal,
    snapshot: &ExposureSnapshot,
    request: &TradeRequest,
) -> Result<(), TradeError> {
    if capital <= Decimal::ZERO {
        return Err(TradeError::technical("allocated capital is not configured"));
    }

    if snapshot.active_trades >= settings.max_active_trades.max(0) as u64 {
        return Err(RiskViolation::MaxActiveTrades {
            current: snapshot.active_trades,
            limit: settings.max_active_trades,
        }
        .into());
    }

    if snapshot.trades_today >= settings.max_trades_per_day.max(0) as u64 {
        return Err(RiskViolation::MaxTradesPerDay {
            current: snapshot.trades_today,
            limit: settings.max_trades_per_day,
        }
        .into());
    }

    let risk_amount = request
        .capital_at_risk()
        .ok_or(TradeError::Risk(RiskViolation::MissingStopLoss))?;
    let hundred = Decimal::from(100);

    let risk_pct = risk_amount / capital * hundred;
    if risk_pct > settings.max_risk_per_trade_pct {
        return Err(RiskViolation::PerTradeRisk {
            risk_pct,
            limit_pct: settings.max_risk_per_trade_pct,
        }
        .into());
    }

    let total_pct = (snapshot.open_risk + risk_amount) / capital * hundred;
    if total_pct > settings.max_total_risk_pct {
        return Err(RiskViolation::TotalRisk {
            risk_pct: total_pct,
            limit_pct: settings.max_total_risk_pct,
        }
        .into());
    }

    let drawdown_pct = snapshot.realized_loss / capital * hundred;
    if drawdown_pct > settings.max_drawdown_pct {
        return Err(RiskViolation::DrawdownBreaker {
            drawdown_pct,
            limit_pct: settings.max_drawdown_pct,
        }
        .into());
    }

    Ok(())
}

/// Full gate: gather exposure under lock, enforce risk limits, then run
/// compliance. Store failures surface as technical errors, never as a
/// rejection.
pub async fn evaluate<C: ConnectionTrait>(
    conn: &C,
    request: &TradeRequest,
    settings: &risk_settings::Model,
    universal: &universal_settings::Model,
    now: DateTime<Utc>,
) -> Result<(), TradeError> {
    let snapshot = gather_exposure(
        conn,
        request.user_id,
        request.strategy_id,
        universal.drawdown_reference_at,
        now,
    )
    .await?;
    enforce_limits(settings, universal.capital, &snapshot, request)?;
    compliance::check_compliance(universal, &request.symbol, now)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeSide;
    use std::str::FromStr;

    fn settings() -> risk_settings::Model {
        risk_settings::Model {
            id: 1,
            user_id: Some(1),
            strategy_id: Some(7),
            max_active_trades: 3,
            max_trades_per_day: 10,
            max_risk_per_trade_pct: Decimal::from(1),
            max_total_risk_pct: Decimal::from(3),
            max_drawdown_pct: Decimal::from(10),
            created_at: None,
            updated_at: None,
        }
    }

    fn request(quantity: i64, entry: &str, stop: &str) -> TradeRequest {
        TradeRequest {
            user_id: 1,
            strategy_id: Some(7),
            signal_id: None,
            symbol: "MES".to_string(),
            exchange: "CME".to_string(),
            side: TradeSide::Buy,
            quantity: Decimal::from(quantity),
            entry_price: Decimal::from_str(entry).unwrap(),
            stop_loss: Some(Decimal::from_str(stop).unwrap()),
            take_profit: None,
        }
    }

    fn capital() -> Decimal {
        Decimal::from(100_000)
    }

    #[test]
    fn clean_snapshot_passes() {
        // 2 x |6496 - 6486| = 20 risk on 100k capital: 0.02%.
        let req = request(2, "6496.00", "6486.00");
        let snapshot = ExposureSnapshot::default();
        assert!(enforce_limits(&settings(), capital(), &snapshot, &req).is_ok());
    }

    #[test]
    fn active_trade_limit() {
        let req = request(2, "6496.00", "6486.00");
        let snapshot = ExposureSnapshot {
            active_trades: 3,
            ..Default::default()
        };
        assert!(matches!(
            enforce_limits(&settings(), capital(), &snapshot, &req),
            Err(TradeError::Risk(RiskViolation::MaxActiveTrades { current: 3, limit: 3 }))
        ));
    }

    #[test]
    fn daily_trade_limit() {
        let req = request(2, "6496.00", "6486.00");
        let snapshot = ExposureSnapshot {
            trades_today: 10,
            ..Default::default()
        };
        assert!(matches!(
            enforce_limits(&settings(), capital(), &snapshot, &req),
            Err(TradeError::Risk(RiskViolation::MaxTradesPerDay { .. }))
        ));
    }

    #[test]
    fn stop_loss_is_mandatory_for_sizing() {
        let mut req = request(2, "6496.00", "6486.00");
        req.stop_loss = None;
        assert!(matches!(
            enforce_limits(&settings(), capital(), &ExposureSnapshot::default(), &req),
            Err(TradeError::Risk(RiskViolation::MissingStopLoss))
        ));
    }

    #[test]
    fn per_trade_risk_limit() {
        // 200 x 10 = 2000 risk on 100k capital: 2% > 1% limit.
        let req = request(200, "6496.00", "6486.00");
        let result = enforce_limits(&settings(), capital(), &ExposureSnapshot::default(), &req);
        match result {
            Err(TradeError::Risk(RiskViolation::PerTradeRisk { risk_pct, limit_pct })) => {
                assert_eq!(risk_pct, Decimal::from(2));
                assert_eq!(limit_pct, Decimal::from(1));
            }
            other => panic!("expected per-trade violation, got {:?}", other.err()),
        }
    }

    #[test]
    fn aggregate_risk_limit() {
        // Proposed trade alone is fine (0.9%), but 2500 already at risk
        // pushes the total to 3.4% > 3%.
        let req = request(90, "6496.00", "6486.00");
        let snapshot = ExposureSnapshot {
            active_trades: 1,
            open_risk: Decimal::from(2500),
            ..Default::default()
        };
        assert!(matches!(
            enforce_limits(&settings(), capital(), &snapshot, &req),
            Err(TradeError::Risk(RiskViolation::TotalRisk { .. }))
        ));
    }

    #[test]
    fn sequential_requests_share_the_budget() {
        // Mirrors two concurrent creates serialized by the settings-row lock:
        // the first fills most of the aggregate budget, the second must fail
        // even though it would pass against an empty snapshot.
        let mut settings = settings();
        settings.max_risk_per_trade_pct = Decimal::from_str("2.5").unwrap();
        let first = request(100, "6496.00", "6471.00"); // 2500 = 2.5%
        assert!(enforce_limits(&settings, capital(), &ExposureSnapshot::default(), &first).is_ok());

        let after_first = ExposureSnapshot {
            active_trades: 1,
            open_risk: first.capital_at_risk().unwrap(),
            ..Default::default()
        };
        let second = request(60, "6496.00", "6486.00"); // 600 more, 3.1% total
        assert!(
            enforce_limits(&settings, capital(), &ExposureSnapshot::default(), &second).is_ok()
        );
        assert!(matches!(
            enforce_limits(&settings, capital(), &after_first, &second),
            Err(TradeError::Risk(RiskViolation::TotalRisk { .. }))
        ));
    }

    #[test]
    fn drawdown_circuit_breaker() {
        let req = request(2, "6496.00", "6486.00");
        let snapshot = ExposureSnapshot {
            realized_loss: Decimal::from(10_001),
            ..Default::default()
        };
        assert!(matches!(
            enforce_limits(&settings(), capital(), &snapshot, &req),
            Err(TradeError::Risk(RiskViolation::DrawdownBreaker { .. }))
        ));
    }

    #[test]
    fn zero_capital_is_technical() {
        let req = request(2, "6496.00", "6486.00");
        let err =
            enforce_limits(&settings(), Decimal::ZERO, &ExposureSnapshot::default(), &req)
                .unwrap_err();
        assert!(!err.is_rejection());
    }
}
