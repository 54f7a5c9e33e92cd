//! Typed failure taxonomy for the trade-creation path.
//!
//! Deliberate rejections (risk, compliance) are distinct from technical
//! failures: a rejection is user-correctable and never auto-retried, a
//! technical failure means the request could not be evaluated at all and is
//! safe to retry with backoff.

use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::models::TradeStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskViolation {
    #[error("active trade limit reached ({current}/{limit})")]
    MaxActiveTrades { current: u64, limit: i32 },
    #[error("daily trade limit reached ({current}/{limit})")]
    MaxTradesPerDay { current: u64, limit: i32 },
    #[error("stop loss is required to size trade risk")]
    MissingStopLoss,
    #[error("trade risk {risk_pct}% exceeds per-trade limit of {limit_pct}%")]
    PerTradeRisk {
        risk_pct: Decimal,
        limit_pct: Decimal,
    },
    #[error("aggregate open risk {risk_pct}% exceeds total limit of {limit_pct}%")]
    TotalRisk {
        risk_pct: Decimal,
        limit_pct: Decimal,
    },
    #[error("drawdown {drawdown_pct}% tripped the circuit breaker at {limit_pct}%")]
    DrawdownBreaker {
        drawdown_pct: Decimal,
        limit_pct: Decimal,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComplianceViolation {
    #[error("symbol {0} is not in the allowed universe")]
    SymbolNotAllowed(String),
    #[error("market holiday: {0}")]
    MarketHoliday(String),
    #[error("outside trading session: {0}")]
    OutsideSession(String),
}

#[derive(Debug, Error)]
pub enum TradeError {
    #[error(transparent)]
    Risk(#[from] RiskViolation),
    #[error(transparent)]
    Compliance(#[from] ComplianceViolation),
    #[error("invalid trade request: {0}")]
    InvalidRequest(String),
    #[error("invalid status transition {from} -> {to}")]
    InvalidTransition {
        from: TradeStatus,
        to: TradeStatus,
    },
    #[error("store operation failed: {0}")]
    Technical(#[from] DbErr),
}

impl TradeError {
    /// Deliberate rejection by a risk or compliance rule, as opposed to an
    /// evaluation that could not complete. Callers must not conflate the two.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TradeError::Risk(_) | TradeError::Compliance(_))
    }

    /// Unique-key collision on insert, e.g. a replayed request key.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(
            self,
            TradeError::Technical(e)
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        )
    }

    pub fn technical(msg: impl Into<String>) -> Self {
        TradeError::Technical(DbErr::Custom(msg.into()))
    }
}
