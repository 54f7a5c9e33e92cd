use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradeError;

/// Direction of a scanner signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LONG" => Some(Direction::Long),
            "SHORT" => Some(Direction::Short),
            _ => None,
        }
    }

    pub fn to_side(self) -> TradeSide {
        match self {
            Direction::Long => TradeSide::Buy,
            Direction::Short => TradeSide::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(TradeSide::Buy),
            "SELL" => Some(TradeSide::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scanner output lifecycle: a signal is promoted at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStatus {
    New,
    Promoted,
}

impl SignalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::New => "NEW",
            SignalStatus::Promoted => "PROMOTED",
        }
    }
}

/// Lifecycle of a normalized trade intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Pending,
    Active,
    Rejected,
    Executed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "PENDING",
            GenerationStatus::Active => "ACTIVE",
            GenerationStatus::Rejected => "REJECTED",
            GenerationStatus::Executed => "EXECUTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(GenerationStatus::Pending),
            "ACTIVE" => Some(GenerationStatus::Active),
            "REJECTED" => Some(GenerationStatus::Rejected),
            "EXECUTED" => Some(GenerationStatus::Executed),
            _ => None,
        }
    }
}

/// Trade state machine. CLOSED, CANCELLED and FAILED are terminal;
/// the only mutation allowed past them is pnl backfill on CLOSED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Waiting,
    Running,
    Closed,
    Cancelled,
    Failed,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Waiting => "WAITING",
            TradeStatus::Running => "RUNNING",
            TradeStatus::Closed => "CLOSED",
            TradeStatus::Cancelled => "CANCELLED",
            TradeStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "WAITING" => Some(TradeStatus::Waiting),
            "RUNNING" => Some(TradeStatus::Running),
            "CLOSED" => Some(TradeStatus::Closed),
            "CANCELLED" => Some(TradeStatus::Cancelled),
            "FAILED" => Some(TradeStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TradeStatus::Closed | TradeStatus::Cancelled | TradeStatus::Failed
        )
    }

    pub fn can_transition_to(&self, to: TradeStatus) -> bool {
        match (self, to) {
            (TradeStatus::Waiting, TradeStatus::Running) => true,
            (TradeStatus::Waiting, TradeStatus::Cancelled) => true,
            (TradeStatus::Waiting, TradeStatus::Failed) => true,
            (TradeStatus::Running, TradeStatus::Closed) => true,
            (TradeStatus::Running, TradeStatus::Cancelled) => true,
            (TradeStatus::Running, TradeStatus::Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound create-trade request, shared by the API and signal processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub user_id: i64,
    pub strategy_id: Option<u64>,
    pub signal_id: Option<u64>,
    pub symbol: String,
    pub exchange: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}

impl TradeRequest {
    pub fn validate(&self) -> Result<(), TradeError> {
        if self.symbol.trim().is_empty() {
            return Err(TradeError::InvalidRequest("symbol is empty".to_string()));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(TradeError::InvalidRequest(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if self.entry_price <= Decimal::ZERO {
            return Err(TradeError::InvalidRequest(format!(
                "entry price must be positive, got {}",
                self.entry_price
            )));
        }
        if let Some(sl) = self.stop_loss {
            if sl <= Decimal::ZERO {
                return Err(TradeError::InvalidRequest(format!(
                    "stop loss must be positive, got {}",
                    sl
                )));
            }
        }
        if let Some(tp) = self.take_profit {
            if tp <= Decimal::ZERO {
                return Err(TradeError::InvalidRequest(format!(
                    "take profit must be positive, got {}",
                    tp
                )));
            }
        }
        Ok(())
    }

    /// Capital at risk if the stop is hit: quantity x |entry - stop|.
    pub fn capital_at_risk(&self) -> Option<Decimal> {
        self.stop_loss
            .map(|sl| self.quantity * (self.entry_price - sl).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn request() -> TradeRequest {
        TradeRequest {
            user_id: 1,
            strategy_id: Some(7),
            signal_id: None,
            symbol: "MES".to_string(),
            exchange: "CME".to_string(),
            side: TradeSide::Buy,
            quantity: Decimal::from(2),
            entry_price: Decimal::from_str("6496.00").unwrap(),
            stop_loss: Some(Decimal::from_str("6486.00").unwrap()),
            take_profit: Some(Decimal::from_str("6526.00").unwrap()),
        }
    }

    #[test]
    fn terminal_states_admit_no_transition() {
        for terminal in [
            TradeStatus::Closed,
            TradeStatus::Cancelled,
            TradeStatus::Failed,
        ] {
            assert!(terminal.is_terminal());
            for to in [
                TradeStatus::Waiting,
                TradeStatus::Running,
                TradeStatus::Closed,
                TradeStatus::Cancelled,
                TradeStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(to));
            }
        }
    }

    #[test]
    fn running_transitions() {
        assert!(TradeStatus::Running.can_transition_to(TradeStatus::Closed));
        assert!(TradeStatus::Running.can_transition_to(TradeStatus::Cancelled));
        assert!(TradeStatus::Running.can_transition_to(TradeStatus::Failed));
        assert!(!TradeStatus::Running.can_transition_to(TradeStatus::Waiting));
        assert!(!TradeStatus::Running.can_transition_to(TradeStatus::Running));
    }

    #[test]
    fn waiting_transitions() {
        assert!(TradeStatus::Waiting.can_transition_to(TradeStatus::Running));
        assert!(TradeStatus::Waiting.can_transition_to(TradeStatus::Cancelled));
        assert!(TradeStatus::Waiting.can_transition_to(TradeStatus::Failed));
        assert!(!TradeStatus::Waiting.can_transition_to(TradeStatus::Closed));
    }

    #[test]
    fn status_round_trip() {
        for status in [
            TradeStatus::Waiting,
            TradeStatus::Running,
            TradeStatus::Closed,
            TradeStatus::Cancelled,
            TradeStatus::Failed,
        ] {
            assert_eq!(TradeStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TradeStatus::parse("bogus"), None);
    }

    #[test]
    fn direction_maps_to_side() {
        assert_eq!(Direction::Long.to_side(), TradeSide::Buy);
        assert_eq!(Direction::Short.to_side(), TradeSide::Sell);
        assert_eq!(Direction::parse("long"), Some(Direction::Long));
        assert_eq!(Direction::parse("flat"), None);
    }

    #[test]
    fn request_validation() {
        assert!(request().validate().is_ok());

        let mut bad = request();
        bad.quantity = Decimal::ZERO;
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.entry_price = Decimal::from(-1);
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.symbol = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn capital_at_risk_uses_stop_distance() {
        let req = request();
        assert_eq!(
            req.capital_at_risk(),
            Some(Decimal::from_str("20.00").unwrap())
        );

        let mut no_stop = request();
        no_stop.stop_loss = None;
        assert_eq!(no_stop.capital_at_risk(), None);
    }
}
