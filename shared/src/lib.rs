pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod indicators;
pub mod models;
pub mod notify;
pub mod services;

pub use config::Config;
pub use database::connect;
pub use error::{ComplianceViolation, RiskViolation, TradeError};
pub use models::{Direction, GenerationStatus, SignalStatus, TradeRequest, TradeSide, TradeStatus};
pub use notify::Notifier;
