//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// Single-row table: allocated capital, session windows, symbol universe
/// and holiday calendar. Read-only to the gate.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "universal_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub capital: Decimal,
    pub timezone: String,
    pub market_open: String,  // "HH:MM" in the configured timezone
    pub market_close: String, // "HH:MM"
    #[sea_orm(nullable)]
    pub pre_market_open: Option<String>,
    #[sea_orm(nullable)]
    pub post_market_close: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub allowed_symbols: String, // comma separated; empty allows all
    #[sea_orm(column_type = "Text")]
    pub holiday_dates: String, // comma separated ISO dates
    pub drawdown_reference_at: DateTimeUtc,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
