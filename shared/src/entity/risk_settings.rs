//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// Risk limits scoped per (user, strategy), unique on that pair. The row
/// with both columns null is the global default.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "risk_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    #[sea_orm(nullable)]
    pub user_id: Option<i64>,
    #[sea_orm(column_type = "BigUnsigned", nullable)]
    pub strategy_id: Option<u64>,
    pub max_active_trades: i32,
    pub max_trades_per_day: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub max_risk_per_trade_pct: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub max_total_risk_pct: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub max_drawdown_pct: Decimal,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
