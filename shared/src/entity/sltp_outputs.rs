//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// Append-only stop-loss/take-profit levels, one row per computation.
/// The full history is kept as an audit trail of gate inputs.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sltp_outputs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub symbol: String,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub close: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub atr: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub sl_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub tp_price: Decimal,
    pub computed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
