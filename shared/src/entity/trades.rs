//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// A risk-gated trade. Soft-deactivated via is_active, never hard-deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "trades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub user_id: i64,
    #[sea_orm(column_type = "BigUnsigned", nullable)]
    pub strategy_id: Option<u64>,
    #[sea_orm(column_type = "BigUnsigned", nullable)]
    pub signal_id: Option<u64>,
    #[sea_orm(unique)]
    pub request_key: String,
    pub symbol: String,
    pub exchange: String,
    pub side: String, // "BUY" or "SELL"
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub entry_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub exit_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub stop_loss: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub take_profit: Option<Decimal>,
    pub status: String, // "WAITING", "RUNNING", "CLOSED", "CANCELLED", "FAILED"
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub pnl: Option<Decimal>,
    pub risk_reduced: bool,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub risk_reduction_qty: Option<Decimal>,
    pub is_active: bool,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
    pub closed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::signal_generations::Entity",
        from = "Column::SignalId",
        to = "super::signal_generations::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SignalGenerations,
}

impl Related<super::signal_generations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SignalGenerations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
