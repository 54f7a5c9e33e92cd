//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// Normalized trade intent, created exclusively by the promotion worker,
/// one per source signal.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "signal_generations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub user_id: i64,
    #[sea_orm(column_type = "BigUnsigned")]
    pub strategy_id: u64,
    #[sea_orm(column_type = "BigUnsigned", nullable)]
    pub source_signal_id: Option<u64>,
    pub symbol: String,
    pub exchange: String,
    pub order_type: String,
    pub product_type: String,
    pub side: String, // "BUY" or "SELL"
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub contract_size: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub entry_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub stop_loss: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub take_profit: Option<Decimal>,
    pub status: String, // "PENDING", "ACTIVE", "REJECTED", "EXECUTED"
    #[sea_orm(nullable)]
    pub market_session: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::generated_signals::Entity",
        from = "Column::SourceSignalId",
        to = "super::generated_signals::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    GeneratedSignals,
}

impl Related<super::generated_signals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneratedSignals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
