//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// Scanner output. Created by the external detection process, mutated only
/// by the promotion worker (status NEW -> PROMOTED), never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "generated_signals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    #[sea_orm(column_type = "BigUnsigned")]
    pub config_id: u64,
    pub symbol: String,
    pub direction: String, // "LONG" or "SHORT"
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub stop_loss: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))", nullable)]
    pub take_profit: Option<Decimal>,
    pub timeframe: String,
    pub status: String, // "NEW" or "PROMOTED"
    pub generated_at: DateTimeUtc,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::strategy_configs::Entity",
        from = "Column::ConfigId",
        to = "super::strategy_configs::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    StrategyConfigs,
}

impl Related<super::strategy_configs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StrategyConfigs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
