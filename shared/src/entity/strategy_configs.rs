//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "strategy_configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub user_id: i64,
    pub name: String,
    pub symbol: String,
    pub exchange: String,
    pub timeframe: String,
    pub order_type: String,   // "MARKET" or "LIMIT"
    pub product_type: String, // "INTRADAY" or "DELIVERY"
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub contract_size: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub default_quantity: Decimal,
    pub is_active: bool,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::generated_signals::Entity")]
    GeneratedSignals,
}

impl Related<super::generated_signals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneratedSignals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
