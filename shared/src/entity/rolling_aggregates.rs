//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

/// One OHLC bucket of the trailing window. Overwritten wholesale by the
/// refresher; readers tolerate staleness bounded by the refresh interval.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "rolling_aggregates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub symbol: String,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub open: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub high: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub low: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub close: Decimal,
    pub bucket_start: DateTimeUtc,
    pub bucket_end: DateTimeUtc,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
