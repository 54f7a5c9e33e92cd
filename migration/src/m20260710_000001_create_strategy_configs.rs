use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StrategyConfigs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StrategyConfigs::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(StrategyConfigs::UserId).big_integer().not_null())
                    .col(ColumnDef::new(StrategyConfigs::Name).string().not_null())
                    .col(ColumnDef::new(StrategyConfigs::Symbol).string().not_null())
                    .col(ColumnDef::new(StrategyConfigs::Exchange).string().not_null())
                    .col(ColumnDef::new(StrategyConfigs::Timeframe).string().not_null())
                    .col(ColumnDef::new(StrategyConfigs::OrderType).string().not_null().default("MARKET"))
                    .col(ColumnDef::new(StrategyConfigs::ProductType).string().not_null().default("INTRADAY"))
                    .col(ColumnDef::new(StrategyConfigs::ContractSize).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(StrategyConfigs::DefaultQuantity).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(StrategyConfigs::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(StrategyConfigs::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(StrategyConfigs::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_strategy_configs_user")
                            .table(StrategyConfigs::Table)
                            .col(StrategyConfigs::UserId)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StrategyConfigs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum StrategyConfigs {
    Table,
    Id,
    UserId,
    Name,
    Symbol,
    Exchange,
    Timeframe,
    OrderType,
    ProductType,
    ContractSize,
    DefaultQuantity,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
