use sea_orm_migration::prelude::*;

use crate::m20260710_000001_create_strategy_configs::StrategyConfigs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Scanner output; rows are never deleted so the table doubles as the
        // promotion audit trail.
        manager
            .create_table(
                Table::create()
                    .table(GeneratedSignals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GeneratedSignals::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(GeneratedSignals::ConfigId).big_unsigned().not_null())
                    .col(ColumnDef::new(GeneratedSignals::Symbol).string().not_null())
                    .col(ColumnDef::new(GeneratedSignals::Direction).string().not_null()) // "LONG" or "SHORT"
                    .col(ColumnDef::new(GeneratedSignals::Price).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(GeneratedSignals::StopLoss).decimal_len(20, 8).null())
                    .col(ColumnDef::new(GeneratedSignals::TakeProfit).decimal_len(20, 8).null())
                    .col(ColumnDef::new(GeneratedSignals::Timeframe).string().not_null())
                    .col(ColumnDef::new(GeneratedSignals::Status).string().not_null().default("NEW")) // "NEW", "PROMOTED"
                    .col(ColumnDef::new(GeneratedSignals::GeneratedAt).timestamp().not_null())
                    .col(ColumnDef::new(GeneratedSignals::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_generated_signals_status")
                            .table(GeneratedSignals::Table)
                            .col(GeneratedSignals::Status)
                    )
                    .index(
                        Index::create()
                            .name("idx_generated_signals_symbol")
                            .table(GeneratedSignals::Table)
                            .col(GeneratedSignals::Symbol)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generated_signals_config")
                            .from(GeneratedSignals::Table, GeneratedSignals::ConfigId)
                            .to(StrategyConfigs::Table, StrategyConfigs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GeneratedSignals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum GeneratedSignals {
    Table,
    Id,
    ConfigId,
    Symbol,
    Direction,
    Price,
    StopLoss,
    TakeProfit,
    Timeframe,
    Status,
    GeneratedAt,
    CreatedAt,
}
