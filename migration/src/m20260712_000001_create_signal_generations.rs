use sea_orm_migration::prelude::*;

use crate::m20260711_000001_create_generated_signals::GeneratedSignals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SignalGenerations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SignalGenerations::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(SignalGenerations::UserId).big_integer().not_null())
                    .col(ColumnDef::new(SignalGenerations::StrategyId).big_unsigned().not_null())
                    .col(ColumnDef::new(SignalGenerations::SourceSignalId).big_unsigned().null())
                    .col(ColumnDef::new(SignalGenerations::Symbol).string().not_null())
                    .col(ColumnDef::new(SignalGenerations::Exchange).string().not_null())
                    .col(ColumnDef::new(SignalGenerations::OrderType).string().not_null())
                    .col(ColumnDef::new(SignalGenerations::ProductType).string().not_null())
                    .col(ColumnDef::new(SignalGenerations::Side).string().not_null()) // "BUY" or "SELL"
                    .col(ColumnDef::new(SignalGenerations::ContractSize).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(SignalGenerations::Quantity).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(SignalGenerations::EntryPrice).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(SignalGenerations::StopLoss).decimal_len(20, 8).null())
                    .col(ColumnDef::new(SignalGenerations::TakeProfit).decimal_len(20, 8).null())
                    .col(ColumnDef::new(SignalGenerations::Status).string().not_null().default("PENDING")) // "PENDING", "ACTIVE", "REJECTED", "EXECUTED"
                    .col(ColumnDef::new(SignalGenerations::MarketSession).string().null())
                    .col(ColumnDef::new(SignalGenerations::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(SignalGenerations::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(SignalGenerations::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    // One generation per source signal; the promotion
                    // idempotency check leans on this.
                    .index(
                        Index::create()
                            .name("uq_signal_generations_source")
                            .table(SignalGenerations::Table)
                            .col(SignalGenerations::SourceSignalId)
                            .unique()
                    )
                    .index(
                        Index::create()
                            .name("idx_signal_generations_user_strategy")
                            .table(SignalGenerations::Table)
                            .col(SignalGenerations::UserId)
                            .col(SignalGenerations::StrategyId)
                    )
                    .index(
                        Index::create()
                            .name("idx_signal_generations_status")
                            .table(SignalGenerations::Table)
                            .col(SignalGenerations::Status)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_signal_generations_source")
                            .from(SignalGenerations::Table, SignalGenerations::SourceSignalId)
                            .to(GeneratedSignals::Table, GeneratedSignals::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SignalGenerations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SignalGenerations {
    Table,
    Id,
    UserId,
    StrategyId,
    SourceSignalId,
    Symbol,
    Exchange,
    OrderType,
    ProductType,
    Side,
    ContractSize,
    Quantity,
    EntryPrice,
    StopLoss,
    TakeProfit,
    Status,
    MarketSession,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
