use sea_orm_migration::prelude::*;

use crate::m20260712_000001_create_signal_generations::SignalGenerations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trades::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trades::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(Trades::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Trades::StrategyId).big_unsigned().null())
                    .col(ColumnDef::new(Trades::SignalId).big_unsigned().null())
                    .col(ColumnDef::new(Trades::RequestKey).string().not_null())
                    .col(ColumnDef::new(Trades::Symbol).string().not_null())
                    .col(ColumnDef::new(Trades::Exchange).string().not_null())
                    .col(ColumnDef::new(Trades::Side).string().not_null()) // "BUY" or "SELL"
                    .col(ColumnDef::new(Trades::Quantity).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(Trades::EntryPrice).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(Trades::ExitPrice).decimal_len(20, 8).null())
                    .col(ColumnDef::new(Trades::StopLoss).decimal_len(20, 8).null())
                    .col(ColumnDef::new(Trades::TakeProfit).decimal_len(20, 8).null())
                    .col(ColumnDef::new(Trades::Status).string().not_null()) // "WAITING", "RUNNING", "CLOSED", "CANCELLED", "FAILED"
                    .col(ColumnDef::new(Trades::Pnl).decimal_len(20, 8).null())
                    .col(ColumnDef::new(Trades::RiskReduced).boolean().not_null().default(false))
                    .col(ColumnDef::new(Trades::RiskReductionQty).decimal_len(20, 8).null())
                    .col(ColumnDef::new(Trades::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Trades::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Trades::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Trades::ClosedAt).timestamp().null())
                    // The request key is the idempotency guard for retried
                    // create calls.
                    .index(
                        Index::create()
                            .name("uq_trades_request_key")
                            .table(Trades::Table)
                            .col(Trades::RequestKey)
                            .unique()
                    )
                    .index(
                        Index::create()
                            .name("idx_trades_scope_created")
                            .table(Trades::Table)
                            .col(Trades::UserId)
                            .col(Trades::StrategyId)
                            .col(Trades::Symbol)
                            .col(Trades::CreatedAt)
                    )
                    .index(
                        Index::create()
                            .name("idx_trades_user_status")
                            .table(Trades::Table)
                            .col(Trades::UserId)
                            .col(Trades::Status)
                    )
                    .index(
                        Index::create()
                            .name("idx_trades_active")
                            .table(Trades::Table)
                            .col(Trades::IsActive)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trades_signal")
                            .from(Trades::Table, Trades::SignalId)
                            .to(SignalGenerations::Table, SignalGenerations::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trades::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trades {
    Table,
    Id,
    UserId,
    StrategyId,
    SignalId,
    RequestKey,
    Symbol,
    Exchange,
    Side,
    Quantity,
    EntryPrice,
    ExitPrice,
    StopLoss,
    TakeProfit,
    Status,
    Pnl,
    RiskReduced,
    RiskReductionQty,
    IsActive,
    CreatedAt,
    UpdatedAt,
    ClosedAt,
}
