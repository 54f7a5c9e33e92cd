use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Raw tick feed, written by the external data process.
        manager
            .create_table(
                Table::create()
                    .table(MarketTicks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MarketTicks::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(MarketTicks::Symbol).string().not_null())
                    .col(ColumnDef::new(MarketTicks::Price).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(MarketTicks::Volume).decimal_len(20, 8).null())
                    .col(ColumnDef::new(MarketTicks::TickTime).timestamp().not_null())
                    .index(
                        Index::create()
                            .name("idx_market_ticks_symbol_time")
                            .table(MarketTicks::Table)
                            .col(MarketTicks::Symbol)
                            .col(MarketTicks::TickTime)
                    )
                    .to_owned(),
            )
            .await?;

        // The trailing OHLC window recomputed by the refresher.
        manager
            .create_table(
                Table::create()
                    .table(RollingAggregates::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RollingAggregates::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(RollingAggregates::Symbol).string().not_null())
                    .col(ColumnDef::new(RollingAggregates::Open).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(RollingAggregates::High).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(RollingAggregates::Low).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(RollingAggregates::Close).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(RollingAggregates::BucketStart).timestamp().not_null())
                    .col(ColumnDef::new(RollingAggregates::BucketEnd).timestamp().not_null())
                    .col(ColumnDef::new(RollingAggregates::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("uq_rolling_aggregates_symbol_bucket")
                            .table(RollingAggregates::Table)
                            .col(RollingAggregates::Symbol)
                            .col(RollingAggregates::BucketStart)
                            .unique()
                    )
                    .to_owned(),
            )
            .await?;

        // Append-only SL/TP computations.
        manager
            .create_table(
                Table::create()
                    .table(SltpOutputs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SltpOutputs::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(SltpOutputs::Symbol).string().not_null())
                    .col(ColumnDef::new(SltpOutputs::Close).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(SltpOutputs::Atr).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(SltpOutputs::SlPrice).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(SltpOutputs::TpPrice).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(SltpOutputs::ComputedAt).timestamp().not_null())
                    .index(
                        Index::create()
                            .name("idx_sltp_outputs_symbol_time")
                            .table(SltpOutputs::Table)
                            .col(SltpOutputs::Symbol)
                            .col(SltpOutputs::ComputedAt)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SltpOutputs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RollingAggregates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarketTicks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MarketTicks {
    Table,
    Id,
    Symbol,
    Price,
    Volume,
    TickTime,
}

#[derive(DeriveIden)]
pub enum RollingAggregates {
    Table,
    Id,
    Symbol,
    Open,
    High,
    Low,
    Close,
    BucketStart,
    BucketEnd,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum SltpOutputs {
    Table,
    Id,
    Symbol,
    Close,
    Atr,
    SlPrice,
    TpPrice,
    ComputedAt,
}
