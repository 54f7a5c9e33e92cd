use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RiskSettings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RiskSettings::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(RiskSettings::UserId).big_integer().null())
                    .col(ColumnDef::new(RiskSettings::StrategyId).big_unsigned().null())
                    .col(ColumnDef::new(RiskSettings::MaxActiveTrades).integer().not_null())
                    .col(ColumnDef::new(RiskSettings::MaxTradesPerDay).integer().not_null())
                    .col(ColumnDef::new(RiskSettings::MaxRiskPerTradePct).decimal_len(10, 4).not_null())
                    .col(ColumnDef::new(RiskSettings::MaxTotalRiskPct).decimal_len(10, 4).not_null())
                    .col(ColumnDef::new(RiskSettings::MaxDrawdownPct).decimal_len(10, 4).not_null())
                    .col(ColumnDef::new(RiskSettings::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(RiskSettings::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    // One settings row per scope; the all-null row is the
                    // global default.
                    .index(
                        Index::create()
                            .name("uq_risk_settings_scope")
                            .table(RiskSettings::Table)
                            .col(RiskSettings::UserId)
                            .col(RiskSettings::StrategyId)
                            .unique()
                    )
                    .to_owned(),
            )
            .await?;

        // Seed the global default so a fresh install can gate trades
        // before any per-user configuration exists.
        let seed = Query::insert()
            .into_table(RiskSettings::Table)
            .columns([
                RiskSettings::MaxActiveTrades,
                RiskSettings::MaxTradesPerDay,
                RiskSettings::MaxRiskPerTradePct,
                RiskSettings::MaxTotalRiskPct,
                RiskSettings::MaxDrawdownPct,
            ])
            .values_panic([
                5.into(),
                20.into(),
                1.0.into(),
                3.0.into(),
                10.0.into(),
            ])
            .to_owned();
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RiskSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RiskSettings {
    Table,
    Id,
    UserId,
    StrategyId,
    MaxActiveTrades,
    MaxTradesPerDay,
    MaxRiskPerTradePct,
    MaxTotalRiskPct,
    MaxDrawdownPct,
    CreatedAt,
    UpdatedAt,
}
