use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UniversalSettings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UniversalSettings::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(UniversalSettings::Capital).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(UniversalSettings::Timezone).string().not_null())
                    .col(ColumnDef::new(UniversalSettings::MarketOpen).string().not_null()) // "HH:MM"
                    .col(ColumnDef::new(UniversalSettings::MarketClose).string().not_null())
                    .col(ColumnDef::new(UniversalSettings::PreMarketOpen).string().null())
                    .col(ColumnDef::new(UniversalSettings::PostMarketClose).string().null())
                    .col(ColumnDef::new(UniversalSettings::AllowedSymbols).text().not_null()) // CSV; empty allows all
                    .col(ColumnDef::new(UniversalSettings::HolidayDates).text().not_null()) // CSV of ISO dates
                    .col(ColumnDef::new(UniversalSettings::DrawdownReferenceAt).timestamp().not_null())
                    .col(ColumnDef::new(UniversalSettings::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(UniversalSettings::UpdatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP")))
                    .to_owned(),
            )
            .await?;

        // Single settings row a fresh install starts from.
        let seed = Query::insert()
            .into_table(UniversalSettings::Table)
            .columns([
                UniversalSettings::Capital,
                UniversalSettings::Timezone,
                UniversalSettings::MarketOpen,
                UniversalSettings::MarketClose,
                UniversalSettings::PreMarketOpen,
                UniversalSettings::PostMarketClose,
                UniversalSettings::AllowedSymbols,
                UniversalSettings::HolidayDates,
                UniversalSettings::DrawdownReferenceAt,
            ])
            .values_panic([
                1_000_000.into(),
                "America/New_York".into(),
                "09:30".into(),
                "16:00".into(),
                "04:00".into(),
                "20:00".into(),
                "".into(),
                "".into(),
                Expr::current_timestamp().into(),
            ])
            .to_owned();
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UniversalSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UniversalSettings {
    Table,
    Id,
    Capital,
    Timezone,
    MarketOpen,
    MarketClose,
    PreMarketOpen,
    PostMarketClose,
    AllowedSymbols,
    HolidayDates,
    DrawdownReferenceAt,
    CreatedAt,
    UpdatedAt,
}
