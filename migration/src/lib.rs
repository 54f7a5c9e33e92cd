pub use sea_orm_migration::prelude::*;

mod m20260710_000001_create_strategy_configs;
mod m20260711_000001_create_generated_signals;
mod m20260712_000001_create_signal_generations;
mod m20260713_000001_create_risk_settings;
mod m20260714_000001_create_trades;
mod m20260715_000001_create_market_data_tables;
mod m20260716_000001_create_universal_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260710_000001_create_strategy_configs::Migration),
            Box::new(m20260711_000001_create_generated_signals::Migration),
            Box::new(m20260712_000001_create_signal_generations::Migration),
            Box::new(m20260713_000001_create_risk_settings::Migration),
            Box::new(m20260714_000001_create_trades::Migration),
            Box::new(m20260715_000001_create_market_data_tables::Migration),
            Box::new(m20260716_000001_create_universal_settings::Migration),
        ]
    }
}
