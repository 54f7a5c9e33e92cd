pub mod generated_signals;
pub mod market_ticks;
pub mod risk_settings;
pub mod rolling_aggregates;
pub mod signal_generations;
pub mod sltp_outputs;
pub mod strategy_configs;
pub mod trades;
pub mod universal_settings;
