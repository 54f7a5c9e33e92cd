//! Signal-to-trade pipeline checks: a scanner signal mapped to an intent,
//! run through the gate's limit and compliance logic.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::entity::{generated_signals, risk_settings, strategy_configs, universal_settings};
use shared::error::{RiskViolation, TradeError};
use shared::models::{TradeRequest, TradeSide};
use shared::services::compliance;
use shared::services::promotion::map_signal;
use shared::services::risk_gate::{enforce_limits, ExposureSnapshot};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn strategy_config() -> strategy_configs::Model {
    strategy_configs::Model {
        id: 7,
        user_id: 42,
        name: "mes-breakout".to_string(),
        symbol: "MES".to_string(),
        exchange: "CME".to_string(),
        timeframe: "15m".to_string(),
        order_type: "MARKET".to_string(),
        product_type: "INTRADAY".to_string(),
        contract_size: Decimal::from(5),
        default_quantity: Decimal::from(2),
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

fn mes_signal() -> generated_signals::Model {
    generated_signals::Model {
        id: 11,
        config_id: 7,
        symbol: "MES".to_string(),
        direction: "LONG".to_string(),
        price: dec("6496.00"),
        stop_loss: Some(dec("6486.00")),
        take_profit: Some(dec("6526.00")),
        timeframe: "15m".to_string(),
        status: "NEW".to_string(),
        generated_at: Utc::now(),
        created_at: None,
    }
}

fn permissive_settings() -> risk_settings::Model {
    risk_settings::Model {
        id: 1,
        user_id: Some(42),
        strategy_id: Some(7),
        max_active_trades: 5,
        max_trades_per_day: 20,
        max_risk_per_trade_pct: dec("1.0"),
        max_total_risk_pct: dec("3.0"),
        max_drawdown_pct: dec("10.0"),
        created_at: None,
        updated_at: None,
    }
}

fn universal() -> universal_settings::Model {
    universal_settings::Model {
        id: 1,
        capital: Decimal::from(100_000),
        timezone: "America/New_York".to_string(),
        market_open: "09:30".to_string(),
        market_close: "16:00".to_string(),
        pre_market_open: None,
        post_market_close: None,
        allowed_symbols: "MES,MNQ".to_string(),
        holiday_dates: String::new(),
        drawdown_reference_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        created_at: None,
        updated_at: None,
    }
}

/// Request carrying exactly what the promoted intent carries.
fn request_from_promoted_signal() -> TradeRequest {
    let mapped = map_signal(&mes_signal(), &strategy_config(), None).unwrap();
    TradeRequest {
        user_id: mapped.user_id.clone().unwrap(),
        strategy_id: Some(mapped.strategy_id.clone().unwrap()),
        signal_id: None,
        symbol: mapped.symbol.clone().unwrap(),
        exchange: mapped.exchange.clone().unwrap(),
        side: TradeSide::parse(&mapped.side.clone().unwrap()).unwrap(),
        quantity: mapped.quantity.clone().unwrap(),
        entry_price: mapped.entry_price.clone().unwrap(),
        stop_loss: mapped.stop_loss.clone().unwrap(),
        take_profit: mapped.take_profit.clone().unwrap(),
    }
}

#[test]
fn promoted_mes_long_passes_the_gate() {
    let request = request_from_promoted_signal();
    assert_eq!(request.side, TradeSide::Buy);
    assert_eq!(request.entry_price, dec("6496.00"));
    assert_eq!(request.stop_loss, Some(dec("6486.00")));
    assert!(request.validate().is_ok());

    // 2 x 10 points of risk on 100k capital: well inside every limit.
    let verdict = enforce_limits(
        &permissive_settings(),
        universal().capital,
        &ExposureSnapshot::default(),
        &request,
    );
    assert!(verdict.is_ok());

    // Wednesday 2026-07-15 11:00 New York, a regular session.
    let session_time = Utc.with_ymd_and_hms(2026, 7, 15, 15, 0, 0).unwrap();
    assert!(compliance::check_compliance(&universal(), &request.symbol, session_time).is_ok());
}

#[test]
fn oversized_trade_is_rejected_not_persisted() {
    let mut request = request_from_promoted_signal();
    // 150 contracts x 10 points = 1500 = 1.5% of capital, over the 1% cap.
    request.quantity = Decimal::from(150);

    let verdict = enforce_limits(
        &permissive_settings(),
        universal().capital,
        &ExposureSnapshot::default(),
        &request,
    );
    match verdict {
        Err(TradeError::Risk(RiskViolation::PerTradeRisk { .. })) => {}
        other => panic!("expected a per-trade risk rejection, got {:?}", other.err()),
    }
}

#[test]
fn rejection_and_technical_failure_stay_distinct() {
    let request = request_from_promoted_signal();

    let rejection = enforce_limits(
        &permissive_settings(),
        universal().capital,
        &ExposureSnapshot {
            active_trades: 5,
            ..Default::default()
        },
        &request,
    )
    .unwrap_err();
    assert!(rejection.is_rejection());

    let technical = enforce_limits(
        &permissive_settings(),
        Decimal::ZERO,
        &ExposureSnapshot::default(),
        &request,
    )
    .unwrap_err();
    assert!(!technical.is_rejection());
}

#[test]
fn off_universe_symbol_is_a_compliance_rejection() {
    let session_time = Utc.with_ymd_and_hms(2026, 7, 15, 15, 0, 0).unwrap();
    let err = compliance::check_compliance(&universal(), "CL", session_time).unwrap_err();
    assert!(err.is_rejection());
    assert!(matches!(err, TradeError::Compliance(_)));
}
