//! Compliance Checks
//!
//! Symbol eligibility, holiday calendar and session-window rules, evaluated
//! in the configured exchange timezone. Compliance failures are deliberate
//! rejections and are reported distinctly from risk failures; callers never
//! auto-retry them.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::entity::universal_settings;
use crate::error::{ComplianceViolation, TradeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionWindow {
    PreMarket,
    Regular,
    PostMarket,
    Closed,
}

impl SessionWindow {
    pub fn label(&self) -> &'static str {
        match self {
            SessionWindow::PreMarket => "PRE_MARKET",
            SessionWindow::Regular => "REGULAR",
            SessionWindow::PostMarket => "POST_MARKET",
            SessionWindow::Closed => "CLOSED",
        }
    }
}

/// Classify `now` against the configured session windows. Configuration
/// problems (bad timezone, unparseable times) surface as technical errors,
/// not rejections.
pub fn classify_session(
    settings: &universal_settings::Model,
    now: DateTime<Utc>,
) -> Result<SessionWindow, TradeError> {
    let tz: Tz = settings
        .timezone
        .parse()
        .map_err(|_| TradeError::technical(format!("invalid timezone {:?}", settings.timezone)))?;
    let local = now.with_timezone(&tz);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return Ok(SessionWindow::Closed);
    }

    let time = local.time();
    let open = parse_clock(&settings.market_open)?;
    let close = parse_clock(&settings.market_close)?;
    let pre_open = settings
        .pre_market_open
        .as_deref()
        .map(parse_clock)
        .transpose()?;
    let post_close = settings
        .post_market_close
        .as_deref()
        .map(parse_clock)
        .transpose()?;

    if time >= open && time < close {
        return Ok(SessionWindow::Regular);
    }
    if let Some(pre) = pre_open {
        if time >= pre && time < open {
            return Ok(SessionWindow::PreMarket);
        }
    }
    if let Some(post) = post_close {
        if time >= close && time < post {
            return Ok(SessionWindow::PostMarket);
        }
    }
    Ok(SessionWindow::Closed)
}

/// Session label for bookkeeping fields, or None when the session
/// configuration cannot be evaluated.
pub fn session_label(settings: &universal_settings::Model, now: DateTime<Utc>) -> Option<String> {
    classify_session(settings, now)
        .ok()
        .map(|window| window.label().to_string())
}

/// Full compliance pipeline: symbol universe, holiday calendar, session
/// window. First failure wins.
pub fn check_compliance(
    settings: &universal_settings::Model,
    symbol: &str,
    now: DateTime<Utc>,
) -> Result<(), TradeError> {
    if !symbol_allowed(&settings.allowed_symbols, symbol) {
        return Err(ComplianceViolation::SymbolNotAllowed(symbol.to_string()).into());
    }

    let tz: Tz = settings
        .timezone
        .parse()
        .map_err(|_| TradeError::technical(format!("invalid timezone {:?}", settings.timezone)))?;
    let local_date = now.with_timezone(&tz).format("%Y-%m-%d").to_string();
    if in_csv(&settings.holiday_dates, &local_date) {
        return Err(ComplianceViolation::MarketHoliday(local_date.clone()).into());
    }

    match classify_session(settings, now)? {
        SessionWindow::Closed => {
            Err(ComplianceViolation::OutsideSession(local_date).into())
        }
        _ => Ok(()),
    }
}

/// Empty universe means every symbol is eligible.
fn symbol_allowed(allowed_csv: &str, symbol: &str) -> bool {
    if allowed_csv.trim().is_empty() {
        return true;
    }
    in_csv(allowed_csv, symbol)
}

fn in_csv(csv: &str, needle: &str) -> bool {
    csv.split(',')
        .any(|entry| entry.trim().eq_ignore_ascii_case(needle))
}

fn parse_clock(value: &str) -> Result<NaiveTime, TradeError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| TradeError::technical(format!("invalid session time {:?}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn settings() -> universal_settings::Model {
        universal_settings::Model {
            id: 1,
            capital: Decimal::from(1_000_000),
            timezone: "America/New_York".to_string(),
            market_open: "09:30".to_string(),
            market_close: "16:00".to_string(),
            pre_market_open: Some("04:00".to_string()),
            post_market_close: Some("20:00".to_string()),
            allowed_symbols: "MES,MNQ,ES".to_string(),
            holiday_dates: "2026-07-03,2026-12-25".to_string(),
            drawdown_reference_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            created_at: None,
            updated_at: None,
        }
    }

    // 2026-07-15 is a Wednesday; New York is UTC-4 in July.
    fn wednesday(hour_utc: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 15, hour_utc, 0, 0).unwrap()
    }

    #[test]
    fn regular_session() {
        let window = classify_session(&settings(), wednesday(15)).unwrap();
        assert_eq!(window, SessionWindow::Regular); // 11:00 local
    }

    #[test]
    fn pre_and_post_market() {
        let s = settings();
        assert_eq!(
            classify_session(&s, wednesday(12)).unwrap(),
            SessionWindow::PreMarket // 08:00 local
        );
        assert_eq!(
            classify_session(&s, wednesday(22)).unwrap(),
            SessionWindow::PostMarket // 18:00 local
        );
    }

    #[test]
    fn overnight_is_closed() {
        let late = Utc.with_ymd_and_hms(2026, 7, 16, 3, 0, 0).unwrap(); // 23:00 local Wed
        assert_eq!(
            classify_session(&settings(), late).unwrap(),
            SessionWindow::Closed
        );
    }

    #[test]
    fn weekend_is_closed() {
        let saturday = Utc.with_ymd_and_hms(2026, 7, 18, 15, 0, 0).unwrap();
        assert_eq!(
            classify_session(&settings(), saturday).unwrap(),
            SessionWindow::Closed
        );
        assert!(matches!(
            check_compliance(&settings(), "MES", saturday),
            Err(TradeError::Compliance(ComplianceViolation::OutsideSession(_)))
        ));
    }

    #[test]
    fn no_extended_windows_without_configuration() {
        let mut s = settings();
        s.pre_market_open = None;
        s.post_market_close = None;
        assert_eq!(
            classify_session(&s, wednesday(12)).unwrap(),
            SessionWindow::Closed
        );
    }

    #[test]
    fn symbol_universe() {
        let s = settings();
        assert!(check_compliance(&s, "MES", wednesday(15)).is_ok());
        assert!(check_compliance(&s, "mes", wednesday(15)).is_ok());
        assert!(matches!(
            check_compliance(&s, "CL", wednesday(15)),
            Err(TradeError::Compliance(ComplianceViolation::SymbolNotAllowed(_)))
        ));

        let mut open_universe = settings();
        open_universe.allowed_symbols = String::new();
        assert!(check_compliance(&open_universe, "CL", wednesday(15)).is_ok());
    }

    #[test]
    fn holiday_rejects() {
        let holiday = Utc.with_ymd_and_hms(2026, 7, 3, 15, 0, 0).unwrap(); // Friday
        assert!(matches!(
            check_compliance(&settings(), "MES", holiday),
            Err(TradeError::Compliance(ComplianceViolation::MarketHoliday(_)))
        ));
    }

    #[test]
    fn bad_timezone_is_technical_not_rejection() {
        let mut s = settings();
        s.timezone = "Mars/Olympus".to_string();
        let err = check_compliance(&s, "MES", wednesday(15)).unwrap_err();
        assert!(!err.is_rejection());
    }

    #[test]
    fn labels() {
        assert_eq!(
            session_label(&settings(), wednesday(15)).as_deref(),
            Some("REGULAR")
        );
    }
}
