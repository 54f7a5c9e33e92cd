//! ATR (Average True Range) indicator

use ta::indicators::AverageTrueRange;
use ta::{DataItem, Next};

/// ATR indicator wrapper
#[derive(Debug)]
pub struct Atr {
    inner: AverageTrueRange,
    period: usize,
    update_count: usize,
    last_value: Option<f64>,
}

impl Atr {
    /// Create new ATR indicator
    pub fn new(period: usize) -> Self {
        Self {
            inner: AverageTrueRange::new(period).unwrap(),
            period,
            update_count: 0,
            last_value: None,
        }
    }

    /// Get ATR period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed one bar. Bars with an inverted high/low range are skipped.
    pub fn update(&mut self, high: f64, low: f64, close: f64) {
        let item = DataItem::builder()
            .open(close)
            .high(high)
            .low(low)
            .close(close)
            .volume(0.0)
            .build();
        let item = match item {
            Ok(item) => item,
            Err(_) => return,
        };
        let atr_value = self.inner.next(&item);
        self.update_count += 1;
        if self.update_count >= self.period {
            self.last_value = Some(atr_value);
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.last_value
    }

    pub fn is_ready(&self) -> bool {
        self.update_count >= self.period
    }
}

/// Calculate the final ATR of a bar series given as (high, low, close).
pub fn calculate_atr(bars: &[(f64, f64, f64)], period: usize) -> Option<f64> {
    let mut atr = Atr::new(period);
    for &(high, low, close) in bars {
        atr.update(high, low, close);
    }
    atr.value()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_bars(count: usize, range: f64) -> Vec<(f64, f64, f64)> {
        (0..count)
            .map(|_| (100.0 + range / 2.0, 100.0 - range / 2.0, 100.0))
            .collect()
    }

    #[test]
    fn not_ready_before_period() {
        let mut atr = Atr::new(14);
        for _ in 0..13 {
            atr.update(101.0, 99.0, 100.0);
        }
        assert!(!atr.is_ready());
        assert!(atr.value().is_none());
    }

    #[test]
    fn ready_after_period() {
        let mut atr = Atr::new(14);
        for _ in 0..14 {
            atr.update(101.0, 99.0, 100.0);
        }
        assert!(atr.is_ready());
        let value = atr.value().unwrap();
        assert!(value > 0.0);
    }

    #[test]
    fn converges_to_bar_range_on_flat_series() {
        // Constant close with a constant 2.0 range: true range is 2.0 on
        // every bar, so ATR must settle at 2.0.
        let atr = calculate_atr(&flat_bars(100, 2.0), 14).unwrap();
        assert!((atr - 2.0).abs() < 1e-6);
    }

    #[test]
    fn monotonic_in_volatility() {
        // Widening the high-low range while holding close constant must not
        // decrease the ATR.
        let narrow = calculate_atr(&flat_bars(60, 1.0), 14).unwrap();
        let wide = calculate_atr(&flat_bars(60, 3.0), 14).unwrap();
        assert!(wide >= narrow);
        assert!(wide > narrow * 2.0);
    }

    #[test]
    fn skips_inverted_bars() {
        let mut atr = Atr::new(2);
        atr.update(99.0, 101.0, 100.0); // high < low, ignored
        assert!(!atr.is_ready());
        atr.update(101.0, 99.0, 100.0);
        atr.update(101.0, 99.0, 100.0);
        assert!(atr.is_ready());
    }
}
