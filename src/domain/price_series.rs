//! Bounded, insertion-ordered candle history.

use super::candle::Candle;

/// Number of most-recent candles retained by default.
pub const DEFAULT_RETENTION: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    candles: Vec<Candle>,
    retention: usize,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    /// A retention of zero is treated as one; the series is never empty after a push.
    pub fn with_retention(retention: usize) -> Self {
        let retention = retention.max(1);
        PriceSeries {
            candles: Vec::with_capacity(retention + 1),
            retention,
        }
    }

    pub fn from_candles(candles: Vec<Candle>) -> Self {
        let mut series = Self::new();
        for candle in candles {
            series.push(candle);
        }
        series
    }

    /// Appends a candle, evicting the oldest entries beyond the retention window.
    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
        if self.candles.len() > self.retention {
            let excess = self.candles.len() - self.retention;
            self.candles.drain(..excess);
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

}

impl Default for PriceSeries {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn make_candle(i: i64, close: f64) -> Candle {
        Candle {
            timestamp: base_time() + Duration::minutes(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
        }
    }

    fn closes(series: &PriceSeries) -> Vec<f64> {
        series.candles().iter().map(|c| c.close).collect()
    }

    #[test]
    fn new_series_is_empty() {
        let series = PriceSeries::new();
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }

    #[test]
    fn push_preserves_insertion_order() {
        let mut series = PriceSeries::new();
        series.push(make_candle(0, 10.0));
        series.push(make_candle(1, 11.0));
        series.push(make_candle(2, 12.0));
        assert_eq!(closes(&series), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.last().unwrap().close, 12.0);
    }

    #[test]
    fn evicts_oldest_beyond_retention() {
        let mut series = PriceSeries::with_retention(3);
        for i in 0..5 {
            series.push(make_candle(i, i as f64));
        }
        assert_eq!(series.len(), 3);
        assert_eq!(closes(&series), vec![2.0, 3.0, 4.0]);
        assert_eq!(series.candles()[0].timestamp, base_time() + Duration::minutes(2));
    }

    #[test]
    fn default_retention_caps_at_two_hundred() {
        let mut series = PriceSeries::new();
        for i in 0..250 {
            series.push(make_candle(i, 100.0 + i as f64));
        }
        assert_eq!(series.len(), DEFAULT_RETENTION);
        assert_eq!(series.candles()[0].close, 150.0);
        assert_eq!(series.last().unwrap().close, 349.0);
    }

    #[test]
    fn zero_retention_keeps_one() {
        let mut series = PriceSeries::with_retention(0);
        series.push(make_candle(0, 1.0));
        series.push(make_candle(1, 2.0));
        assert_eq!(closes(&series), vec![2.0]);
    }

    #[test]
    fn from_candles_applies_retention() {
        let candles: Vec<Candle> = (0..210).map(|i| make_candle(i, i as f64)).collect();
        let series = PriceSeries::from_candles(candles);
        assert_eq!(series.len(), 200);
        assert_eq!(series.candles()[0].close, 10.0);
    }
}
