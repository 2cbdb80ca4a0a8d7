#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
pub use simtrader::domain::candle::Candle;
use simtrader::domain::session::SimulationConfig;

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

/// A flat candle at `close`, `minute` minutes after the start time.
pub fn make_candle(minute: i64, close: f64, volume: u64) -> Candle {
    Candle {
        timestamp: start_time() + Duration::minutes(minute),
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

/// Candles whose closes follow `closes`, each opening at the prior close.
pub fn make_series(closes: &[f64], volume: u64) -> Vec<Candle> {
    let mut prev = closes.first().copied().unwrap_or_default();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let candle = Candle {
                timestamp: start_time() + Duration::minutes(i as i64),
                open: prev,
                high: prev.max(close),
                low: prev.min(close),
                close,
                volume,
            };
            prev = close;
            candle
        })
        .collect()
}

/// Default configuration with a fixed seed, a tick limit and no delay to speak of.
pub fn seeded_config(seed: u64, ticks: u64) -> SimulationConfig {
    SimulationConfig {
        seed: Some(seed),
        max_ticks: Some(ticks),
        tick_delay: std::time::Duration::from_millis(1),
        ..SimulationConfig::default()
    }
}
