//! Rolling mean of candle volume, current candle included.
//!
//! Warmup: first (n-1) candles are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

/// Window used by the volume breakout strategy.
pub const DEFAULT_VOLUME_PERIOD: usize = 20;

pub fn calculate_volume_sma(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::VolumeSma(period),
            values,
        };
    }

    for (i, candle) in candles.iter().enumerate() {
        let valid = i + 1 >= period;
        let value = if valid {
            let window = &candles[i + 1 - period..=i];
            window.iter().map(|c| c.volume as f64).sum::<f64>() / period as f64
        } else {
            0.0
        };
        values.push(IndicatorPoint {
            timestamp: candle.timestamp,
            valid,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeSma(period),
        values,
    }
}
