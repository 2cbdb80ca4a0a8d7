//! Exponential Moving Average of closes.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) candles are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn calculate_ema(candles: &[Candle], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Ema(period);
    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut seed_sum = 0.0;
    let mut ema: Option<f64> = None;

    let values = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            ema = match ema {
                Some(prev) => Some(candle.close * k + prev * (1.0 - k)),
                None => {
                    seed_sum += candle.close;
                    (i + 1 == period).then(|| seed_sum / period as f64)
                }
            };
            IndicatorPoint {
                timestamp: candle.timestamp,
                valid: ema.is_some(),
                value: ema.unwrap_or_default(),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
