//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100. If both averages are 0 the price has not moved
//! and the reading is undefined (invalid).
//!
//! Warmup: first n candles are invalid (need n price changes).

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

/// Lookback used by the RSI reversal strategy.
pub const DEFAULT_RSI_PERIOD: usize = 14;

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        None
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}

pub fn calculate_rsi(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut averages: Option<(f64, f64)> = None;

    for (i, candle) in candles.iter().enumerate() {
        let reading = if i == 0 || period == 0 {
            None
        } else {
            let change = candle.close - candles[i - 1].close;
            let (gain, loss) = (change.max(0.0), (-change).max(0.0));
            averages = match averages {
                Some((g, l)) => Some((
                    (g * (period - 1) as f64 + gain) / period as f64,
                    (l * (period - 1) as f64 + loss) / period as f64,
                )),
                None => {
                    gain_sum += gain;
                    loss_sum += loss;
                    (i == period)
                        .then(|| (gain_sum / period as f64, loss_sum / period as f64))
                }
            };
            averages.and_then(|(g, l)| rsi_value(g, l))
        };
        values.push(IndicatorPoint {
            timestamp: candle.timestamp,
            valid: reading.is_some(),
            value: reading.unwrap_or_default(),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
