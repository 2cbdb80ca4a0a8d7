//! Signal strategies over rolling candle windows.
//!
//! Each strategy variant carries its own parameter subset and is evaluated
//! against the full retained history every tick. An indicator that is still
//! warming up yields no reading; any comparison involving a missing reading
//! resolves to HOLD, as does an exact tie between crossover averages.

use std::fmt;
use std::str::FromStr;

use super::candle::Candle;
use super::error::SimtraderError;
use super::indicator::ema::calculate_ema;
use super::indicator::rsi::{calculate_rsi, DEFAULT_RSI_PERIOD};
use super::indicator::sma::calculate_sma;
use super::indicator::volume::{calculate_volume_sma, DEFAULT_VOLUME_PERIOD};
use super::signal::{Signal, SignalReading};

/// Named numeric options supplied by configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub rsi_buy: f64,
    pub rsi_sell: f64,
    pub sma_short: usize,
    pub sma_long: usize,
    pub ema_short: usize,
    pub ema_long: usize,
    pub volume_multiplier: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            rsi_buy: 30.0,
            rsi_sell: 70.0,
            sma_short: 10,
            sma_long: 20,
            ema_short: 9,
            ema_long: 21,
            volume_multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    #[default]
    RsiReversal,
    SmaCrossover,
    EmaCrossover,
    VolumeBreakout,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::RsiReversal => write!(f, "RSI Reversal"),
            StrategyKind::SmaCrossover => write!(f, "SMA Crossover"),
            StrategyKind::EmaCrossover => write!(f, "EMA Crossover"),
            StrategyKind::VolumeBreakout => write!(f, "Volume Breakout"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = SimtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "rsi_reversal" | "rsi" => Ok(StrategyKind::RsiReversal),
            "sma_crossover" | "sma" => Ok(StrategyKind::SmaCrossover),
            "ema_crossover" | "ema" => Ok(StrategyKind::EmaCrossover),
            "volume_breakout" | "volume" => Ok(StrategyKind::VolumeBreakout),
            _ => Err(SimtraderError::UnknownStrategy {
                name: s.trim().to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    RsiReversal { buy_below: f64, sell_above: f64 },
    SmaCrossover { short: usize, long: usize },
    EmaCrossover { short: usize, long: usize },
    VolumeBreakout { multiplier: f64 },
}

impl Strategy {
    pub fn from_params(kind: StrategyKind, params: &StrategyParams) -> Self {
        match kind {
            StrategyKind::RsiReversal => Strategy::RsiReversal {
                buy_below: params.rsi_buy,
                sell_above: params.rsi_sell,
            },
            StrategyKind::SmaCrossover => Strategy::SmaCrossover {
                short: params.sma_short,
                long: params.sma_long,
            },
            StrategyKind::EmaCrossover => Strategy::EmaCrossover {
                short: params.ema_short,
                long: params.ema_long,
            },
            StrategyKind::VolumeBreakout => Strategy::VolumeBreakout {
                multiplier: params.volume_multiplier,
            },
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::RsiReversal { .. } => StrategyKind::RsiReversal,
            Strategy::SmaCrossover { .. } => StrategyKind::SmaCrossover,
            Strategy::EmaCrossover { .. } => StrategyKind::EmaCrossover,
            Strategy::VolumeBreakout { .. } => StrategyKind::VolumeBreakout,
        }
    }

    /// Candles needed before the strategy can produce anything but HOLD.
    pub fn warmup(&self) -> usize {
        match self {
            Strategy::RsiReversal { .. } => DEFAULT_RSI_PERIOD + 1,
            Strategy::SmaCrossover { short, long } | Strategy::EmaCrossover { short, long } => {
                *short.max(long)
            }
            Strategy::VolumeBreakout { .. } => DEFAULT_VOLUME_PERIOD + 1,
        }
    }

    pub fn evaluate(&self, candles: &[Candle]) -> SignalReading {
        match self {
            Strategy::RsiReversal {
                buy_below,
                sell_above,
            } => {
                let rsi = calculate_rsi(candles, DEFAULT_RSI_PERIOD).latest();
                let signal = match rsi {
                    Some(value) if value < *buy_below => Signal::Buy,
                    Some(value) if value > *sell_above => Signal::Sell,
                    _ => Signal::Hold,
                };
                SignalReading::new(signal, format!("RSI: {}", fmt_reading(rsi)))
            }
            Strategy::SmaCrossover { short, long } => {
                let s = calculate_sma(candles, *short).latest();
                let l = calculate_sma(candles, *long).latest();
                crossover(s, l)
            }
            Strategy::EmaCrossover { short, long } => {
                let s = calculate_ema(candles, *short).latest();
                let l = calculate_ema(candles, *long).latest();
                crossover(s, l)
            }
            Strategy::VolumeBreakout { multiplier } => volume_breakout(candles, *multiplier),
        }
    }
}

fn fmt_reading(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "n/a".to_string(),
    }
}

fn crossover(short: Option<f64>, long: Option<f64>) -> SignalReading {
    let signal = match (short, long) {
        (Some(s), Some(l)) if s > l => Signal::Buy,
        (Some(s), Some(l)) if s < l => Signal::Sell,
        _ => Signal::Hold,
    };
    SignalReading::new(
        signal,
        format!("S:{} L:{}", fmt_reading(short), fmt_reading(long)),
    )
}

fn volume_breakout(candles: &[Candle], multiplier: f64) -> SignalReading {
    let Some(current) = candles.last() else {
        return SignalReading::new(Signal::Hold, "V:n/a Avg:n/a");
    };
    let avg = calculate_volume_sma(candles, DEFAULT_VOLUME_PERIOD).latest();
    let display = match avg {
        Some(a) => format!("V:{} Avg:{}", current.volume, a as u64),
        None => format!("V:{} Avg:n/a", current.volume),
    };

    if candles.len() < DEFAULT_VOLUME_PERIOD + 1 {
        return SignalReading::new(Signal::Hold, display);
    }

    let signal = match avg {
        Some(a) if current.volume as f64 > a * multiplier => {
            let previous = &candles[candles.len() - 2];
            if current.close > previous.close {
                Signal::Buy
            } else {
                Signal::Sell
            }
        }
        _ => Signal::Hold,
    };
    SignalReading::new(signal, display)
}
