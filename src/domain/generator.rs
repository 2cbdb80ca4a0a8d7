//! Synthetic candle generation with trend-regime switching.
//!
//! Each tick the regime either counts down or, once exhausted, redraws its
//! drift from `[-MAX_DRIFT, MAX_DRIFT]` and its duration from `[10, 30)`.
//! The candle then moves by `drift + Normal(0, volatility)`:
//!
//! - open = previous close, close = previous close * (1 + movement)
//! - wicks extend the body by `|Normal(0, volatility * previous close)|`
//! - volume = 500 + floor(|movement| * 1e6) + U[-100, 100), floored at 10

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::debug;

use super::candle::Candle;
use super::market::Market;

pub const MAX_DRIFT: f64 = 0.0005;
pub const MIN_REGIME_TICKS: u32 = 10;
pub const MAX_REGIME_TICKS: u32 = 30;
pub const BASE_VOLUME: i64 = 500;
pub const MIN_VOLUME: u64 = 10;

/// Number of history candles seeded before the first live tick.
pub const DEFAULT_HISTORY_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegimeDirection {
    Bullish,
    Bearish,
}

impl fmt::Display for RegimeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimeDirection::Bullish => write!(f, "Bullish"),
            RegimeDirection::Bearish => write!(f, "Bearish"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendRegime {
    pub drift: f64,
    pub remaining_ticks: u32,
}

impl TrendRegime {
    /// Zero drift with an exhausted duration: the first tick redraws.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn advance<R: Rng + ?Sized>(self, rng: &mut R) -> TrendRegime {
        if self.remaining_ticks == 0 {
            let next = TrendRegime {
                drift: rng.gen_range(-MAX_DRIFT..=MAX_DRIFT),
                remaining_ticks: rng.gen_range(MIN_REGIME_TICKS..MAX_REGIME_TICKS),
            };
            debug!(
                drift = next.drift,
                duration = next.remaining_ticks,
                "market regime redrawn"
            );
            next
        } else {
            TrendRegime {
                drift: self.drift,
                remaining_ticks: self.remaining_ticks - 1,
            }
        }
    }

    pub fn direction(&self) -> RegimeDirection {
        if self.drift > 0.0 {
            RegimeDirection::Bullish
        } else {
            RegimeDirection::Bearish
        }
    }
}

fn gaussian<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    z * std_dev
}

#[derive(Debug)]
pub struct CandleGenerator<R> {
    rng: R,
    tick: Duration,
}

impl<R: Rng> CandleGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self::with_tick(rng, Duration::minutes(1))
    }

    pub fn with_tick(rng: R, tick: Duration) -> Self {
        CandleGenerator { rng, tick }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Produce the candle following `prev` and the regime it was drawn under.
    pub fn next(
        &mut self,
        prev: &Candle,
        volatility: f64,
        regime: TrendRegime,
    ) -> (Candle, TrendRegime) {
        let regime = regime.advance(&mut self.rng);

        let movement_pct = regime.drift + gaussian(&mut self.rng, volatility);
        let open = prev.close;
        let close = (prev.close * (1.0 + movement_pct)).max(f64::MIN_POSITIVE);

        let wiggle = volatility * prev.close;
        let high = open.max(close) + gaussian(&mut self.rng, wiggle).abs();
        let low =
            (open.min(close) - gaussian(&mut self.rng, wiggle).abs()).max(f64::MIN_POSITIVE);

        let surge = (movement_pct.abs() * 1_000_000.0).floor() as i64;
        let jitter: i64 = self.rng.gen_range(-100..100);
        let volume = (BASE_VOLUME + surge + jitter).max(MIN_VOLUME as i64) as u64;

        let candle = Candle {
            timestamp: prev.timestamp + self.tick,
            open,
            high,
            low,
            close,
            volume,
        };
        (candle, regime)
    }

    /// Bootstrap `count` random-walk candles one tick apart, the first at `start`.
    pub fn seed_history(
        &mut self,
        market: Market,
        count: usize,
        start: NaiveDateTime,
    ) -> Vec<Candle> {
        let volatility = market.volatility();
        let mut price = market.starting_price();
        let mut timestamp = start;
        let mut candles = Vec::with_capacity(count);

        for _ in 0..count {
            price = (price * (1.0 + gaussian(&mut self.rng, volatility))).max(f64::MIN_POSITIVE);

            let open = price;
            let close = (price * (1.0 + gaussian(&mut self.rng, volatility / 2.0)))
                .max(f64::MIN_POSITIVE);
            let high = open.max(close) * (1.0 + gaussian(&mut self.rng, volatility / 2.0).abs());
            let shrink = (1.0 - gaussian(&mut self.rng, volatility / 2.0).abs()).max(0.0);
            let low = (open.min(close) * shrink).max(f64::MIN_POSITIVE);
            let volume = self.rng.gen_range(100..1000);

            candles.push(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
            timestamp += self.tick;
        }

        candles
    }
}
