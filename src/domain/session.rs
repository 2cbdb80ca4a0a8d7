//! Simulation session: the single owner of all mutable run state.
//!
//! One `tick` generates a candle, appends it to the bounded series, evaluates
//! the configured strategy and lets the ledger react to the signal. Hosts that
//! run several simulations must create one `Session` per run.

use std::time::Duration as StdDuration;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::candle::Candle;
use super::generator::{CandleGenerator, RegimeDirection, TrendRegime, DEFAULT_HISTORY_LEN};
use super::ledger::{PositionLedger, TradeRecord};
use super::market::Market;
use super::price_series::PriceSeries;
use super::signal::SignalReading;
use super::strategy::{Strategy, StrategyKind, StrategyParams};

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub market: Market,
    pub strategy: Strategy,
    pub quantity: i64,
    pub allow_shorts: bool,
    pub tick_delay: StdDuration,
    pub history_len: usize,
    pub seed: Option<u64>,
    pub max_ticks: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            market: Market::default(),
            strategy: Strategy::from_params(StrategyKind::default(), &StrategyParams::default()),
            quantity: 1,
            allow_shorts: false,
            tick_delay: StdDuration::from_secs(1),
            history_len: DEFAULT_HISTORY_LEN,
            seed: None,
            max_ticks: None,
        }
    }
}

/// Derived position metrics reported to the presentation layer each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerMetrics {
    pub current_price: f64,
    pub held_quantity: i64,
    pub avg_price: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub regime: RegimeDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub candle: Candle,
    pub reading: SignalReading,
    pub trade: Option<TradeRecord>,
    pub metrics: LedgerMetrics,
}

#[derive(Debug)]
pub struct Session {
    config: SimulationConfig,
    series: PriceSeries,
    regime: TrendRegime,
    ledger: PositionLedger,
    generator: CandleGenerator<StdRng>,
    ticks: u64,
}

impl Session {
    /// Seed the history so that its last candle sits one tick before `start`.
    pub fn new(config: SimulationConfig, start: NaiveDateTime) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut generator = CandleGenerator::new(rng);

        let history_len = config.history_len.max(1);
        let history_start = start - generator.tick() * history_len as i32;
        let history = generator.seed_history(config.market, history_len, history_start);

        info!(
            market = %config.market,
            strategy = %config.strategy.kind(),
            history = history_len,
            "session initialised"
        );

        Session {
            config,
            series: PriceSeries::from_candles(history),
            regime: TrendRegime::neutral(),
            ledger: PositionLedger::new(),
            generator,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn regime(&self) -> TrendRegime {
        self.regime
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self) -> TickReport {
        let Some(prev) = self.series.last().cloned() else {
            unreachable!("session history always holds at least one candle");
        };

        let (candle, regime) =
            self.generator
                .next(&prev, self.config.market.volatility(), self.regime);
        self.regime = regime;
        self.series.push(candle.clone());

        let reading = self.config.strategy.evaluate(self.series.candles());
        let trade = self.ledger.on_signal(
            reading.signal,
            candle.timestamp,
            self.config.quantity,
            candle.close,
            self.config.allow_shorts,
        );

        self.ticks += 1;
        TickReport {
            tick: self.ticks,
            candle,
            reading,
            trade,
            metrics: self.metrics(),
        }
    }

    pub fn metrics(&self) -> LedgerMetrics {
        let current_price = self.series.last().map(|c| c.close).unwrap_or_default();
        LedgerMetrics {
            current_price,
            held_quantity: self.ledger.held_quantity,
            avg_price: self.ledger.avg_price,
            realized_pnl: self.ledger.realized_pnl,
            unrealized_pnl: self.ledger.unrealized_pnl(current_price),
            total_pnl: self.ledger.total_pnl(current_price),
            regime: self.regime.direction(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
    }

    fn seeded(seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn new_session_seeds_history_before_start() {
        let session = Session::new(seeded(1), start());
        assert_eq!(session.series().len(), DEFAULT_HISTORY_LEN);
        let first = &session.series().candles()[0];
        let last = session.series().last().unwrap();
        assert_eq!(first.timestamp, start() - Duration::minutes(100));
        assert_eq!(last.timestamp, start() - Duration::minutes(1));
        assert_eq!(session.regime(), TrendRegime::neutral());
        assert_eq!(session.ticks(), 0);
    }

    #[test]
    fn first_tick_lands_on_start() {
        let mut session = Session::new(seeded(2), start());
        let report = session.tick();
        assert_eq!(report.tick, 1);
        assert_eq!(report.candle.timestamp, start());
        assert_eq!(session.series().len(), DEFAULT_HISTORY_LEN + 1);
        assert!(session.regime().remaining_ticks >= 10);
    }

    #[test]
    fn series_is_capped_after_many_ticks() {
        let mut session = Session::new(seeded(3), start());
        for _ in 0..150 {
            session.tick();
        }
        assert_eq!(session.series().len(), 200);
        assert_eq!(session.ticks(), 150);
    }

    #[test]
    fn metrics_track_last_close() {
        let mut session = Session::new(seeded(4), start());
        let report = session.tick();
        assert_eq!(report.metrics.current_price, report.candle.close);
        assert_eq!(report.metrics.held_quantity, session.ledger().held_quantity);
        assert_eq!(report.metrics, session.metrics());
    }

    #[test]
    fn zero_history_is_raised_to_one() {
        let config = SimulationConfig {
            history_len: 0,
            ..seeded(5)
        };
        let mut session = Session::new(config, start());
        assert_eq!(session.series().len(), 1);
        session.tick();
        assert_eq!(session.series().len(), 2);
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = Session::new(seeded(99), start());
        let mut b = Session::new(seeded(99), start());
        for _ in 0..50 {
            assert_eq!(a.tick(), b.tick());
        }
    }
}
