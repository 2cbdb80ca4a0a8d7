//! Tick loop with cooperative cancellation.
//!
//! The loop checks the run flag once at the top of every iteration; a tick
//! that has started always completes and is reported before the flag is
//! looked at again. The only suspension point is the inter-tick sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::info;

use super::session::{LedgerMetrics, Session};
use crate::ports::tick_sink::TickSink;

/// Shared on/off switch for a run. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        RunFlag(Arc::new(AtomicBool::new(true)))
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub trades: usize,
    pub cancelled: bool,
    pub metrics: LedgerMetrics,
}

/// Run ticks until the flag is cleared or the configured tick limit is hit.
pub fn run(session: &mut Session, flag: &RunFlag, sink: &mut dyn TickSink) -> RunSummary {
    let delay = session.config().tick_delay;
    let max_ticks = session.config().max_ticks;
    let mut ticks = 0u64;
    let mut trades = 0usize;

    info!(?max_ticks, delay_secs = delay.as_secs_f64(), "run started");

    let cancelled = loop {
        if !flag.is_running() {
            info!(ticks, "run cancelled");
            break true;
        }

        let report = session.tick();
        ticks += 1;
        if report.trade.is_some() {
            trades += 1;
        }
        sink.on_tick(session.series(), &report);

        if max_ticks.is_some_and(|limit| ticks >= limit) {
            break false;
        }
        thread::sleep(delay);
    };

    let summary = RunSummary {
        ticks,
        trades,
        cancelled,
        metrics: session.metrics(),
    };
    info!(
        ticks,
        trades,
        realized_pnl = summary.metrics.realized_pnl,
        total_pnl = summary.metrics.total_pnl,
        "run finished"
    );
    sink.on_finish(&summary);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_series::PriceSeries;
    use crate::domain::session::{SimulationConfig, TickReport};
    use chrono::NaiveDate;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        ticks: Vec<u64>,
        series_lens: Vec<usize>,
        finished: Option<RunSummary>,
        stop_after: Option<(u64, RunFlag)>,
    }

    impl TickSink for RecordingSink {
        fn on_tick(&mut self, series: &PriceSeries, report: &TickReport) {
            self.ticks.push(report.tick);
            self.series_lens.push(series.len());
            if let Some((at, flag)) = &self.stop_after {
                if report.tick >= *at {
                    flag.stop();
                }
            }
        }

        fn on_finish(&mut self, summary: &RunSummary) {
            self.finished = Some(summary.clone());
        }
    }

    fn session(max_ticks: Option<u64>) -> Session {
        let config = SimulationConfig {
            seed: Some(17),
            max_ticks,
            tick_delay: Duration::from_millis(1),
            ..SimulationConfig::default()
        };
        let start = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        Session::new(config, start)
    }

    #[test]
    fn run_flag_starts_running_and_stops_for_all_clones() {
        let flag = RunFlag::new();
        let clone = flag.clone();
        assert!(flag.is_running());
        clone.stop();
        assert!(!flag.is_running());
    }

    #[test]
    fn stops_at_tick_limit() {
        let mut session = session(Some(5));
        let mut sink = RecordingSink::default();
        let summary = run(&mut session, &RunFlag::new(), &mut sink);

        assert_eq!(summary.ticks, 5);
        assert!(!summary.cancelled);
        assert_eq!(sink.ticks, vec![1, 2, 3, 4, 5]);
        assert_eq!(sink.series_lens, vec![101, 102, 103, 104, 105]);
        assert_eq!(sink.finished, Some(summary));
    }

    #[test]
    fn stopped_flag_runs_no_ticks() {
        let mut session = session(Some(5));
        let flag = RunFlag::new();
        flag.stop();
        let mut sink = RecordingSink::default();
        let summary = run(&mut session, &flag, &mut sink);

        assert_eq!(summary.ticks, 0);
        assert!(summary.cancelled);
        assert!(sink.ticks.is_empty());
        assert_eq!(session.ticks(), 0);
    }

    #[test]
    fn cancellation_takes_effect_after_in_flight_tick() {
        let mut session = session(None);
        let flag = RunFlag::new();
        let mut sink = RecordingSink {
            stop_after: Some((3, flag.clone())),
            ..RecordingSink::default()
        };
        let summary = run(&mut session, &flag, &mut sink);

        assert_eq!(summary.ticks, 3);
        assert!(summary.cancelled);
        assert_eq!(sink.ticks, vec![1, 2, 3]);
    }
}
