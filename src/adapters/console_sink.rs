//! Plain-text presentation of a run.

use std::io::Write;

use tracing::warn;

use crate::domain::price_series::PriceSeries;
use crate::domain::scheduler::RunSummary;
use crate::domain::session::TickReport;
use crate::ports::tick_sink::TickSink;

/// Prints one line per tick, one per executed trade, and a closing summary.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_tick(&mut self, report: &TickReport) -> std::io::Result<()> {
        let candle = &report.candle;
        let arrow = if candle.is_bullish() { '▲' } else { '▼' };
        writeln!(
            self.out,
            "{} {:>10.2} {} {:<4} {:<24} qty {:>4} pnl {:>+10.2} {}",
            candle.timestamp.format("%H:%M:%S"),
            candle.close,
            arrow,
            report.reading.signal,
            report.reading.display,
            report.metrics.held_quantity,
            report.metrics.total_pnl,
            report.metrics.regime,
        )?;
        if let Some(trade) = &report.trade {
            writeln!(self.out, "{}", trade)?;
        }
        Ok(())
    }

    fn write_summary(&mut self, summary: &RunSummary) -> std::io::Result<()> {
        let m = &summary.metrics;
        writeln!(self.out)?;
        writeln!(self.out, "=== Run Summary ===")?;
        if summary.cancelled {
            writeln!(self.out, "Stopped:          cancelled")?;
        }
        writeln!(self.out, "Ticks:            {}", summary.ticks)?;
        writeln!(self.out, "Trades:           {}", summary.trades)?;
        writeln!(self.out, "Last Price:       {:.2}", m.current_price)?;
        writeln!(self.out, "Position:         {}", m.held_quantity)?;
        if m.held_quantity != 0 {
            writeln!(self.out, "Avg Price:        {:.2}", m.avg_price)?;
        }
        writeln!(self.out, "Realized PnL:     {:+.2}", m.realized_pnl)?;
        writeln!(self.out, "Unrealized PnL:   {:+.2}", m.unrealized_pnl)?;
        writeln!(self.out, "Total PnL:        {:+.2}", m.total_pnl)?;
        writeln!(self.out, "Regime:           {}", m.regime)?;
        self.out.flush()
    }
}

impl<W: Write> TickSink for ConsoleSink<W> {
    fn on_tick(&mut self, _series: &PriceSeries, report: &TickReport) {
        if let Err(e) = self.write_tick(report) {
            warn!(error = %e, tick = report.tick, "failed to write tick");
        }
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        if let Err(e) = self.write_summary(summary) {
            warn!(error = %e, "failed to write run summary");
        }
    }
}
