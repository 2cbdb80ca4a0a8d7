//! Presentation port: receives one report per completed tick.

use crate::domain::price_series::PriceSeries;
use crate::domain::scheduler::RunSummary;
use crate::domain::session::TickReport;

pub trait TickSink {
    /// Called after every tick with the updated history snapshot.
    fn on_tick(&mut self, series: &PriceSeries, report: &TickReport);

    /// Called once when the run loop exits, whether by limit or cancellation.
    fn on_finish(&mut self, _summary: &RunSummary) {}
}
