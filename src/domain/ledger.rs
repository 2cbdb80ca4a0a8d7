//! Single-instrument position ledger with realized/unrealized PnL.
//!
//! `held_quantity` is signed: positive is long, negative is short. The cost
//! basis follows these rules:
//!
//! - adding to a position (or opening from flat) takes the volume-weighted
//!   average of the existing basis and the new lot
//! - reducing a position keeps the basis and realizes PnL on the covered part
//! - flipping through flat realizes on the covered part and resets the basis
//!   to the trade price for the new side
//!
//! Trades are driven by signal changes: a repeated signal or HOLD never
//! re-executes, and a rejected SELL leaves the last executed signal untouched.

use chrono::NaiveDateTime;
use std::fmt;
use tracing::{debug, info};

use super::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

impl From<TradeSide> for Signal {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => Signal::Buy,
            TradeSide::Sell => Signal::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Long,
    Short,
}

/// Emitted for every executed trade; the ledger does not keep these.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub timestamp: NaiveDateTime,
    pub side: TradeSide,
    pub quantity: i64,
    pub price: f64,
    pub realized_pnl_delta: f64,
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} @ {:.2}",
            self.timestamp.format("%H:%M:%S"),
            self.side,
            self.quantity,
            self.price
        )?;
        if self.realized_pnl_delta != 0.0 {
            write!(f, " | PnL: {:+.2}", self.realized_pnl_delta)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionLedger {
    pub held_quantity: i64,
    pub avg_price: f64,
    pub realized_pnl: f64,
    pub last_executed_signal: Option<Signal>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PositionState {
        match self.held_quantity {
            q if q > 0 => PositionState::Long,
            q if q < 0 => PositionState::Short,
            _ => PositionState::Flat,
        }
    }

    /// Mark-to-market PnL of the open position; sign-correct for shorts.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.avg_price) * self.held_quantity as f64
    }

    pub fn total_pnl(&self, price: f64) -> f64 {
        self.realized_pnl + self.unrealized_pnl(price)
    }

    /// Trade-on-change entry point: executes only when `signal` is BUY or SELL
    /// and differs from the last executed signal.
    pub fn on_signal(
        &mut self,
        signal: Signal,
        timestamp: NaiveDateTime,
        quantity: i64,
        price: f64,
        allow_shorts: bool,
    ) -> Option<TradeRecord> {
        if !signal.is_actionable() || self.last_executed_signal == Some(signal) {
            return None;
        }
        let side = if signal == Signal::Buy {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };
        self.execute(side, timestamp, quantity, price, allow_shorts)
    }

    /// Execute one trade regardless of the last executed signal. Returns `None`
    /// only for a SELL that would go short while shorting is disabled.
    pub fn execute(
        &mut self,
        side: TradeSide,
        timestamp: NaiveDateTime,
        quantity: i64,
        price: f64,
        allow_shorts: bool,
    ) -> Option<TradeRecord> {
        let realized_pnl_delta = match side {
            TradeSide::Buy => self.buy(quantity, price),
            TradeSide::Sell => {
                if self.held_quantity < quantity && !allow_shorts {
                    debug!(
                        held = self.held_quantity,
                        quantity, "sell rejected: shorting disabled"
                    );
                    return None;
                }
                self.sell(quantity, price)
            }
        };

        self.last_executed_signal = Some(side.into());
        let record = TradeRecord {
            timestamp,
            side,
            quantity,
            price,
            realized_pnl_delta,
        };
        info!(
            side = %record.side,
            quantity,
            price,
            pnl = realized_pnl_delta,
            held = self.held_quantity,
            state = ?self.state(),
            "trade executed"
        );
        Some(record)
    }

    fn buy(&mut self, quantity: i64, price: f64) -> f64 {
        let old_qty = self.held_quantity;
        let mut delta = 0.0;

        if old_qty < 0 {
            let covered = quantity.min(-old_qty);
            delta = (self.avg_price - price) * covered as f64;
            self.realized_pnl += delta;
        }

        let new_qty = old_qty + quantity;
        if old_qty >= 0 {
            if new_qty != 0 {
                self.avg_price =
                    (old_qty as f64 * self.avg_price + quantity as f64 * price) / new_qty as f64;
            }
        } else if new_qty > 0 {
            self.avg_price = price;
        }

        self.held_quantity = new_qty;
        delta
    }

    fn sell(&mut self, quantity: i64, price: f64) -> f64 {
        let old_qty = self.held_quantity;
        let mut delta = 0.0;

        if old_qty > 0 {
            let covered = quantity.min(old_qty);
            delta = (price - self.avg_price) * covered as f64;
            self.realized_pnl += delta;
        }

        let new_qty = old_qty - quantity;
        if new_qty < 0 {
            if old_qty <= 0 {
                let old_short = old_qty.unsigned_abs() as f64;
                self.avg_price = (old_short * self.avg_price + quantity as f64 * price)
                    / new_qty.unsigned_abs() as f64;
            } else {
                self.avg_price = price;
            }
        }

        self.held_quantity = new_qty;
        delta
    }
}
