//! simtrader: synthetic market feed with signal-driven paper trading.
//!
//! Hexagonal architecture: engine logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
