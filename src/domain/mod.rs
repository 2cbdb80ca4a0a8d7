//! Core domain types and logic.

pub mod candle;
pub mod price_series;
pub mod market;
pub mod generator;
pub mod indicator;
pub mod signal;
pub mod strategy;
pub mod ledger;
pub mod session;
pub mod scheduler;
pub mod config_validation;
pub mod error;
