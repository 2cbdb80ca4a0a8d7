//! Concrete adapter implementations for ports.

pub mod console_sink;
pub mod file_config_adapter;
