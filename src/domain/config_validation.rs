//! Configuration validation.
//!
//! Rejects bad values before a run starts; the engine never sees them. A key
//! that is present must parse as its type; only absent keys take defaults.

use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::SimtraderError;
use crate::domain::generator::DEFAULT_HISTORY_LEN;
use crate::domain::market::Market;
use crate::domain::price_series::DEFAULT_RETENTION;
use crate::domain::strategy::{StrategyKind, StrategyParams};
use crate::ports::config_port::{parse_bool, ConfigPort};

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    validate_market_config(config)?;
    validate_strategy_config(config)?;
    validate_execution_config(config)?;
    validate_simulation_config(config)?;
    Ok(())
}

/// Parse a present value, or `None` when the key is absent or blank.
fn parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<Option<T>, SimtraderError> {
    config
        .get_optional(section, key)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                SimtraderError::invalid(
                    section,
                    key,
                    format!("{} must be {}, got '{}'", key, expected, raw),
                )
            })
        })
        .transpose()
}

fn parsed_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<bool>, SimtraderError> {
    config
        .get_optional(section, key)
        .map(|raw| {
            parse_bool(&raw).ok_or_else(|| {
                SimtraderError::invalid(
                    section,
                    key,
                    format!("{} must be true or false, got '{}'", key, raw),
                )
            })
        })
        .transpose()
}

/// Tick delay as a `Duration`; rejects values that are not positive or too large.
pub fn tick_delay(seconds: f64) -> Result<Duration, SimtraderError> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(delay) if seconds > 0.0 => Ok(delay),
        _ => Err(SimtraderError::invalid(
            "execution",
            "tick_delay",
            "tick_delay must be a positive number of seconds",
        )),
    }
}

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    if let Some(name) = config.get_optional("market", "name") {
        name.parse::<Market>()?;
    }
    let history = parsed::<i64>(config, "market", "history", "an integer")?
        .unwrap_or(DEFAULT_HISTORY_LEN as i64);
    if history < 1 || history > DEFAULT_RETENTION as i64 {
        return Err(SimtraderError::invalid(
            "market",
            "history",
            format!("history must be between 1 and {}", DEFAULT_RETENTION),
        ));
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let kind = match config.get_optional("strategy", "kind") {
        Some(name) => name.parse::<StrategyKind>()?,
        None => StrategyKind::default(),
    };
    let defaults = StrategyParams::default();
    match kind {
        StrategyKind::RsiReversal => validate_rsi_thresholds(config, &defaults),
        StrategyKind::SmaCrossover => validate_windows(
            config,
            ("sma_short", defaults.sma_short),
            ("sma_long", defaults.sma_long),
        ),
        StrategyKind::EmaCrossover => validate_windows(
            config,
            ("ema_short", defaults.ema_short),
            ("ema_long", defaults.ema_long),
        ),
        StrategyKind::VolumeBreakout => validate_volume_multiplier(config, &defaults),
    }
}

fn validate_rsi_thresholds(
    config: &dyn ConfigPort,
    defaults: &StrategyParams,
) -> Result<(), SimtraderError> {
    let buy = parsed::<f64>(config, "strategy", "rsi_buy", "a number")?
        .unwrap_or(defaults.rsi_buy);
    let sell = parsed::<f64>(config, "strategy", "rsi_sell", "a number")?
        .unwrap_or(defaults.rsi_sell);
    for (key, value) in [("rsi_buy", buy), ("rsi_sell", sell)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(SimtraderError::invalid(
                "strategy",
                key,
                format!("{} must be between 0 and 100", key),
            ));
        }
    }
    if buy >= sell {
        return Err(SimtraderError::invalid(
            "strategy",
            "rsi_buy",
            "rsi_buy must be below rsi_sell",
        ));
    }
    Ok(())
}

fn validate_windows(
    config: &dyn ConfigPort,
    (short_key, short_default): (&str, usize),
    (long_key, long_default): (&str, usize),
) -> Result<(), SimtraderError> {
    let short = parsed::<i64>(config, "strategy", short_key, "an integer")?
        .unwrap_or(short_default as i64);
    let long = parsed::<i64>(config, "strategy", long_key, "an integer")?
        .unwrap_or(long_default as i64);
    for (key, value) in [(short_key, short), (long_key, long)] {
        if value < 1 {
            return Err(SimtraderError::invalid(
                "strategy",
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }
    if long > DEFAULT_RETENTION as i64 {
        return Err(SimtraderError::invalid(
            "strategy",
            long_key,
            format!("{} must be at most {}", long_key, DEFAULT_RETENTION),
        ));
    }
    if short >= long {
        return Err(SimtraderError::invalid(
            "strategy",
            short_key,
            format!("{} must be shorter than {}", short_key, long_key),
        ));
    }
    Ok(())
}

fn validate_volume_multiplier(
    config: &dyn ConfigPort,
    defaults: &StrategyParams,
) -> Result<(), SimtraderError> {
    let value = parsed::<f64>(config, "strategy", "volume_multiplier", "a number")?
        .unwrap_or(defaults.volume_multiplier);
    if !value.is_finite() || value <= 0.0 {
        return Err(SimtraderError::invalid(
            "strategy",
            "volume_multiplier",
            "volume_multiplier must be positive",
        ));
    }
    Ok(())
}

pub fn validate_execution_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let quantity = parsed::<i64>(config, "execution", "quantity", "an integer")?.unwrap_or(1);
    if quantity < 1 {
        return Err(SimtraderError::invalid(
            "execution",
            "quantity",
            "quantity must be a positive integer",
        ));
    }
    parsed_bool(config, "execution", "allow_shorts")?;
    let delay = parsed::<f64>(config, "execution", "tick_delay", "a number")?.unwrap_or(1.0);
    tick_delay(delay)?;
    Ok(())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    parsed::<u64>(config, "simulation", "seed", "a non-negative integer")?;
    if let Some(ticks) = parsed::<u64>(config, "simulation", "ticks", "a positive integer")? {
        if ticks < 1 {
            return Err(SimtraderError::invalid(
                "simulation",
                "ticks",
                "ticks must be a positive integer",
            ));
        }
    }
    Ok(())
}
