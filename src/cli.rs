//! CLI definition and dispatch.

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::console_sink::ConsoleSink;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{tick_delay, validate_config};
use crate::domain::error::SimtraderError;
use crate::domain::generator::DEFAULT_HISTORY_LEN;
use crate::domain::market::{Market, INSTRUMENT};
use crate::domain::scheduler::{self, RunFlag};
use crate::domain::session::{Session, SimulationConfig};
use crate::domain::strategy::{Strategy, StrategyKind, StrategyParams};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(
    name = "simtrader",
    about = "Synthetic market feed with signal-driven paper trading"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a live simulation
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Validate a configuration file without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Market to simulate (equity, commodity)
    #[arg(long)]
    pub market: Option<String>,
    /// Signal strategy (rsi_reversal, sma_crossover, ema_crossover, volume_breakout)
    #[arg(long)]
    pub strategy: Option<String>,
    /// Units per trade
    #[arg(long)]
    pub quantity: Option<i64>,
    /// Let SELL signals open or extend short positions
    #[arg(long)]
    pub allow_shorts: bool,
    /// Seconds between ticks
    #[arg(long)]
    pub delay: Option<f64>,
    /// Stop after this many ticks
    #[arg(long)]
    pub ticks: Option<u64>,
    /// RNG seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config, overrides } => run_simulation(config.as_ref(), &overrides),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SimtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn apply_overrides(adapter: &mut FileConfigAdapter, overrides: &Overrides) {
    if let Some(market) = &overrides.market {
        adapter.set("market", "name", market);
    }
    if let Some(strategy) = &overrides.strategy {
        adapter.set("strategy", "kind", strategy);
    }
    if let Some(quantity) = overrides.quantity {
        adapter.set("execution", "quantity", quantity);
    }
    if overrides.allow_shorts {
        adapter.set("execution", "allow_shorts", true);
    }
    if let Some(delay) = overrides.delay {
        adapter.set("execution", "tick_delay", delay);
    }
    if let Some(ticks) = overrides.ticks {
        adapter.set("simulation", "ticks", ticks);
    }
    if let Some(seed) = overrides.seed {
        adapter.set("simulation", "seed", seed);
    }
}

fn window(config: &dyn ConfigPort, key: &str, default: usize) -> usize {
    usize::try_from(config.get_int("strategy", key, default as i64)).unwrap_or(default)
}

pub fn build_strategy(config: &dyn ConfigPort) -> Result<Strategy, SimtraderError> {
    let kind = match config.get_optional("strategy", "kind") {
        Some(name) => name.parse::<StrategyKind>()?,
        None => StrategyKind::default(),
    };
    let defaults = StrategyParams::default();
    let params = StrategyParams {
        rsi_buy: config.get_double("strategy", "rsi_buy", defaults.rsi_buy),
        rsi_sell: config.get_double("strategy", "rsi_sell", defaults.rsi_sell),
        sma_short: window(config, "sma_short", defaults.sma_short),
        sma_long: window(config, "sma_long", defaults.sma_long),
        ema_short: window(config, "ema_short", defaults.ema_short),
        ema_long: window(config, "ema_long", defaults.ema_long),
        volume_multiplier: config.get_double(
            "strategy",
            "volume_multiplier",
            defaults.volume_multiplier,
        ),
    };
    Ok(Strategy::from_params(kind, &params))
}

/// Validate every section, then resolve the values into a run configuration.
pub fn build_simulation_config(
    config: &dyn ConfigPort,
) -> Result<SimulationConfig, SimtraderError> {
    validate_config(config)?;

    let market = match config.get_optional("market", "name") {
        Some(name) => name.parse::<Market>()?,
        None => Market::default(),
    };
    let history_len = usize::try_from(config.get_int(
        "market",
        "history",
        DEFAULT_HISTORY_LEN as i64,
    ))
    .unwrap_or(DEFAULT_HISTORY_LEN);

    Ok(SimulationConfig {
        market,
        strategy: build_strategy(config)?,
        quantity: config.get_int("execution", "quantity", 1),
        allow_shorts: config.get_bool("execution", "allow_shorts", false),
        tick_delay: tick_delay(config.get_double("execution", "tick_delay", 1.0))?,
        history_len,
        seed: config
            .get_optional("simulation", "seed")
            .and_then(|s| s.parse().ok()),
        max_ticks: config
            .get_optional("simulation", "ticks")
            .and_then(|s| s.parse().ok()),
    })
}

fn run_simulation(config_path: Option<&PathBuf>, overrides: &Overrides) -> ExitCode {
    let mut adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            }
        }
        None => FileConfigAdapter::empty(),
    };
    apply_overrides(&mut adapter, overrides);

    let sim_config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Simulating {} on {} with {} (quantity {}, shorts {})",
        INSTRUMENT,
        sim_config.market,
        sim_config.strategy.kind(),
        sim_config.quantity,
        if sim_config.allow_shorts { "on" } else { "off" },
    );

    let mut session = Session::new(sim_config, Local::now().naive_local());
    let flag = RunFlag::new();
    let stdout = io::stdout();
    let mut sink = ConsoleSink::new(stdout.lock());
    scheduler::run(&mut session, &flag, &mut sink);

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let sim_config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nMarket:    {} {}", INSTRUMENT, sim_config.market);
    eprintln!("Strategy:  {}", sim_config.strategy.kind());
    eprintln!(
        "Warm-up:   {} candles (history {})",
        sim_config.strategy.warmup(),
        sim_config.history_len
    );
    eprintln!("Quantity:  {}", sim_config.quantity);
    eprintln!("Shorts:    {}", sim_config.allow_shorts);
    eprintln!("Delay:     {:.2}s", sim_config.tick_delay.as_secs_f64());
    match sim_config.max_ticks {
        Some(n) => eprintln!("Ticks:     {}", n),
        None => eprintln!("Ticks:     until interrupted"),
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
