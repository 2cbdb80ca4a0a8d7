//! Supported simulated markets and their instrument constants.

use std::fmt;
use std::str::FromStr;

use super::error::SimtraderError;

/// Display name of the simulated instrument.
pub const INSTRUMENT: &str = "HDFC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Market {
    #[default]
    Equity,
    Commodity,
}

impl Market {
    /// Per-minute volatility of the instrument (standard deviation of returns).
    pub fn volatility(self) -> f64 {
        match self {
            Market::Equity => 0.0008,
            Market::Commodity => 0.0005,
        }
    }

    /// Price the seeded history starts its random walk from.
    pub fn starting_price(self) -> f64 {
        match self {
            Market::Equity => 1450.0,
            Market::Commodity => 59500.0,
        }
    }

    pub fn exchange(self) -> &'static str {
        match self {
            Market::Equity => "NSE",
            Market::Commodity => "MCX",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Equity => write!(f, "Equity ({})", self.exchange()),
            Market::Commodity => write!(f, "Commodity ({})", self.exchange()),
        }
    }
}

impl FromStr for Market {
    type Err = SimtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equity" | "nse" => Ok(Market::Equity),
            "commodity" | "mcx" => Ok(Market::Commodity),
            _ => Err(SimtraderError::UnknownMarket {
                name: s.trim().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatility_constants_are_distinct() {
        assert!((Market::Equity.volatility() - 0.0008).abs() < f64::EPSILON);
        assert!((Market::Commodity.volatility() - 0.0005).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("equity".parse::<Market>().unwrap(), Market::Equity);
        assert_eq!(" NSE ".parse::<Market>().unwrap(), Market::Equity);
        assert_eq!("Commodity".parse::<Market>().unwrap(), Market::Commodity);
        assert_eq!("mcx".parse::<Market>().unwrap(), Market::Commodity);
    }

    #[test]
    fn rejects_unknown_market() {
        let err = "forex".parse::<Market>().unwrap_err();
        assert!(matches!(err, SimtraderError::UnknownMarket { name } if name == "forex"));
    }

    #[test]
    fn display_includes_exchange() {
        assert_eq!(Market::Equity.to_string(), "Equity (NSE)");
        assert_eq!(Market::Commodity.to_string(), "Commodity (MCX)");
    }
}
