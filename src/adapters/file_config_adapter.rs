//! INI file configuration adapter.
//!
//! Command-line overrides are written into the same store with [`set`], so
//! file values and flags go through a single validation path.
//!
//! [`set`]: FileConfigAdapter::set

use crate::ports::config_port::{parse_bool, ConfigPort};
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    /// An adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Insert or replace a single value.
    pub fn set(&mut self, section: &str, key: &str, value: impl ToString) {
        self.config.set(section, key, Some(value.to_string()));
    }
}

impl Default for FileConfigAdapter {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[market]
name = commodity
history = 150

[strategy]
kind = sma_crossover
sma_short = 5
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("market", "name"),
            Some("commodity".to_string())
        );
        assert_eq!(adapter.get_int("market", "history", 0), 150);
        assert_eq!(
            adapter.get_string("strategy", "kind"),
            Some("sma_crossover".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[market]\nname = equity\n").unwrap();
        assert_eq!(adapter.get_string("market", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[execution]\nquantity = abc\n").unwrap();
        assert_eq!(adapter.get_int("execution", "quantity", 42), 42);
        assert_eq!(adapter.get_int("execution", "missing", 7), 7);
    }

    #[test]
    fn get_double_returns_value_or_default() {
        let adapter =
            FileConfigAdapter::from_string("[execution]\ntick_delay = 0.25\n").unwrap();
        assert_eq!(adapter.get_double("execution", "tick_delay", 1.0), 0.25);
        assert_eq!(adapter.get_double("strategy", "rsi_buy", 30.0), 30.0);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[execution]\na = true\nb = yes\nc = 1\nd = off\ne = No\nf = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("execution", "a", false));
        assert!(adapter.get_bool("execution", "b", false));
        assert!(adapter.get_bool("execution", "c", false));
        assert!(!adapter.get_bool("execution", "d", true));
        assert!(!adapter.get_bool("execution", "e", true));
        assert!(adapter.get_bool("execution", "f", true));
        assert!(!adapter.get_bool("execution", "missing", false));
    }

    #[test]
    fn set_overrides_file_values() {
        let mut adapter =
            FileConfigAdapter::from_string("[execution]\nquantity = 2\n").unwrap();
        adapter.set("execution", "quantity", 5);
        adapter.set("execution", "allow_shorts", true);
        assert_eq!(adapter.get_int("execution", "quantity", 0), 5);
        assert!(adapter.get_bool("execution", "allow_shorts", false));
    }

    #[test]
    fn empty_adapter_returns_defaults() {
        let mut adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("market", "name"), None);
        assert_eq!(adapter.get_int("market", "history", 100), 100);
        adapter.set("simulation", "seed", 99u64);
        assert_eq!(
            adapter.get_string("simulation", "seed"),
            Some("99".to_string())
        );
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[simulation]\nseed = 42\nticks = 10\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_int("simulation", "seed", 0), 42);
        assert_eq!(adapter.get_int("simulation", "ticks", 0), 10);
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/simtrader.ini");
        assert!(result.is_err());
    }
}
