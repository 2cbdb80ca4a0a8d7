//! Domain error types.
//!
//! Only configuration and I/O can fail; the tick engine itself is infallible.

/// Top-level error type for simtrader.
#[derive(Debug, thiserror::Error)]
pub enum SimtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown market: {name}")]
    UnknownMarket { name: String },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimtraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SimtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SimtraderError> for std::process::ExitCode {
    fn from(err: &SimtraderError) -> Self {
        let code: u8 = match err {
            SimtraderError::Io(_) => 1,
            SimtraderError::ConfigParse { .. }
            | SimtraderError::ConfigInvalid { .. }
            | SimtraderError::UnknownMarket { .. }
            | SimtraderError::UnknownStrategy { .. } => 2,
        };
        std::process::ExitCode::from(code)
    }
}
