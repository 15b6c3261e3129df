//! Domain error types.

/// Top-level error type for alphacross.
#[derive(Debug, thiserror::Error)]
pub enum AlphaCrossError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {records} records, need at least {minimum}")]
    InsufficientData {
        symbol: String,
        records: usize,
        minimum: usize,
    },

    #[error("classifier error: {reason}")]
    Classifier { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&AlphaCrossError> for std::process::ExitCode {
    fn from(err: &AlphaCrossError) -> Self {
        let code: u8 = match err {
            AlphaCrossError::Io(_) | AlphaCrossError::Json(_) => 1,
            AlphaCrossError::ConfigParse { .. }
            | AlphaCrossError::ConfigMissing { .. }
            | AlphaCrossError::ConfigInvalid { .. } => 2,
            AlphaCrossError::Data { .. } => 3,
            AlphaCrossError::Classifier { .. } => 4,
            AlphaCrossError::NoData { .. } | AlphaCrossError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
