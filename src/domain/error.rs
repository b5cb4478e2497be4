//! Domain error types.

use crate::domain::timeframe_plan::PlanError;

/// Top-level error type for marketscope.
///
/// The analysis engine itself only ever produces `InsufficientData`,
/// `UnorderedTimestamps` and `InvalidFeature`; the remaining variants belong to
/// the configuration, data source and result sink collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("insufficient data: have {rows} rows, need at least {minimum}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error("candle timestamps must be strictly increasing (row {index})")]
    UnorderedTimestamps { index: usize },

    #[error("invalid feature `{field}` at row {index}: {reason}")]
    InvalidFeature {
        index: usize,
        field: String,
        reason: String,
    },

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

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("no candles for {symbol} {timeframe}")]
    NoData { symbol: String, timeframe: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("result sink error: {reason}")]
    Sink { reason: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io(_) => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. }
            | EngineError::Plan(_) => 2,
            EngineError::NoData { .. }
            | EngineError::DataSource { .. }
            | EngineError::Sink { .. }
            | EngineError::Serialization(_) => 3,
            EngineError::InsufficientData { .. }
            | EngineError::UnorderedTimestamps { .. }
            | EngineError::InvalidFeature { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
