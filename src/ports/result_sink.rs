//! Result publishing port.

use crate::domain::error::EngineError;

pub trait ResultSink {
    /// Store `value` under `key`, replacing whatever was there.
    fn store(&self, key: &str, value: &serde_json::Value) -> Result<(), EngineError>;
}
