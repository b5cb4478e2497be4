//! JSON file result sink: one pretty-printed file per key.

use crate::domain::error::EngineError;
use crate::ports::result_sink::ResultSink;
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub struct JsonFileSink {
    directory: PathBuf,
}

impl JsonFileSink {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl ResultSink for JsonFileSink {
    fn store(&self, key: &str, value: &serde_json::Value) -> Result<(), EngineError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(EngineError::Sink {
                reason: format!("invalid result key {:?}", key),
            });
        }
        fs::create_dir_all(&self.directory).map_err(EngineError::Io)?;
        let path = self.path_for(key);
        let body = serde_json::to_string_pretty(value)?;
        fs::write(&path, body).map_err(|e| EngineError::Sink {
            reason: format!("failed to write {}: {}", path.display(), e),
        })?;
        info!(key, path = %path.display(), "stored result");
        Ok(())
    }
}
