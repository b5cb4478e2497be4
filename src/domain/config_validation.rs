//! Configuration validation.
//!
//! Validates every section a run reads before any candle is fetched.

use crate::domain::error::EngineError;
use crate::domain::timeframe_plan::{ANALYSIS_SECTION, AnalysisPlan};
use crate::ports::config_port::ConfigPort;

pub const DATA_SECTION: &str = "data";
pub const OUTPUT_SECTION: &str = "output";

/// Everything `analyze` needs: symbol, plan, data and output locations.
pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    validate_symbol(config)?;
    AnalysisPlan::from_config(config)?;
    validate_data_directory(config)?;
    validate_output(config)?;
    Ok(())
}

/// The subset `candles` needs: no output section.
pub fn validate_candles_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    validate_symbol(config)?;
    AnalysisPlan::from_config(config)?;
    validate_data_directory(config)?;
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), EngineError> {
    require(config, ANALYSIS_SECTION, "symbol").map(|_| ())
}

fn validate_data_directory(config: &dyn ConfigPort) -> Result<(), EngineError> {
    require(config, DATA_SECTION, "directory").map(|_| ())
}

fn validate_output(config: &dyn ConfigPort) -> Result<(), EngineError> {
    require(config, OUTPUT_SECTION, "directory")?;
    if let Some(key) = config.get_string(OUTPUT_SECTION, "key") {
        let key = key.trim();
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(EngineError::ConfigInvalid {
                section: OUTPUT_SECTION.to_string(),
                key: "key".to_string(),
                reason: "key must be a plain file stem".to_string(),
            });
        }
    }
    Ok(())
}

/// A non-blank string value, trimmed.
pub fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, EngineError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(EngineError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}
