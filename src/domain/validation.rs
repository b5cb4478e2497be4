//! Sanity checks for enriched rows before summaries read them.

use crate::domain::enrich::EnrichedCandle;
use crate::domain::error::EngineError;

/// Reject the first row with an undefined core column or a value outside
/// its valid range.
pub fn validate_enriched(rows: &[EnrichedCandle]) -> Result<(), EngineError> {
    for (index, row) in rows.iter().enumerate() {
        validate_row(index, row, true)?;
    }
    Ok(())
}

/// Like [`validate_enriched`], but columns still inside their warm-up may be
/// undefined. `first_index` is the table position of `rows[0]`, so errors
/// name the row as it sits in the table.
pub fn validate_features(rows: &[EnrichedCandle], first_index: usize) -> Result<(), EngineError> {
    for (offset, row) in rows.iter().enumerate() {
        validate_row(first_index + offset, row, false)?;
    }
    Ok(())
}

fn validate_row(index: usize, row: &EnrichedCandle, require_defined: bool) -> Result<(), EngineError> {
    let invalid = |field: &str, reason: &str| EngineError::InvalidFeature {
        index,
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let candle = &row.candle;
    for (field, value) in [
        ("open", candle.open),
        ("high", candle.high),
        ("low", candle.low),
        ("close", candle.close),
        ("volume", candle.volume),
    ] {
        if !value.is_finite() {
            return Err(invalid(field, "value is not finite"));
        }
    }
    if candle.high < candle.low {
        return Err(invalid("high", "high is below low"));
    }
    if candle.volume < 0.0 {
        return Err(invalid("volume", "volume is negative"));
    }

    for (field, value) in row.core_fields() {
        match value {
            None if require_defined => return Err(invalid(field, "value is undefined")),
            Some(v) if !v.is_finite() => return Err(invalid(field, "value is not finite")),
            _ => {}
        }
    }
    if require_defined {
        if row.above_sma200.is_none() {
            return Err(invalid("above_sma200", "value is undefined"));
        }
        if row.above_ema200.is_none() {
            return Err(invalid("above_ema200", "value is undefined"));
        }
    }

    for (field, value) in row.auxiliary_fields() {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(invalid(field, "value is not finite"));
        }
    }

    let percent = |v: &f64| (0.0..=100.0).contains(v);
    if !row.rsi14.iter().all(percent) {
        return Err(invalid("rsi14", "outside [0, 100]"));
    }
    if !row.stoch_rsi.iter().all(percent) {
        return Err(invalid("stoch_rsi", "outside [0, 100]"));
    }
    if row.atr14.is_some_and(|atr| atr < 0.0) {
        return Err(invalid("atr14", "ATR is negative"));
    }

    Ok(())
}
