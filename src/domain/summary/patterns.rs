//! Pattern report with breakout detection.

use serde::Serialize;

use crate::domain::enrich::EnrichedCandle;
use crate::domain::indicator_helpers::current_atr_or_range;
use crate::domain::pattern::{detect_multi_bar_pattern, CandlePattern, MultiBarPattern};

/// Breach size, in ATR-percent of price, that makes a breakout confirmed.
const CONFIRMED_BREAKOUT_ATR_PCT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutStrength {
    Confirmed,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub current_pattern: Option<CandlePattern>,
    pub multi_bar_pattern: Option<MultiBarPattern>,
    pub pattern_confidence: Confidence,
    /// `[highest high, lowest low]` of the rows before the last one.
    pub key_breakout_levels: [Option<f64>; 2],
    pub breakout_direction: Option<BreakoutDirection>,
    pub breakout_strength: Option<BreakoutStrength>,
}

pub fn pattern_report(tail: &[EnrichedCandle]) -> PatternReport {
    let current = tail.last().map(|row| row.pattern);
    let multi = detect_multi_bar_pattern(tail);

    let confidence = if current.is_some_and(CandlePattern::is_reversal) || multi.is_some() {
        Confidence::High
    } else {
        Confidence::Medium
    };

    let prior = &tail[..tail.len().saturating_sub(1)];
    let recent_high = prior
        .iter()
        .map(|row| row.candle.high)
        .reduce(f64::max);
    let recent_low = prior
        .iter()
        .map(|row| row.candle.low)
        .reduce(f64::min);

    let mut direction = None;
    let mut strength = None;

    if let (Some(last), Some(high), Some(low)) = (tail.last(), recent_high, recent_low) {
        let close = last.candle.close;
        let atr = last
            .atr14
            .or_else(|| current_atr_or_range(tail, 14))
            .unwrap_or(0.0);
        let threshold = CONFIRMED_BREAKOUT_ATR_PCT * atr / 100.0 * close;

        let breach = if close > high {
            Some((BreakoutDirection::Up, close - high))
        } else if close < low {
            Some((BreakoutDirection::Down, low - close))
        } else {
            None
        };

        if let Some((dir, distance)) = breach {
            direction = Some(dir);
            strength = Some(if distance > threshold {
                BreakoutStrength::Confirmed
            } else {
                BreakoutStrength::Weak
            });
        }
    }

    PatternReport {
        current_pattern: current,
        multi_bar_pattern: multi,
        pattern_confidence: confidence,
        key_breakout_levels: [recent_high, recent_low],
        breakout_direction: direction,
        breakout_strength: strength,
    }
}
