//! Single-bar and three-bar candle pattern classification.

use serde::Serialize;

use crate::domain::candle::Candle;
use crate::domain::indicator_helpers::EPSILON;

/// Body/range ratio below which a candle is a doji.
const DOJI_BODY_RATIO: f64 = 0.1;
/// Body/range ratio below which the middle star candle counts as small.
const STAR_BODY_RATIO: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlePattern {
    Doji,
    Hammer,
    ShootingStar,
    Normal,
    /// High equals low: there is no range to compare the body against.
    Undefined,
}

impl CandlePattern {
    /// Reversal-shaped patterns carry more weight in the pattern report.
    pub fn is_reversal(self) -> bool {
        matches!(self, CandlePattern::Hammer | CandlePattern::ShootingStar)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiBarPattern {
    MorningStar,
    EveningStar,
}

/// Classify one candle. Rules are checked in order and the first match wins.
pub fn classify_candle(candle: &Candle) -> CandlePattern {
    if candle.range() <= 0.0 {
        return CandlePattern::Undefined;
    }

    let body = candle.body();
    let upper = candle.upper_shadow();
    let lower = candle.lower_shadow();

    if body / candle.range().max(EPSILON) < DOJI_BODY_RATIO {
        CandlePattern::Doji
    } else if lower > 2.0 * body && upper < body {
        CandlePattern::Hammer
    } else if upper > 2.0 * body && lower < body {
        CandlePattern::ShootingStar
    } else {
        CandlePattern::Normal
    }
}

/// Morning/evening star over the last three candles.
///
/// No preceding trend is required: the three-candle shape alone decides.
pub fn detect_multi_bar_pattern<C: AsRef<Candle>>(candles: &[C]) -> Option<MultiBarPattern> {
    let [first, middle, last] = candles.get(candles.len().checked_sub(3)?..)? else {
        return None;
    };
    let (first, middle, last) = (first.as_ref(), middle.as_ref(), last.as_ref());

    let small_middle = middle.body() / middle.range().max(EPSILON) < STAR_BODY_RATIO;
    if !small_middle {
        return None;
    }
    let first_midpoint = (first.open + first.close) / 2.0;

    if first.is_bearish() && last.is_bullish() && last.close > first_midpoint {
        Some(MultiBarPattern::MorningStar)
    } else if first.is_bullish() && last.is_bearish() && last.close < first_midpoint {
        Some(MultiBarPattern::EveningStar)
    } else {
        None
    }
}
