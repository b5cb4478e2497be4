//! Price/moving-average positions and golden/death cross detection.

use serde::Serialize;

use crate::domain::enrich::EnrichedCandle;
use crate::domain::summary::indicators::Bias;

const MIN_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Above,
    Below,
}

impl Position {
    fn of(value: f64, reference: f64) -> Self {
        if value > reference { Position::Above } else { Position::Below }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaPositions {
    pub price_vs_sma50: Position,
    pub price_vs_sma100: Position,
    pub price_vs_sma200: Position,
    pub sma50_vs_sma200: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageReport {
    pub positions: MaPositions,
    pub golden_cross: bool,
    pub death_cross: bool,
    pub ma_alignment: Bias,
}

/// Positions at the last row and crosses between the last two rows. `None`
/// when the window is too short or an average on the last row is undefined.
/// A previous row with either average undefined sits on neither side, so the
/// first bar with both defined can already be a cross.
pub fn moving_average_report(tail: &[EnrichedCandle]) -> Option<MovingAverageReport> {
    if tail.len() < MIN_ROWS {
        return None;
    }
    let last = &tail[tail.len() - 1];
    let prev = &tail[tail.len() - 2];

    let price = last.candle.close;
    let (sma50, sma100, sma200) = (last.sma50?, last.sma100?, last.sma200?);

    let positions = MaPositions {
        price_vs_sma50: Position::of(price, sma50),
        price_vs_sma100: Position::of(price, sma100),
        price_vs_sma200: Position::of(price, sma200),
        sma50_vs_sma200: Position::of(sma50, sma200),
    };
    let alignment = match positions.sma50_vs_sma200 {
        Position::Above => Bias::Bullish,
        Position::Below => Bias::Bearish,
    };

    Some(MovingAverageReport {
        golden_cross: sma50 > sma200 && !fast_above(prev),
        death_cross: sma50 < sma200 && !fast_below(prev),
        ma_alignment: alignment,
        positions,
    })
}

fn fast_above(row: &EnrichedCandle) -> bool {
    matches!((row.sma50, row.sma200), (Some(fast), Some(slow)) if fast > slow)
}

fn fast_below(row: &EnrichedCandle) -> bool {
    matches!((row.sma50, row.sma200), (Some(fast), Some(slow)) if fast < slow)
}

/// Every row index where SMA50 moves above SMA200. A previous row with
/// either average undefined counts as not above.
pub fn golden_cross_events(rows: &[EnrichedCandle]) -> Vec<usize> {
    rows.windows(2)
        .enumerate()
        .filter(|(_, pair)| fast_above(&pair[1]) && !fast_above(&pair[0]))
        .map(|(i, _)| i + 1)
        .collect()
}
