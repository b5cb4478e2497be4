//! Multi-horizon trend, Fibonacci retracements and price-action structure.

use serde::Serialize;

use crate::domain::enrich::EnrichedCandle;
use crate::domain::indicator_helpers::{finite, round2};
use crate::domain::summary::indicators::Bias;

const TREND_MIN_ROWS: usize = 50;
const HORIZONS: [usize; 3] = [10, 30, 50];
const FIBONACCI_MIN_ROWS: usize = 50;
const PRICE_ACTION_MIN_ROWS: usize = 20;
const PRICE_ACTION_BARS: usize = 10;
const EXTREMES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonTrend {
    pub direction: Bias,
    pub strength_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    Consistent,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub short_term: Option<HorizonTrend>,
    pub medium_term: Option<HorizonTrend>,
    pub long_term: Option<HorizonTrend>,
    pub overall_direction: Option<Bias>,
    pub trend_consistency: Option<Consistency>,
}

/// Direction and percent move at the 10, 30 and 50 bar horizons, with the
/// overall direction decided by majority.
pub fn trend_analysis(tail: &[EnrichedCandle]) -> TrendAnalysis {
    if tail.len() < TREND_MIN_ROWS {
        return TrendAnalysis {
            short_term: None,
            medium_term: None,
            long_term: None,
            overall_direction: None,
            trend_consistency: None,
        };
    }

    let close = tail[tail.len() - 1].candle.close;
    let [short, medium, long] = HORIZONS.map(|n| {
        let reference = tail[tail.len() - n].candle.close;
        HorizonTrend {
            direction: if close > reference { Bias::Bullish } else { Bias::Bearish },
            strength_pct: finite((close - reference).abs() / reference * 100.0).map(round2),
        }
    });

    let bullish = [&short, &medium, &long]
        .iter()
        .filter(|trend| trend.direction == Bias::Bullish)
        .count();

    TrendAnalysis {
        overall_direction: Some(if bullish >= 2 { Bias::Bullish } else { Bias::Bearish }),
        trend_consistency: Some(if bullish == 0 || bullish == 3 {
            Consistency::Consistent
        } else {
            Consistency::Mixed
        }),
        short_term: Some(short),
        medium_term: Some(medium),
        long_term: Some(long),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FibonacciLevels {
    pub swing_high: f64,
    pub swing_low: f64,
    #[serde(rename = "fib_0.236")]
    pub fib_0_236: f64,
    #[serde(rename = "fib_0.382")]
    pub fib_0_382: f64,
    #[serde(rename = "fib_0.5")]
    pub fib_0_5: f64,
    #[serde(rename = "fib_0.618")]
    pub fib_0_618: f64,
    #[serde(rename = "fib_0.786")]
    pub fib_0_786: f64,
}

/// Retracements measured down from the window's highest high.
pub fn fibonacci_levels(tail: &[EnrichedCandle]) -> Option<FibonacciLevels> {
    if tail.len() < FIBONACCI_MIN_ROWS {
        return None;
    }

    let high = tail.iter().map(|row| row.candle.high).reduce(f64::max)?;
    let low = tail.iter().map(|row| row.candle.low).reduce(f64::min)?;
    let diff = high - low;
    let level = |ratio: f64| round2(high - ratio * diff);

    Some(FibonacciLevels {
        swing_high: high,
        swing_low: low,
        fib_0_236: level(0.236),
        fib_0_382: level(0.382),
        fib_0_5: level(0.5),
        fib_0_618: level(0.618),
        fib_0_786: level(0.786),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStructure {
    StrongUptrend,
    StrongDowntrend,
    BullishStructure,
    BearishStructure,
    Ranging,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAction {
    pub higher_highs: bool,
    pub higher_lows: bool,
    pub market_structure: MarketStructure,
}

/// Structure of the last 10 bars from their three highest highs and three
/// lowest lows, each triple taken in time order.
pub fn price_action(tail: &[EnrichedCandle]) -> Option<PriceAction> {
    if tail.len() < PRICE_ACTION_MIN_ROWS {
        return None;
    }

    let bars = &tail[tail.len() - PRICE_ACTION_BARS..];
    let highs: Vec<f64> = bars.iter().map(|row| row.candle.high).collect();
    let lows: Vec<f64> = bars.iter().map(|row| row.candle.low).collect();

    let top_highs = extremes_in_time_order(&highs, |a, b| b.total_cmp(a));
    let bottom_lows = extremes_in_time_order(&lows, |a, b| a.total_cmp(b));

    let higher_highs = strictly(&top_highs, |earlier, later| later > earlier);
    let lower_highs = strictly(&top_highs, |earlier, later| later < earlier);
    let higher_lows = strictly(&bottom_lows, |earlier, later| later > earlier);
    let lower_lows = strictly(&bottom_lows, |earlier, later| later < earlier);

    let structure = match (higher_highs, higher_lows, lower_highs, lower_lows) {
        (true, true, _, _) => MarketStructure::StrongUptrend,
        (_, _, true, true) => MarketStructure::StrongDowntrend,
        (_, true, true, _) | (true, _, _, true) => MarketStructure::Ranging,
        (true, _, _, _) | (_, true, _, _) => MarketStructure::BullishStructure,
        (_, _, true, _) | (_, _, _, true) => MarketStructure::BearishStructure,
        _ => MarketStructure::Ranging,
    };

    Some(PriceAction {
        higher_highs,
        higher_lows,
        market_structure: structure,
    })
}

/// The three extreme values under `rank`, returned in their original order.
/// Ties keep the earlier bar first.
fn extremes_in_time_order(
    values: &[f64],
    rank: impl Fn(&f64, &f64) -> std::cmp::Ordering,
) -> Vec<f64> {
    let mut positions: Vec<usize> = (0..values.len()).collect();
    positions.sort_by(|&a, &b| rank(&values[a], &values[b]));
    positions.truncate(EXTREMES);
    positions.sort_unstable();
    positions.into_iter().map(|i| values[i]).collect()
}

fn strictly(values: &[f64], step: impl Fn(f64, f64) -> bool) -> bool {
    values.len() == EXTREMES && values.windows(2).all(|pair| step(pair[0], pair[1]))
}
