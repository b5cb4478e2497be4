//! Summary aggregation over an enriched table.
//!
//! Sub-reports read only the columns they need. Price, volume and ATR based
//! reports use the priced rows (ATR defined), so a window without a single
//! down-tick, where RSI stays undefined, still gets breakouts and levels.
//! Most read the tail window (the last `max(last_n, 100)` priced rows); key
//! levels read a wider context; moving averages read the raw trailing rows.
//! The RSI and MACD summaries skip rows where their own columns are
//! undefined. A sub-report without enough rows is `null` (or has `null`
//! fields), never an error.

pub mod indicators;
pub mod key_levels;
pub mod metrics;
pub mod moving_averages;
pub mod patterns;
pub mod trend;
pub mod volume;

use serde::Serialize;
use tracing::debug;

use crate::domain::enrich::{EnrichedCandle, EnrichedTable};
use crate::domain::error::EngineError;
use crate::domain::validation::validate_features;

pub use indicators::{indicator_report, IndicatorReport};
pub use key_levels::{summarize_key_levels, KeyLevelReport, KEY_LEVEL_LOOKBACK};
pub use metrics::{metrics_report, MetricsReport};
pub use moving_averages::{golden_cross_events, moving_average_report, MovingAverageReport};
pub use patterns::{pattern_report, PatternReport};
pub use trend::{
    fibonacci_levels, price_action, trend_analysis, FibonacciLevels, PriceAction, TrendAnalysis,
};
pub use volume::{volume_analysis, VolumeAnalysis};

/// Floor on the tail window, whatever `last_n` asks for.
pub const MIN_TAIL_WINDOW: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTree {
    pub key_levels: KeyLevelReport,
    pub indicators: IndicatorReport,
    pub patterns: PatternReport,
    pub metrics: MetricsReport,
    pub trend_analysis: TrendAnalysis,
    pub fibonacci: Option<FibonacciLevels>,
    pub price_action: Option<PriceAction>,
    pub volume_analysis: Option<VolumeAnalysis>,
    pub moving_averages: Option<MovingAverageReport>,
}

/// The last `max(last_n, 100)` rows of `rows`.
pub fn tail_window(rows: &[EnrichedCandle], last_n: usize) -> &[EnrichedCandle] {
    let size = last_n.max(MIN_TAIL_WINDOW);
    &rows[rows.len().saturating_sub(size)..]
}

/// The rows from the first defined ATR onward. ATR needs only OHLC, so once
/// defined it stays defined.
pub fn priced_rows(table: &EnrichedTable) -> &[EnrichedCandle] {
    let rows = table.rows();
    let first = rows
        .iter()
        .position(|row| row.atr14.is_some())
        .unwrap_or(rows.len());
    &rows[first..]
}

/// Validate the rows the summary will read, then build every sub-report.
pub fn build_summary(table: &EnrichedTable, last_n: usize) -> Result<SummaryTree, EngineError> {
    let rows = table.rows();
    let consumed = rows.len().saturating_sub(last_n + KEY_LEVEL_LOOKBACK);
    validate_features(&rows[consumed..], consumed)?;

    let priced = priced_rows(table);
    let tail = tail_window(priced, last_n);
    let recent = tail_window(rows, last_n);

    debug!(
        rows = table.len(),
        priced = priced.len(),
        tail = tail.len(),
        last_n,
        "building summary"
    );

    Ok(SummaryTree {
        key_levels: summarize_key_levels(priced, last_n),
        indicators: indicator_report(tail),
        patterns: pattern_report(tail),
        metrics: metrics_report(tail),
        trend_analysis: trend_analysis(tail),
        fibonacci: fibonacci_levels(tail),
        price_action: price_action(tail),
        volume_analysis: volume_analysis(tail),
        moving_averages: moving_average_report(recent),
    })
}
