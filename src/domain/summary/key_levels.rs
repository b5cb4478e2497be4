//! Support and resistance report.

use serde::Serialize;

use crate::domain::enrich::EnrichedCandle;
use crate::domain::indicator_helpers::current_atr_or_range;
use crate::domain::levels::{key_levels, GradedLevels, Level, LevelKind};

/// Extra rows of context fed to swing detection beyond the requested window.
pub const KEY_LEVEL_LOOKBACK: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyLevelReport {
    pub strong_support: Vec<f64>,
    pub moderate_support: Vec<f64>,
    pub weak_support: Vec<f64>,
    pub strong_resistance: Vec<f64>,
    pub moderate_resistance: Vec<f64>,
    pub weak_resistance: Vec<f64>,
    pub all_support_levels: Vec<f64>,
    pub all_resistance_levels: Vec<f64>,
}

impl KeyLevelReport {
    fn from_levels(levels: &[Level]) -> Self {
        let (supports, resistances): (Vec<Level>, Vec<Level>) = levels
            .iter()
            .cloned()
            .partition(|level| level.kind == LevelKind::Support);

        let support = GradedLevels::from_levels(&supports);
        let resistance = GradedLevels::from_levels(&resistances);

        Self {
            strong_support: support.strong,
            moderate_support: support.moderate,
            weak_support: support.weak,
            strong_resistance: resistance.strong,
            moderate_resistance: resistance.moderate,
            weak_resistance: resistance.weak,
            all_support_levels: sorted_prices(&supports),
            all_resistance_levels: sorted_prices(&resistances),
        }
    }
}

fn sorted_prices(levels: &[Level]) -> Vec<f64> {
    let mut prices: Vec<f64> = levels.iter().map(|level| level.price).collect();
    prices.sort_by(f64::total_cmp);
    prices
}

/// Levels around the last close of the trailing `last_n + 200` priced rows,
/// zoned and graded with the last ATR of that context.
pub fn summarize_key_levels(priced: &[EnrichedCandle], last_n: usize) -> KeyLevelReport {
    let context = &priced[priced.len().saturating_sub(last_n + KEY_LEVEL_LOOKBACK)..];
    let Some(last) = context.last() else {
        return KeyLevelReport::default();
    };

    let atr = last
        .atr14
        .or_else(|| current_atr_or_range(context, 14))
        .unwrap_or(0.0);

    KeyLevelReport::from_levels(&key_levels(context, last.candle.close, atr))
}
