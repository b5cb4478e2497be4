//! Swing level detection, ATR-scaled zone clustering and volume grading.

use serde::Serialize;
use tracing::debug;

use crate::domain::candle::Candle;
use crate::domain::indicator_helpers::{mean, median, EPSILON};

pub const DEFAULT_SWING_WINDOW: usize = 10;
/// Zone tolerance in ATRs when clustering swing prices.
pub const ZONE_ATR_MULTIPLIER: f64 = 1.0;
/// Grading radius in ATRs around each level.
pub const GRADE_RADIUS_ATR_MULTIPLIER: f64 = 0.5;

const STRONG_VOLUME_RATIO: f64 = 1.5;
const MODERATE_VOLUME_RATIO: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub price: f64,
    pub kind: LevelKind,
    pub strength: LevelStrength,
}

/// Raw swing prices in positional order, neither deduplicated nor zoned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwingLevels {
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCluster {
    /// Ascending.
    pub members: Vec<f64>,
    pub representative: f64,
}

/// Levels bucketed by strength, each bucket ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GradedLevels {
    pub strong: Vec<f64>,
    pub moderate: Vec<f64>,
    pub weak: Vec<f64>,
}

impl GradedLevels {
    pub fn from_levels(levels: &[Level]) -> Self {
        let mut graded = Self::default();
        for level in levels {
            match level.strength {
                LevelStrength::Strong => graded.strong.push(level.price),
                LevelStrength::Moderate => graded.moderate.push(level.price),
                LevelStrength::Weak => graded.weak.push(level.price),
            }
        }
        graded.strong.sort_by(f64::total_cmp);
        graded.moderate.sort_by(f64::total_cmp);
        graded.weak.sort_by(f64::total_cmp);
        graded
    }
}

/// Position `i` is a swing high when its high is the maximum of the
/// `2 * window + 1` candles centred on it; swing lows are symmetric. Only
/// positions with a full window on both sides are considered.
pub fn detect_swing_levels<C: AsRef<Candle>>(candles: &[C], window: usize) -> SwingLevels {
    let mut levels = SwingLevels::default();
    if candles.len() <= 2 * window {
        return levels;
    }

    for i in window..candles.len() - window {
        let neighbourhood = &candles[i - window..=i + window];
        let candle = candles[i].as_ref();

        let max_high = neighbourhood
            .iter()
            .map(|c| c.as_ref().high)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_low = neighbourhood
            .iter()
            .map(|c| c.as_ref().low)
            .fold(f64::INFINITY, f64::min);

        if candle.high == max_high {
            levels.highs.push(candle.high);
        }
        if candle.low == min_low {
            levels.lows.push(candle.low);
        }
    }

    levels
}

/// Clustering tolerance scaled to current volatility, never below epsilon.
pub fn zone_tolerance(atr: f64, multiplier: f64) -> f64 {
    (atr * multiplier).max(EPSILON)
}

/// Single left-to-right scan over the sorted prices. A price joins the open
/// cluster when it is within `tolerance` of the last member added; otherwise
/// it starts a new one. Closed clusters are never revisited, so a chain of
/// close prices can span more than `tolerance` overall.
pub fn cluster_levels(prices: &[f64], tolerance: f64) -> Vec<ZoneCluster> {
    let mut sorted: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut groups: Vec<Vec<f64>> = Vec::new();
    for price in sorted {
        match groups.last_mut() {
            Some(group) if group.last().is_some_and(|last| price - last <= tolerance) => {
                group.push(price);
            }
            _ => groups.push(vec![price]),
        }
    }

    groups
        .into_iter()
        .filter_map(|members| {
            let representative = median(&members)?;
            Some(ZoneCluster {
                members,
                representative,
            })
        })
        .collect()
}

/// Grade each level by the mean volume of the candles whose `[low, high]`
/// range touches `[level - radius, level + radius]`, relative to the mean
/// volume of all candles. Levels nobody traded near get a local volume of 0.
/// Output order follows `levels`.
pub fn grade_levels_by_volume<C: AsRef<Candle>>(
    candles: &[C],
    levels: &[f64],
    kind: LevelKind,
    radius: f64,
) -> Vec<Level> {
    let volumes: Vec<f64> = candles.iter().map(|c| c.as_ref().volume).collect();
    let average_volume = mean(&volumes).unwrap_or(0.0);

    levels
        .iter()
        .map(|&price| {
            let local: Vec<f64> = candles
                .iter()
                .map(|c| c.as_ref())
                .filter(|c| c.high >= price - radius && c.low <= price + radius)
                .map(|c| c.volume)
                .collect();
            let local_volume = mean(&local).unwrap_or(0.0);

            let strength = if average_volume <= 0.0 {
                LevelStrength::Weak
            } else if local_volume >= STRONG_VOLUME_RATIO * average_volume {
                LevelStrength::Strong
            } else if local_volume >= MODERATE_VOLUME_RATIO * average_volume {
                LevelStrength::Moderate
            } else {
                LevelStrength::Weak
            };

            Level {
                price,
                kind,
                strength,
            }
        })
        .collect()
}

/// Zone representatives on the correct side of `price`, graded by volume.
///
/// Resistances must sit strictly above the price and supports strictly below.
pub fn key_levels<C: AsRef<Candle>>(candles: &[C], price: f64, atr: f64) -> Vec<Level> {
    let swings = detect_swing_levels(candles, DEFAULT_SWING_WINDOW);
    let tolerance = zone_tolerance(atr, ZONE_ATR_MULTIPLIER);
    let radius = zone_tolerance(atr, GRADE_RADIUS_ATR_MULTIPLIER);

    let resistances: Vec<f64> = cluster_levels(&swings.highs, tolerance)
        .into_iter()
        .map(|zone| zone.representative)
        .filter(|&level| level > price)
        .collect();
    let supports: Vec<f64> = cluster_levels(&swings.lows, tolerance)
        .into_iter()
        .map(|zone| zone.representative)
        .filter(|&level| level < price)
        .collect();

    debug!(
        swing_highs = swings.highs.len(),
        swing_lows = swings.lows.len(),
        resistances = resistances.len(),
        supports = supports.len(),
        tolerance,
        "clustered key levels"
    );

    let mut levels = grade_levels_by_volume(candles, &supports, LevelKind::Support, radius);
    levels.extend(grade_levels_by_volume(
        candles,
        &resistances,
        LevelKind::Resistance,
        radius,
    ));
    levels
}
