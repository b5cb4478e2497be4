//! Trend slope, momentum and volume-anomaly metrics.

use serde::Serialize;

use crate::domain::enrich::EnrichedCandle;
use crate::domain::indicator_helpers::{current_atr_or_range, finite, mean, EPSILON};

const MIN_ROWS: usize = 5;
const SLOPE_WINDOW: usize = 20;
pub(crate) const VOLUME_ANOMALY_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Rising,
    Falling,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub trend_slope: Option<f64>,
    pub momentum_strength: Option<Momentum>,
    pub volume_anomaly: Option<YesNo>,
}

/// ATR-normalised slope of the last `N = min(20, len)` closes, the combined
/// RSI / MACD-histogram direction over the same span, and whether the last
/// volume exceeds 1.5x the window mean.
pub fn metrics_report(tail: &[EnrichedCandle]) -> MetricsReport {
    if tail.len() < MIN_ROWS {
        return MetricsReport {
            trend_slope: None,
            momentum_strength: None,
            volume_anomaly: None,
        };
    }

    let n = SLOPE_WINDOW.min(tail.len());
    let span = &tail[tail.len() - n..];
    let last = &tail[tail.len() - 1];

    let change = last.candle.close - span[0].candle.close;
    let atr = last
        .atr14
        .or_else(|| current_atr_or_range(tail, 14))
        .unwrap_or(0.0);
    let slope = finite((change / (n as f64 * atr).max(EPSILON)).atan());

    let rsi: Vec<f64> = span.iter().filter_map(|row| row.rsi14).collect();
    let hist: Vec<f64> = span.iter().filter_map(|row| row.macd_hist).collect();
    let momentum = match (endpoint_change(&rsi), endpoint_change(&hist)) {
        (Some(r), Some(h)) if r > 0.0 && h > 0.0 => Some(Momentum::Rising),
        (Some(r), Some(h)) if r < 0.0 && h < 0.0 => Some(Momentum::Falling),
        (Some(_), Some(_)) => Some(Momentum::Mixed),
        _ => None,
    };

    let volumes: Vec<f64> = tail.iter().map(|row| row.candle.volume).collect();
    let anomaly = mean(&volumes).map(|avg| {
        if last.candle.volume > VOLUME_ANOMALY_RATIO * avg {
            YesNo::Yes
        } else {
            YesNo::No
        }
    });

    MetricsReport {
        trend_slope: slope,
        momentum_strength: momentum,
        volume_anomaly: anomaly,
    }
}

fn endpoint_change(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values[values.len() - 1] - values[0])
}
