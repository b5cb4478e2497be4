//! Volume trend and up/down-candle volume bias.

use serde::Serialize;

use crate::domain::enrich::EnrichedCandle;
use crate::domain::indicator_helpers::{mean, round2};
use crate::domain::summary::indicators::Bias;

const MIN_ROWS: usize = 20;
const RECENT_BARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysis {
    pub avg_volume: f64,
    pub recent_avg_volume: f64,
    pub volume_trend: VolumeTrend,
    pub bullish_volume_avg: f64,
    pub bearish_volume_avg: f64,
    pub volume_bias: Bias,
}

pub fn volume_analysis(tail: &[EnrichedCandle]) -> Option<VolumeAnalysis> {
    if tail.len() < MIN_ROWS {
        return None;
    }

    let volumes: Vec<f64> = tail.iter().map(|row| row.candle.volume).collect();
    let average = mean(&volumes)?;
    let recent = mean(&volumes[volumes.len() - RECENT_BARS..])?;

    let side_average = |keep: fn(&EnrichedCandle) -> bool| {
        let side: Vec<f64> = tail
            .iter()
            .filter(|row| keep(row))
            .map(|row| row.candle.volume)
            .collect();
        mean(&side).unwrap_or(0.0)
    };
    let bullish = side_average(|row| row.candle.is_bullish());
    let bearish = side_average(|row| row.candle.is_bearish());

    Some(VolumeAnalysis {
        avg_volume: round2(average),
        recent_avg_volume: round2(recent),
        volume_trend: if recent > average {
            VolumeTrend::Increasing
        } else {
            VolumeTrend::Decreasing
        },
        bullish_volume_avg: round2(bullish),
        bearish_volume_avg: round2(bearish),
        volume_bias: if bullish > bearish { Bias::Bullish } else { Bias::Bearish },
    })
}
