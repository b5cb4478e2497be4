//! RSI, MACD, ATR and volume-profile summaries over the tail window.

use serde::Serialize;

use crate::domain::enrich::EnrichedCandle;
use crate::domain::indicator_helpers::mean;

const HIGH_VOLATILITY_RATIO: f64 = 1.25;
const LOW_VOLATILITY_RATIO: f64 = 0.75;
const VOLUME_PROFILE_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slope {
    Rising,
    Falling,
}

impl Slope {
    /// Rising only when `last` is strictly above `first`.
    pub fn between(first: f64, last: f64) -> Self {
        if last > first { Slope::Rising } else { Slope::Falling }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Divergence {
    Bullish,
    Bearish,
    #[serde(rename = "none")]
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    High,
    Low,
    Moderate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeLevel {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiSummary {
    pub value: Option<f64>,
    pub trend: Option<Slope>,
    pub divergence: Divergence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdSummary {
    pub histogram_trend: Option<Slope>,
    pub crossover: Option<Bias>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtrSummary {
    pub value: Option<f64>,
    pub volatility_regime: Option<VolatilityRegime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeProfile {
    pub support_volume: Option<VolumeLevel>,
    pub resistance_volume: Option<VolumeLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub rsi: RsiSummary,
    pub macd: MacdSummary,
    pub atr: AtrSummary,
    pub volume_profile: VolumeProfile,
}

pub fn indicator_report(tail: &[EnrichedCandle]) -> IndicatorReport {
    IndicatorReport {
        rsi: rsi_summary(tail),
        macd: macd_summary(tail),
        atr: atr_summary(tail),
        volume_profile: volume_profile(tail),
    }
}

/// Current RSI, its direction across the window, and a three-bar divergence
/// against price.
pub fn rsi_summary(tail: &[EnrichedCandle]) -> RsiSummary {
    let rsi: Vec<f64> = tail.iter().filter_map(|row| row.rsi14).collect();
    let value = rsi.last().copied();

    if rsi.len() < 3 || tail.len() < 3 {
        return RsiSummary {
            value,
            trend: None,
            divergence: Divergence::Absent,
        };
    }

    let closes = &tail[tail.len() - 3..];
    let price_first = closes[0].candle.close;
    let price_last = closes[2].candle.close;
    let rsi_first = rsi[rsi.len() - 3];
    let rsi_last = rsi[rsi.len() - 1];

    let divergence = if price_last > price_first && rsi_last < rsi_first {
        Divergence::Bearish
    } else if price_last < price_first && rsi_last > rsi_first {
        Divergence::Bullish
    } else {
        Divergence::Absent
    };

    RsiSummary {
        value,
        trend: Some(Slope::between(rsi[0], rsi_last)),
        divergence,
    }
}

pub fn macd_summary(tail: &[EnrichedCandle]) -> MacdSummary {
    let rows: Vec<(f64, f64, f64)> = tail
        .iter()
        .filter_map(|row| Some((row.macd?, row.macd_signal?, row.macd_hist?)))
        .collect();

    match (rows.first(), rows.last()) {
        (Some(&(_, _, first_hist)), Some(&(line, signal, last_hist))) => MacdSummary {
            histogram_trend: Some(Slope::between(first_hist, last_hist)),
            crossover: Some(if line > signal { Bias::Bullish } else { Bias::Bearish }),
        },
        _ => MacdSummary {
            histogram_trend: None,
            crossover: None,
        },
    }
}

/// Last ATR against the window's mean ATR.
pub fn atr_summary(tail: &[EnrichedCandle]) -> AtrSummary {
    let atr: Vec<f64> = tail.iter().filter_map(|row| row.atr14).collect();
    let (Some(&value), Some(average)) = (atr.last(), mean(&atr)) else {
        return AtrSummary {
            value: None,
            volatility_regime: None,
        };
    };

    let regime = if value >= HIGH_VOLATILITY_RATIO * average {
        VolatilityRegime::High
    } else if value <= LOW_VOLATILITY_RATIO * average {
        VolatilityRegime::Low
    } else {
        VolatilityRegime::Moderate
    };

    AtrSummary {
        value: Some(value),
        volatility_regime: Some(regime),
    }
}

/// Recent (last 20) volume against the whole window. Heavier recent volume
/// reads as high support volume; the resistance label is always the opposite.
pub fn volume_profile(tail: &[EnrichedCandle]) -> VolumeProfile {
    let volumes: Vec<f64> = tail.iter().map(|row| row.candle.volume).collect();
    let recent = &volumes[volumes.len().saturating_sub(VOLUME_PROFILE_WINDOW)..];

    let (Some(recent_mean), Some(window_mean)) = (mean(recent), mean(&volumes)) else {
        return VolumeProfile {
            support_volume: None,
            resistance_volume: None,
        };
    };

    let (support, resistance) = if recent_mean > window_mean {
        (VolumeLevel::High, VolumeLevel::Low)
    } else {
        (VolumeLevel::Low, VolumeLevel::High)
    };

    VolumeProfile {
        support_volume: Some(support),
        resistance_volume: Some(resistance),
    }
}
