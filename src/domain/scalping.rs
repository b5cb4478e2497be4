//! Short-timeframe analysis: scalping signal rules, micro levels, market
//! regime and volume anomalies.

use serde::Serialize;
use tracing::debug;

use crate::domain::candle::Candle;
use crate::domain::enrich::{EnrichedCandle, EnrichedTable};
use crate::domain::indicator::{calculate_ema, defined};
use crate::domain::indicator_helpers::{
    calc_atr, current_atr_or_range, finite, mean, population_stddev, round2,
};

pub const SHORT_TERM_WINDOW: usize = 50;
pub const MICRO_LEVEL_WINDOW: usize = 10;
const ATR_PERIOD: usize = 14;
const SQUEEZE_BANDWIDTH: f64 = 0.1;
const OVERSOLD: f64 = 20.0;
const OVERBOUGHT: f64 = 80.0;
const VOLUME_SPIKE_RATIO: f64 = 1.5;
const REGIME_MIN_CANDLES: usize = 50;
const ANOMALY_MIN_CANDLES: usize = 20;
const ANOMALY_WINDOW: usize = 50;
const MOMENTUM_BARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VwapPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StochZone {
    Oversold,
    Overbought,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOpportunity {
    VwapSupportLong,
    VwapRejectionShort,
    SqueezeBreakoutLong,
    SqueezeBreakoutShort,
    OversoldReversalLong,
    OverboughtReversalShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalInputs {
    pub vwap_position: Option<VwapPosition>,
    pub bollinger_squeeze: bool,
    pub stoch_rsi_signal: Option<StochZone>,
    pub volume_spike: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalpingSignals {
    pub signals: SignalInputs,
    pub entry_opportunities: Vec<EntryOpportunity>,
    pub confidence: Grade,
    pub confidence_score: u32,
    pub risk_level: Grade,
}

/// Rule table over the last row of `rows`; the volume spike compares the last
/// volume with the mean of `rows`.
pub fn scalping_signals(rows: &[EnrichedCandle]) -> ScalpingSignals {
    let last = rows.last();
    let close = last.map(|row| row.candle.close);

    let vwap_position = last.and_then(|row| {
        let vwap = row.vwap?;
        Some(if row.candle.close > vwap {
            VwapPosition::Above
        } else {
            VwapPosition::Below
        })
    });
    let squeeze = last
        .and_then(|row| row.bb_bandwidth)
        .is_some_and(|bandwidth| bandwidth < SQUEEZE_BANDWIDTH);
    let stoch_zone = last.and_then(|row| row.stoch_rsi).map(|stoch| {
        if stoch < OVERSOLD {
            StochZone::Oversold
        } else if stoch > OVERBOUGHT {
            StochZone::Overbought
        } else {
            StochZone::Neutral
        }
    });
    let volumes: Vec<f64> = rows.iter().map(|row| row.candle.volume).collect();
    let spike = match (last, mean(&volumes)) {
        (Some(row), Some(average)) => row.candle.volume > VOLUME_SPIKE_RATIO * average,
        _ => false,
    };

    let above = vwap_position == Some(VwapPosition::Above);
    let below = vwap_position == Some(VwapPosition::Below);
    let oversold = stoch_zone == Some(StochZone::Oversold);
    let overbought = stoch_zone == Some(StochZone::Overbought);

    let rules = [
        (oversold && above, EntryOpportunity::VwapSupportLong),
        (overbought && below, EntryOpportunity::VwapRejectionShort),
        (squeeze && spike && above, EntryOpportunity::SqueezeBreakoutLong),
        (squeeze && spike && below, EntryOpportunity::SqueezeBreakoutShort),
        (oversold && spike, EntryOpportunity::OversoldReversalLong),
        (overbought && spike, EntryOpportunity::OverboughtReversalShort),
    ];
    let entries: Vec<EntryOpportunity> = rules
        .into_iter()
        .filter_map(|(fires, tag)| fires.then_some(tag))
        .collect();

    let score = [
        oversold || overbought,
        (oversold && above) || (overbought && below),
        squeeze,
        spike,
    ]
    .into_iter()
    .filter(|&hit| hit)
    .count() as u32
        * 25;

    let confidence = match score {
        75.. => Grade::High,
        50.. => Grade::Medium,
        _ => Grade::Low,
    };
    let risk = match (spike, squeeze) {
        (true, false) => Grade::High,
        (false, true) => Grade::Low,
        _ => Grade::Medium,
    };

    debug!(?close, score, entries = entries.len(), "scalping signals");

    ScalpingSignals {
        signals: SignalInputs {
            vwap_position,
            bollinger_squeeze: squeeze,
            stoch_rsi_signal: stoch_zone,
            volume_spike: spike,
        },
        entry_opportunities: entries,
        confidence,
        confidence_score: score,
        risk_level: risk,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakoutLevels {
    pub upside: f64,
    pub downside: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicroLevels {
    pub immediate_resistance: f64,
    pub immediate_support: f64,
    pub current_range: f64,
    pub range_position_pct: Option<f64>,
    pub is_consolidating: bool,
    pub range_breakout_levels: BreakoutLevels,
}

/// Range of the last `window` candles. ATR comes from all of `candles`,
/// falling back to their mean range while ATR is still warming up.
pub fn micro_levels<C: AsRef<Candle>>(candles: &[C], window: usize) -> Option<MicroLevels> {
    let recent = &candles[candles.len().saturating_sub(window)..];
    let resistance = recent.iter().map(|c| c.as_ref().high).reduce(f64::max)?;
    let support = recent.iter().map(|c| c.as_ref().low).reduce(f64::min)?;
    let close = recent.last()?.as_ref().close;
    let atr = current_atr_or_range(candles, ATR_PERIOD).unwrap_or(0.0);
    let range = resistance - support;

    Some(MicroLevels {
        immediate_resistance: resistance,
        immediate_support: support,
        current_range: range,
        range_position_pct: if range == 0.0 {
            None
        } else {
            finite((close - support) / range * 100.0)
        },
        is_consolidating: range <= 2.0 * atr,
        range_breakout_levels: BreakoutLevels {
            upside: resistance + 0.25 * atr,
            downside: support - 0.25 * atr,
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    High,
    Low,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendRegime {
    TrendingUp,
    TrendingDown,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeRegime {
    Compressed,
    Expanded,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRegime {
    pub volatility_regime: Option<VolatilityRegime>,
    pub trend_regime: TrendRegime,
    pub range_regime: Option<RangeRegime>,
    pub current_vs_avg_volatility_ratio: Option<f64>,
}

/// Volatility, trend and range regime of the candles; needs 50 of them.
pub fn market_regime_analysis<C: AsRef<Candle>>(candles: &[C]) -> Option<MarketRegime> {
    if candles.len() < REGIME_MIN_CANDLES {
        return None;
    }

    let atr_series = calc_atr(candles, ATR_PERIOD);
    let recent_atr: Vec<f64> = atr_series[atr_series.len() - REGIME_MIN_CANDLES..]
        .iter()
        .flatten()
        .copied()
        .collect();
    let current_atr = recent_atr.last().copied();
    let ratio = current_atr
        .zip(mean(&recent_atr))
        .and_then(|(current, average)| finite(current / average))
        .map(round2);

    let volatility = ratio.map(|r| {
        if r >= 1.25 {
            VolatilityRegime::High
        } else if r <= 0.75 {
            VolatilityRegime::Low
        } else {
            VolatilityRegime::Normal
        }
    });

    let closes: Vec<f64> = candles.iter().map(|c| c.as_ref().close).collect();
    let prices = defined(&closes);
    let ema20 = calculate_ema(&prices, 20);
    let ema50 = calculate_ema(&prices, 50);
    let close = closes[closes.len() - 1];
    let trend = match (ema20[ema20.len() - 1], ema50[ema50.len() - 1]) {
        (Some(fast), Some(slow)) if close > fast && fast > slow => TrendRegime::TrendingUp,
        (Some(fast), Some(slow)) if close < fast && fast < slow => TrendRegime::TrendingDown,
        _ => TrendRegime::Sideways,
    };

    let span_window = &candles[candles.len() - 20..];
    let span_high = span_window.iter().map(|c| c.as_ref().high).fold(f64::NEG_INFINITY, f64::max);
    let span_low = span_window.iter().map(|c| c.as_ref().low).fold(f64::INFINITY, f64::min);
    let span = span_high - span_low;
    let range = current_atr.map(|atr| {
        if span < 3.0 * atr {
            RangeRegime::Compressed
        } else if span > 6.0 * atr {
            RangeRegime::Expanded
        } else {
            RangeRegime::Normal
        }
    });

    Some(MarketRegime {
        volatility_regime: volatility,
        trend_regime: trend,
        range_regime: range,
        current_vs_avg_volatility_ratio: ratio,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyLevel {
    Extreme,
    High,
    Elevated,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeMomentum {
    Increasing,
    Decreasing,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnomalies {
    pub volume_zscore: Option<f64>,
    pub anomaly_level: AnomalyLevel,
    pub current_vs_avg_volume_ratio: Option<f64>,
    pub is_volume_spike: bool,
    pub volume_momentum: VolumeMomentum,
}

/// Z-score of the last volume within the last 50; needs 20 candles.
pub fn detect_volume_anomalies<C: AsRef<Candle>>(candles: &[C]) -> Option<VolumeAnomalies> {
    if candles.len() < ANOMALY_MIN_CANDLES {
        return None;
    }

    let window = &candles[candles.len().saturating_sub(ANOMALY_WINDOW)..];
    let volumes: Vec<f64> = window.iter().map(|c| c.as_ref().volume).collect();
    let current = volumes[volumes.len() - 1];
    let average = mean(&volumes)?;
    let stddev = population_stddev(&volumes)?;

    let zscore = if stddev == 0.0 {
        None
    } else {
        finite((current - average) / stddev).map(round2)
    };
    let level = match zscore.map(f64::abs) {
        Some(z) if z >= 3.0 => AnomalyLevel::Extreme,
        Some(z) if z >= 2.0 => AnomalyLevel::High,
        Some(z) if z >= 1.0 => AnomalyLevel::Elevated,
        _ => AnomalyLevel::Normal,
    };

    let recent = mean(&volumes[volumes.len() - MOMENTUM_BARS..]);
    let prior = mean(&volumes[volumes.len() - 2 * MOMENTUM_BARS..volumes.len() - MOMENTUM_BARS]);
    let momentum = match (recent, prior) {
        (Some(r), Some(p)) if r > p => VolumeMomentum::Increasing,
        (Some(r), Some(p)) if r < p => VolumeMomentum::Decreasing,
        _ => VolumeMomentum::Flat,
    };

    Some(VolumeAnomalies {
        volume_zscore: zscore,
        anomaly_level: level,
        current_vs_avg_volume_ratio: if average == 0.0 {
            None
        } else {
            finite(current / average).map(round2)
        },
        is_volume_spike: zscore.is_some_and(|z| z >= 2.0),
        volume_momentum: momentum,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortTermMomentum {
    pub stoch_rsi: Option<f64>,
    pub bb_percent_b: Option<f64>,
    pub bb_bandwidth: Option<f64>,
    pub ema20_distance_pct: Option<f64>,
    pub vwap_distance_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortTermReport {
    pub scalping_signals: ScalpingSignals,
    pub micro_levels: Option<MicroLevels>,
    pub momentum: ShortTermMomentum,
    pub market_regime: Option<MarketRegime>,
    pub volume_anomalies: Option<VolumeAnomalies>,
}

/// Combined short-timeframe report over the last 50 enriched rows. Needs at
/// least 50 rows; completeness is not required.
pub fn enhanced_short_term_analysis(table: &EnrichedTable) -> Option<ShortTermReport> {
    if table.len() < SHORT_TERM_WINDOW {
        return None;
    }

    let window = table.tail(SHORT_TERM_WINDOW);
    let last = window.last()?;
    let close = last.candle.close;
    let distance_pct = |reference: Option<f64>| {
        reference
            .filter(|r| *r != 0.0)
            .and_then(|r| finite((close - r) / r * 100.0))
            .map(round2)
    };

    Some(ShortTermReport {
        scalping_signals: scalping_signals(window),
        micro_levels: micro_levels(window, MICRO_LEVEL_WINDOW),
        momentum: ShortTermMomentum {
            stoch_rsi: last.stoch_rsi.map(round2),
            bb_percent_b: last.bb_percent_b,
            bb_bandwidth: last.bb_bandwidth,
            ema20_distance_pct: distance_pct(last.ema20),
            vwap_distance_pct: distance_pct(last.vwap),
        },
        market_regime: market_regime_analysis(table.rows()),
        volume_anomalies: detect_volume_anomalies(table.rows()),
    })
}
