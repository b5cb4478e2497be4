//! Shared helpers for indicator and summary calculations.

use crate::domain::candle::Candle;
use crate::domain::indicator::Series;

/// Floor used wherever a divisor or tolerance must stay strictly positive.
pub const EPSILON: f64 = 1e-9;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of an unsorted slice; the mean of the two middle values for even
/// lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation.
pub fn population_stddev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg) * (v - avg)).sum::<f64>() / values.len() as f64;
    finite(variance.sqrt())
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Drops NaN and infinities so they never reach a report.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Last defined value of a series.
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}

/// True range per candle; the first candle has no previous close and uses
/// high - low.
pub fn true_range_series<C: AsRef<Candle>>(candles: &[C]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let candle = candle.as_ref();
            if i == 0 {
                candle.range()
            } else {
                candle.true_range(candles[i - 1].as_ref().close)
            }
        })
        .collect()
}

/// ATR as a simple rolling mean of the true range.
///
/// The first `period - 1` positions are undefined.
pub fn calc_atr<C: AsRef<Candle>>(candles: &[C], period: usize) -> Series {
    if period == 0 {
        return vec![None; candles.len()];
    }

    let tr_values = true_range_series(candles);

    // Each window is summed afresh; a running sum can drift below zero on
    // flat data.
    (0..tr_values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let sum: f64 = tr_values[i + 1 - period..=i].iter().sum();
            finite(sum / period as f64)
        })
        .collect()
}

/// ATR of the last candle, falling back to the mean candle range when the
/// window is shorter than the ATR period.
pub fn current_atr_or_range<C: AsRef<Candle>>(candles: &[C], period: usize) -> Option<f64> {
    last_defined(&calc_atr(candles, period)).or_else(|| {
        let ranges: Vec<f64> = candles.iter().map(|c| c.as_ref().range()).collect();
        mean(&ranges)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_candle(i: i64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn atr_warmup() {
        let candles: Vec<Candle> = (0..5).map(|i| make_candle(i, 110.0, 90.0, 100.0)).collect();

        let series = calc_atr(&candles, 3);
        assert_eq!(series.len(), 5);
        assert!(series[0].is_none());
        assert!(series[1].is_none());
        assert!(series[2].is_some());
        assert!(series[4].is_some());
    }

    #[test]
    fn atr_is_simple_mean_of_true_range() {
        let candles = vec![
            make_candle(0, 110.0, 100.0, 105.0),
            make_candle(1, 115.0, 105.0, 110.0),
            make_candle(2, 120.0, 110.0, 115.0),
            make_candle(3, 140.0, 115.0, 120.0),
        ];

        let series = calc_atr(&candles, 3);
        assert!((series[2].unwrap() - 10.0).abs() < 1e-9);
        // TRs 10, 10, 25 over the last window
        assert!((series[3].unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn atr_first_row_uses_high_low() {
        let candles = vec![make_candle(0, 130.0, 100.0, 105.0)];
        let series = calc_atr(&candles, 1);
        assert!((series[0].unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn atr_handles_gaps() {
        let candles = vec![
            make_candle(0, 110.0, 100.0, 105.0),
            make_candle(1, 130.0, 120.0, 125.0),
            make_candle(2, 120.0, 110.0, 115.0),
        ];

        let series = calc_atr(&candles, 2);
        assert!(series[0].is_none());
        // TR[1] = |130 - 105| = 25
        assert!((series[1].unwrap() - (10.0 + 25.0) / 2.0).abs() < 1e-9);
        assert!(series[2].is_some());
    }

    #[test]
    fn atr_zero_period_is_undefined() {
        let candles = vec![make_candle(0, 110.0, 100.0, 105.0)];
        assert_eq!(calc_atr(&candles, 0), vec![None]);
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn mean_and_stddev() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        let sd = population_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[test]
    fn round2_rounds_half_away() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
    }

    #[test]
    fn finite_filters_nan_and_inf() {
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(1.5), Some(1.5));
    }

    #[test]
    fn fallback_to_mean_range_when_atr_undefined() {
        let candles = vec![
            make_candle(0, 110.0, 100.0, 105.0),
            make_candle(1, 114.0, 100.0, 105.0),
        ];
        assert_eq!(current_atr_or_range(&candles, 14), Some(12.0));
    }
}
