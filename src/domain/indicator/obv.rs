//! OBV (On-Balance Volume) indicator.

use crate::domain::candle::Candle;
use crate::domain::indicator::Series;

/// Calculate OBV (On-Balance Volume).
///
/// OBV[i] = OBV[i-1] + volume[i] * sign(close[i] - close[i-1]), sign(0) = 0.
/// The first bar has no previous close, counts as unchanged and starts at 0.
///
/// No warmup period; every position is defined.
pub fn calculate_obv<C: AsRef<Candle>>(candles: &[C]) -> Series {
    let mut obv = 0.0;
    let mut prev_close: Option<f64> = None;

    candles
        .iter()
        .map(|candle| {
            let candle = candle.as_ref();
            if let Some(prev) = prev_close {
                if candle.close > prev {
                    obv += candle.volume;
                } else if candle.close < prev {
                    obv -= candle.volume;
                }
            }
            prev_close = Some(candle.close);
            Some(obv)
        })
        .collect()
}
