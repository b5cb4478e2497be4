//! Running VWAP (Volume-Weighted Average Price).
//!
//! VWAP[i] = Σ(typical_price × volume) / Σ(volume) over every candle up to i.
//! There is no session reset: the horizon is whatever window the caller
//! supplies. Undefined while the cumulative volume is still zero.

use crate::domain::candle::Candle;
use crate::domain::indicator::Series;
use crate::domain::indicator_helpers::finite;

pub fn calculate_vwap<C: AsRef<Candle>>(candles: &[C]) -> Series {
    let mut cumulative_pv = 0.0;
    let mut cumulative_volume = 0.0;

    candles
        .iter()
        .map(|candle| {
            let candle = candle.as_ref();
            cumulative_pv += candle.typical_price() * candle.volume;
            cumulative_volume += candle.volume;
            if cumulative_volume == 0.0 {
                None
            } else {
                finite(cumulative_pv / cumulative_volume)
            }
        })
        .collect()
}
