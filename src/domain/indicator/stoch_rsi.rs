//! Stochastic RSI.
//!
//! StochRSI[i] = (RSI[i] - min(RSI, n)) / (max(RSI, n) - min(RSI, n)) × 100
//! over the trailing n RSI values, all of which must be defined. Undefined when
//! the rolling range is zero.

use crate::domain::indicator::{full_window, Series};
use crate::domain::indicator_helpers::finite;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_stoch_rsi(rsi: &[Option<f64>], period: usize) -> Series {
    (0..rsi.len())
        .map(|i| {
            let window = full_window(rsi, i, period)?;
            let low = window.iter().copied().fold(f64::INFINITY, f64::min);
            let high = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let range = high - low;
            if range == 0.0 {
                return None;
            }
            finite((window[window.len() - 1] - low) / range * 100.0)
        })
        .collect()
}
