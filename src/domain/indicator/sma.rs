//! Simple Moving Average.
//!
//! SMA(n)[i] = mean of the trailing n values. Warmup: first (n-1) positions
//! are undefined, as is any window holding an undefined input.

use crate::domain::indicator::{full_window, Series};
use crate::domain::indicator_helpers::mean;

pub fn calculate_sma(values: &[Option<f64>], period: usize) -> Series {
    (0..values.len())
        .map(|i| full_window(values, i, period).and_then(|window| mean(&window)))
        .collect()
}
