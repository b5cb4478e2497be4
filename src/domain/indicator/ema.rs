//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first defined input, then
//! EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! Warmup: a position is defined once n defined inputs have been seen, so a
//! fully defined input has its first (n-1) positions undefined, matching SMA.
//! An undefined input yields an undefined output and leaves the average as is.

use crate::domain::indicator::Series;
use crate::domain::indicator_helpers::finite;

pub fn calculate_ema(values: &[Option<f64>], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;
    let mut seen = 0usize;

    values
        .iter()
        .map(|value| {
            let x = (*value)?;
            seen += 1;
            let next = match ema {
                None => x,
                Some(prev) => x * k + prev * (1.0 - k),
            };
            ema = Some(next);
            if seen >= period { finite(next) } else { None }
        })
        .collect()
}
