//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - %B: (price - lower) / (upper - lower), undefined when upper == lower
//! - Bandwidth: (upper - lower) / middle, undefined when middle == 0
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::{calculate_sma, calculate_stddev, defined, Series};
use crate::domain::indicator_helpers::finite;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: Series,
    pub upper: Series,
    pub lower: Series,
    pub percent_b: Series,
    pub bandwidth: Series,
}

/// `stddev_mult_x100` is the band multiplier in hundredths (200 = 2.0).
pub fn calculate_bollinger(closes: &[f64], period: usize, stddev_mult_x100: u32) -> BollingerBands {
    let mult = stddev_mult_x100 as f64 / 100.0;
    let prices = defined(closes);
    let middle = calculate_sma(&prices, period);
    let stddev = calculate_stddev(&prices, period);

    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());
    let mut percent_b = Vec::with_capacity(closes.len());
    let mut bandwidth = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let bands = middle[i].zip(stddev[i]).map(|(m, sd)| (m, m + mult * sd, m - mult * sd));
        match bands {
            Some((m, up, low)) => {
                upper.push(Some(up));
                lower.push(Some(low));
                percent_b.push(if up == low {
                    None
                } else {
                    finite((closes[i] - low) / (up - low))
                });
                bandwidth.push(if m == 0.0 { None } else { finite((up - low) / m) });
            }
            None => {
                upper.push(None);
                lower.push(None);
                percent_b.push(None);
                bandwidth.push(None);
            }
        }
    }

    BollingerBands {
        middle,
        upper,
        lower,
        percent_b,
        bandwidth,
    }
}
