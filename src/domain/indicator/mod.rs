//! Technical indicator implementations.
//!
//! Every indicator returns a [`Series`] aligned 1:1 with its input by
//! position. `None` marks a position where the indicator is undefined, either
//! during warm-up or because the arithmetic is degenerate (zero range, zero
//! average loss, zero volume). Undefined values are never replaced by 0 and
//! propagate through every indicator that consumes them.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stoch_rsi;
pub mod vwap;

pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use obv::calculate_obv;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;
pub use stoch_rsi::calculate_stoch_rsi;
pub use vwap::calculate_vwap;

/// An indicator series; `None` is the explicit "undefined" marker.
pub type Series = Vec<Option<f64>>;

/// Lifts a plain price series into a fully defined [`Series`].
pub fn defined(values: &[f64]) -> Series {
    values.iter().map(|&v| Some(v)).collect()
}

/// The trailing window ending at `index`, or `None` if it is shorter than
/// `period` or contains an undefined value.
pub(crate) fn full_window(values: &[Option<f64>], index: usize, period: usize) -> Option<Vec<f64>> {
    if period == 0 || index + 1 < period {
        return None;
    }
    values[index + 1 - period..=index].iter().copied().collect()
}
