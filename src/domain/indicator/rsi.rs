//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing (alpha = 1/n) applied separately to clipped gains
//! and losses, seeded with the first price change:
//! - avg = prev_avg * (1 - 1/n) + current / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! The first bar has no price change and is undefined. When avg_loss == 0 the
//! ratio is undefined and so is the RSI; a flat or one-way market does not
//! read as a pinned 100.

use crate::domain::indicator::Series;
use crate::domain::indicator_helpers::finite;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Series {
    if period == 0 || closes.len() < 2 {
        return vec![None; closes.len()];
    }

    let alpha = 1.0 / period as f64;
    let mut values: Series = Vec::with_capacity(closes.len());
    values.push(None);

    let mut averages: Option<(f64, f64)> = None;

    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        let (avg_gain, avg_loss) = match averages {
            None => (gain, loss),
            Some((prev_gain, prev_loss)) => (
                prev_gain * (1.0 - alpha) + gain * alpha,
                prev_loss * (1.0 - alpha) + loss * alpha,
            ),
        };
        averages = Some((avg_gain, avg_loss));

        let rsi = if avg_loss == 0.0 {
            None
        } else {
            finite(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
        };
        values.push(rsi);
    }

    values
}
