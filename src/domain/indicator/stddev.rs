//! Rolling standard deviation.
//!
//! Population standard deviation (divides by n) over the trailing n values.
//! Warmup: first (n-1) positions are undefined.

use crate::domain::indicator::{full_window, Series};
use crate::domain::indicator_helpers::population_stddev;

pub fn calculate_stddev(values: &[Option<f64>], period: usize) -> Series {
    (0..values.len())
        .map(|i| full_window(values, i, period).and_then(|window| population_stddev(&window)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::defined;

    #[test]
    fn stddev_warmup() {
        let series = calculate_stddev(&defined(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);
        assert!(series[0].is_none());
        assert!(series[1].is_none());
        assert!(series[2].is_some());
    }

    #[test]
    fn stddev_constant_values() {
        let series = calculate_stddev(&defined(&[100.0; 5]), 3);
        for value in series.iter().skip(2) {
            assert!(value.unwrap().abs() < f64::EPSILON);
        }
    }

    #[test]
    fn stddev_known_values() {
        let series = calculate_stddev(&defined(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 8);
        assert!((series[7].unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn stddev_period_1() {
        let series = calculate_stddev(&defined(&[10.0, 20.0]), 1);
        assert_eq!(series, vec![Some(0.0), Some(0.0)]);
    }
}
