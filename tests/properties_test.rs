//! Property tests for the indicator and level invariants.

mod common;

use common::*;
use marketscope::domain::enrich::enrich;
use marketscope::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_rsi, calculate_sma, calculate_stoch_rsi,
    defined,
};
use marketscope::domain::indicator_helpers::calc_atr;
use marketscope::domain::levels::{
    cluster_levels, grade_levels_by_volume, GradedLevels, LevelKind,
};
use proptest::prelude::*;

fn closes_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, 2..max_len)
}

/// Candles with a random close path, spread and volume.
fn candles_strategy(max_len: usize) -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec((1.0f64..1000.0, 0.0f64..20.0, 0.0f64..1e6), 2..max_len).prop_map(
        |bars| {
            bars.into_iter()
                .enumerate()
                .map(|(i, (close, spread, volume))| Candle {
                    volume,
                    high: close + spread,
                    low: (close - spread).max(0.01),
                    ..make_candle(i, close, volume)
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn rsi_stays_in_bounds(closes in closes_strategy(300)) {
        for value in calculate_rsi(&closes, 14).into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn stoch_rsi_stays_in_bounds(closes in closes_strategy(300)) {
        let rsi = calculate_rsi(&closes, 14);
        for value in calculate_stoch_rsi(&rsi, 14).into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn atr_is_never_negative(candles in candles_strategy(200)) {
        for value in calc_atr(&candles, 14).into_iter().flatten() {
            prop_assert!(value >= 0.0);
        }
    }

    #[test]
    fn averages_warm_up_after_period(closes in closes_strategy(120), period in 1usize..40) {
        let input = defined(&closes);
        let sma = calculate_sma(&input, period);
        let ema = calculate_ema(&input, period);
        prop_assert_eq!(sma.len(), closes.len());
        for i in 0..closes.len() {
            let warm = i + 1 >= period;
            prop_assert_eq!(sma[i].is_some(), warm);
            prop_assert_eq!(ema[i].is_some(), warm);
        }
    }

    #[test]
    fn bollinger_bands_are_ordered(closes in closes_strategy(150)) {
        let bands = calculate_bollinger(&closes, 20, 200);
        for i in 0..closes.len() {
            if let (Some(lower), Some(middle), Some(upper)) =
                (bands.lower[i], bands.middle[i], bands.upper[i])
            {
                prop_assert!(lower <= middle && middle <= upper);
            }
        }
    }

    #[test]
    fn clusters_partition_the_prices(
        prices in prop::collection::vec(1.0f64..500.0, 0..60),
        tolerance in 0.01f64..25.0,
    ) {
        let clusters = cluster_levels(&prices, tolerance);
        let members: usize = clusters.iter().map(|c| c.members.len()).sum();
        prop_assert_eq!(members, prices.len());

        for cluster in &clusters {
            prop_assert!(!cluster.members.is_empty());
            for pair in cluster.members.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
                prop_assert!(pair[1] - pair[0] <= tolerance);
            }
            let low = cluster.members[0];
            let high = cluster.members[cluster.members.len() - 1];
            prop_assert!(low <= cluster.representative && cluster.representative <= high);
        }
        for pair in clusters.windows(2) {
            let previous_top = pair[0].members[pair[0].members.len() - 1];
            prop_assert!(pair[1].members[0] - previous_top > tolerance);
        }
    }

    #[test]
    fn grading_covers_every_level_once(
        candles in candles_strategy(80),
        levels in prop::collection::vec(1.0f64..1000.0, 0..20),
        radius in 0.1f64..10.0,
    ) {
        let graded = grade_levels_by_volume(&candles, &levels, LevelKind::Support, radius);
        prop_assert_eq!(graded.len(), levels.len());
        for (level, &price) in graded.iter().zip(&levels) {
            prop_assert_eq!(level.price, price);
            prop_assert_eq!(level.kind, LevelKind::Support);
        }

        let buckets = GradedLevels::from_levels(&graded);
        prop_assert_eq!(
            buckets.strong.len() + buckets.moderate.len() + buckets.weak.len(),
            levels.len()
        );
    }

    #[test]
    fn enrichment_keeps_one_row_per_candle(candles in candles_strategy(260)) {
        let enriched = enrich(table(candles.clone())).unwrap();
        prop_assert_eq!(enriched.len(), candles.len());
        for row in enriched.complete_rows() {
            let rsi = row.rsi14.unwrap();
            prop_assert!((0.0..=100.0).contains(&rsi));
            prop_assert!(row.atr14.unwrap() >= 0.0);
        }
    }
}

#[test]
fn rsi_approaches_100_after_one_down_tick() {
    let mut closes = vec![101.0, 100.0];
    closes.extend((1..200).map(|i| 100.0 + i as f64));
    let rsi = calculate_rsi(&closes, 14);

    let defined: Vec<f64> = rsi.iter().flatten().copied().collect();
    assert!(defined.windows(2).all(|pair| pair[1] >= pair[0]));
    assert!(*defined.last().unwrap() > 99.9);
}

#[test]
fn rsi_falls_to_zero_on_one_way_decline() {
    let closes: Vec<f64> = (0..100).map(|i| 500.0 - i as f64).collect();
    let rsi = calculate_rsi(&closes, 14);
    assert_eq!(rsi[0], None);
    assert!(rsi[1..].iter().all(|value| *value == Some(0.0)));
}
