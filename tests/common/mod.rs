#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
pub use marketscope::domain::candle::{Candle, CandleTable};
use marketscope::domain::error::EngineError;
use marketscope::ports::candle_source::CandleSource;
use marketscope::ports::result_sink::ResultSink;
use std::cell::RefCell;
use std::collections::HashMap;

/// Serves candle lists keyed by timeframe, trimmed to the requested count.
pub struct MockCandleSource {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, String, usize)>>,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_candles(mut self, timeframe: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(timeframe.to_string(), candles);
        self
    }

    pub fn with_error(mut self, timeframe: &str, reason: &str) -> Self {
        self.errors.insert(timeframe.to_string(), reason.to_string());
        self
    }
}

impl CandleSource for MockCandleSource {
    fn fetch(
        &self,
        symbol: &str,
        timeframe: &str,
        count: usize,
    ) -> Result<CandleTable, EngineError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), timeframe.to_string(), count));
        if let Some(reason) = self.errors.get(timeframe) {
            return Err(EngineError::DataSource {
                reason: reason.clone(),
            });
        }
        let candles = self.data.get(timeframe).ok_or_else(|| EngineError::NoData {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
        })?;
        let skip = candles.len().saturating_sub(count);
        CandleTable::new(candles[skip..].to_vec())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub stored: RefCell<Vec<(String, serde_json::Value)>>,
}

impl ResultSink for RecordingSink {
    fn store(&self, key: &str, value: &serde_json::Value) -> Result<(), EngineError> {
        self.stored
            .borrow_mut()
            .push((key.to_string(), value.clone()));
        Ok(())
    }
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Hourly candle opening at the close, with a 2-point range.
pub fn make_candle(i: usize, close: f64, volume: f64) -> Candle {
    Candle {
        timestamp: start() + Duration::hours(i as i64),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
    }
}

pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_candle(i, close, 1000.0))
        .collect()
}

/// Every price equal: no range, no movement.
pub fn flat_series(n: usize, price: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| Candle {
            timestamp: start() + Duration::hours(i as i64),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1000.0,
        })
        .collect()
}

/// Closes step +1 per bar from 100.
pub fn rising_series(n: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
    candles_from_closes(&closes)
}

/// A gently trending sine wave with varying volume.
pub fn wave_series(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 0.05 * t + 4.0 * (t / 9.0).sin();
            Candle {
                timestamp: start() + Duration::hours(i as i64),
                open: close - 0.3 * (t / 4.0).cos(),
                high: close + 1.2,
                low: close - 1.1,
                close,
                volume: 900.0 + 300.0 * ((i * 7) % 5) as f64,
            }
        })
        .collect()
}

pub fn table(candles: Vec<Candle>) -> CandleTable {
    CandleTable::new(candles).unwrap()
}
