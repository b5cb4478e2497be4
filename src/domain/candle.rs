//! OHLCV candle and candle table representation.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::error::EngineError;

/// Fewest rows any indicator can do something with.
pub const MIN_TABLE_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.close.max(self.open)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.close.min(self.open) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Open-to-close change in percent; undefined for a zero open.
    pub fn change_pct(&self) -> Option<f64> {
        if self.open == 0.0 {
            None
        } else {
            Some((self.close - self.open) / self.open * 100.0)
        }
    }
}

impl AsRef<Candle> for Candle {
    fn as_ref(&self) -> &Candle {
        self
    }
}

/// Time-ordered candles for one symbol and timeframe.
///
/// Indexed both by position and by timestamp. Construction only checks that
/// timestamps strictly increase; price sanity is the caller's concern.
#[derive(Debug, Clone)]
pub struct CandleTable {
    candles: Vec<Candle>,
    timestamp_index: HashMap<DateTime<Utc>, usize>,
}

impl CandleTable {
    pub fn new(candles: Vec<Candle>) -> Result<Self, EngineError> {
        if let Some(index) = candles
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(EngineError::UnorderedTimestamps { index: index + 1 });
        }
        let timestamp_index = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| (candle.timestamp, i))
            .collect();
        Ok(Self {
            candles,
            timestamp_index,
        })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn position_of(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        self.timestamp_index.get(&timestamp).copied()
    }

    pub fn get_at(&self, timestamp: DateTime<Utc>) -> Option<&Candle> {
        self.position_of(timestamp).map(|i| &self.candles[i])
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// The trailing `n` candles (all of them when `n` exceeds the length).
    pub fn tail(&self, n: usize) -> &[Candle] {
        &self.candles[self.candles.len().saturating_sub(n)..]
    }

    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }
}
