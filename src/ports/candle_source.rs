//! Candle retrieval port.

use crate::domain::candle::CandleTable;
use crate::domain::error::EngineError;

pub trait CandleSource {
    /// The most recent `count` candles of `symbol` at `timeframe`, oldest
    /// first. Fewer are returned when the source holds fewer.
    fn fetch(&self, symbol: &str, timeframe: &str, count: usize)
    -> Result<CandleTable, EngineError>;
}
