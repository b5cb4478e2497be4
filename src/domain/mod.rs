//! Core analysis engine: candles in, enriched rows and summaries out.
//!
//! Nothing in here performs I/O.

pub mod candle;
pub mod indicator;
pub mod indicator_helpers;
pub mod pattern;
pub mod levels;
pub mod settings;
pub mod enrich;
pub mod summary;
pub mod scalping;
pub mod validation;
pub mod timeframe_plan;
pub mod config_validation;
pub mod error;
