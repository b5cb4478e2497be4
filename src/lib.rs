//! marketscope: candle feature extraction for multi-timeframe market analysis.
//!
//! Hexagonal architecture: the analysis engine in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`], and the per-symbol
//! run in [`orchestration`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod orchestration;
pub mod cli;
