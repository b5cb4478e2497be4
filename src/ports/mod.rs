//! Port traits the engine's collaborators implement.

pub mod candle_source;
pub mod config_port;
pub mod result_sink;
