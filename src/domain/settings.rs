//! Indicator periods used by the enrichment stage.
//!
//! Output field names (`sma50`, `rsi14`, ...) stay fixed whatever the periods
//! are; overriding a period changes the numbers, not the report shape.

use crate::domain::error::EngineError;
use crate::domain::indicator::{bollinger, macd, stoch_rsi};
use crate::ports::config_port::ConfigPort;

pub const INDICATORS_SECTION: &str = "indicators";

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    /// Short, medium and long periods shared by the SMA and EMA families.
    pub ma_periods: [usize; 3],
    pub rsi_period: usize,
    pub atr_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    /// Band width in hundredths of a standard deviation (200 = 2.0σ).
    pub bollinger_mult_x100: u32,
    pub stoch_rsi_period: usize,
    pub ema_short_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma_periods: [50, 100, 200],
            rsi_period: 14,
            atr_period: 14,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
            stoch_rsi_period: stoch_rsi::DEFAULT_PERIOD,
            ema_short_period: 20,
        }
    }
}

impl IndicatorSettings {
    /// Defaults overlaid with any keys present in the `[indicators]` section.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EngineError> {
        let defaults = Self::default();
        let settings = Self {
            ma_periods: [
                period(config, "sma_short", defaults.ma_periods[0])?,
                period(config, "sma_medium", defaults.ma_periods[1])?,
                period(config, "sma_long", defaults.ma_periods[2])?,
            ],
            rsi_period: period(config, "rsi_period", defaults.rsi_period)?,
            atr_period: period(config, "atr_period", defaults.atr_period)?,
            macd_fast: period(config, "macd_fast", defaults.macd_fast)?,
            macd_slow: period(config, "macd_slow", defaults.macd_slow)?,
            macd_signal: period(config, "macd_signal", defaults.macd_signal)?,
            bollinger_period: period(config, "bollinger_period", defaults.bollinger_period)?,
            bollinger_mult_x100: bollinger_mult(config, defaults.bollinger_mult_x100)?,
            stoch_rsi_period: period(config, "stoch_rsi_period", defaults.stoch_rsi_period)?,
            ema_short_period: period(config, "ema_short", defaults.ema_short_period)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Longest lookback any enriched column needs before it is defined.
    pub fn warmup(&self) -> usize {
        let [short, medium, long] = self.ma_periods;
        [
            short,
            medium,
            long,
            self.rsi_period + 1,
            self.atr_period,
            self.macd_slow + self.macd_signal - 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    fn validate(&self) -> Result<(), EngineError> {
        let [short, medium, long] = self.ma_periods;
        if !(short < medium && medium < long) {
            return Err(invalid(
                "sma_long",
                "moving average periods must increase: short < medium < long",
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(invalid("macd_fast", "macd_fast must be below macd_slow"));
        }
        Ok(())
    }
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, EngineError> {
    let value = config
        .get_int(INDICATORS_SECTION, key)?
        .unwrap_or(default as i64);
    if value < 1 {
        return Err(invalid(key, &format!("{} must be at least 1", key)));
    }
    usize::try_from(value).map_err(|_| invalid(key, &format!("{} is out of range", key)))
}

fn bollinger_mult(config: &dyn ConfigPort, default_x100: u32) -> Result<u32, EngineError> {
    let mult = config
        .get_double(INDICATORS_SECTION, "bollinger_stddev")?
        .unwrap_or(default_x100 as f64 / 100.0);
    if !(mult > 0.0 && mult <= 10.0) {
        return Err(invalid(
            "bollinger_stddev",
            "bollinger_stddev must be in (0, 10]",
        ));
    }
    Ok((mult * 100.0).round() as u32)
}

fn invalid(key: &str, reason: &str) -> EngineError {
    EngineError::ConfigInvalid {
        section: INDICATORS_SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
