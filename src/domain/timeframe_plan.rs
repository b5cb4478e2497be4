//! Analysis plan: which timeframes to analyze, how many rows of each, and
//! which of them also get the short-timeframe report.

use std::collections::HashSet;

use crate::domain::error::EngineError;
use crate::domain::settings::IndicatorSettings;
use crate::ports::config_port::ConfigPort;

pub const ANALYSIS_SECTION: &str = "analysis";

/// Minimum extra history fetched beyond the warmup, for short `last_n`.
pub const FETCH_MARGIN: usize = 10;

const TIMEFRAME_UNITS: [char; 5] = ['m', 'h', 'd', 'w', 'M'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("empty token in timeframe list")]
    EmptyToken,

    #[error("missing `:last_n` for timeframe {0}")]
    MissingLastN(String),

    #[error("invalid last_n `{value}` for timeframe {timeframe}")]
    InvalidLastN { timeframe: String, value: String },

    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("duplicate timeframe: {0}")]
    DuplicateTimeframe(String),

    #[error("scalping timeframe {0} is not in the timeframe list")]
    UnknownScalpingTimeframe(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeSpec {
    pub timeframe: String,
    pub last_n: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPlan {
    pub timeframes: Vec<TimeframeSpec>,
    pub scalping_timeframes: Vec<String>,
    pub include_candles: bool,
    pub settings: IndicatorSettings,
}

impl AnalysisPlan {
    /// A plan over `timeframes` with default settings, no scalping section
    /// and no candle records.
    pub fn new(timeframes: Vec<TimeframeSpec>) -> Self {
        Self {
            timeframes,
            scalping_timeframes: Vec::new(),
            include_candles: false,
            settings: IndicatorSettings::default(),
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EngineError> {
        let timeframes = config
            .get_string(ANALYSIS_SECTION, "timeframes")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| EngineError::ConfigMissing {
                section: ANALYSIS_SECTION.to_string(),
                key: "timeframes".to_string(),
            })?;
        let timeframes = parse_timeframes(&timeframes)?;

        let scalping_timeframes = match config.get_string(ANALYSIS_SECTION, "scalping_timeframes") {
            Some(list) if !list.trim().is_empty() => parse_scalping_timeframes(&list, &timeframes)?,
            _ => Vec::new(),
        };

        Ok(Self {
            timeframes,
            scalping_timeframes,
            include_candles: config
                .get_bool(ANALYSIS_SECTION, "include_candles")?
                .unwrap_or(false),
            settings: IndicatorSettings::from_config(config)?,
        })
    }

    pub fn wants_scalping(&self, timeframe: &str) -> bool {
        self.scalping_timeframes.iter().any(|tf| tf == timeframe)
    }

    /// Candles to request so that `last_n` complete rows survive the warmup.
    pub fn fetch_count(&self, last_n: usize) -> usize {
        let warmup = self.settings.warmup();
        (warmup + FETCH_MARGIN).max(last_n + warmup)
    }
}

/// Parse `"4h:100, 1h:150, 15m:200"` into timeframe specs, keeping order.
pub fn parse_timeframes(input: &str) -> Result<Vec<TimeframeSpec>, PlanError> {
    let mut specs = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PlanError::EmptyToken);
        }
        let (timeframe, last_n) = trimmed
            .split_once(':')
            .ok_or_else(|| PlanError::MissingLastN(trimmed.to_string()))?;
        let timeframe = parse_timeframe(timeframe.trim())?;
        let last_n = last_n
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| PlanError::InvalidLastN {
                timeframe: timeframe.clone(),
                value: last_n.trim().to_string(),
            })?;
        if !seen.insert(timeframe.clone()) {
            return Err(PlanError::DuplicateTimeframe(timeframe));
        }
        specs.push(TimeframeSpec { timeframe, last_n });
    }

    Ok(specs)
}

fn parse_scalping_timeframes(
    input: &str,
    timeframes: &[TimeframeSpec],
) -> Result<Vec<String>, PlanError> {
    let mut selected = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PlanError::EmptyToken);
        }
        let timeframe = parse_timeframe(trimmed)?;
        if !timeframes.iter().any(|spec| spec.timeframe == timeframe) {
            return Err(PlanError::UnknownScalpingTimeframe(timeframe));
        }
        if selected.contains(&timeframe) {
            return Err(PlanError::DuplicateTimeframe(timeframe));
        }
        selected.push(timeframe);
    }
    Ok(selected)
}

/// A positive count followed by a unit: `m`, `h`, `d`, `w` or `M` (month).
pub fn parse_timeframe(token: &str) -> Result<String, PlanError> {
    let invalid = || PlanError::InvalidTimeframe(token.to_string());
    let unit = token.chars().last().ok_or_else(invalid)?;
    if !TIMEFRAME_UNITS.contains(&unit) {
        return Err(invalid());
    }
    let count = &token[..token.len() - unit.len_utf8()];
    match count.parse::<u32>() {
        Ok(n) if n > 0 && count.chars().all(|c| c.is_ascii_digit()) => Ok(token.to_string()),
        _ => Err(invalid()),
    }
}

/// Filesystem-safe form of a symbol: `BTC/USDT` becomes `BTC-USDT`.
pub fn symbol_stem(symbol: &str) -> String {
    symbol.replace(['/', ':'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn spec(timeframe: &str, last_n: usize) -> TimeframeSpec {
        TimeframeSpec {
            timeframe: timeframe.to_string(),
            last_n,
        }
    }

    #[test]
    fn parses_in_order() {
        let specs = parse_timeframes("4h:100, 1h:150, 15m:200").unwrap();
        assert_eq!(specs, vec![spec("4h", 100), spec("1h", 150), spec("15m", 200)]);
    }

    #[test]
    fn single_timeframe() {
        assert_eq!(parse_timeframes("1d:30").unwrap(), vec![spec("1d", 30)]);
    }

    #[test]
    fn empty_token_fails() {
        assert_eq!(parse_timeframes("4h:100,,1h:50"), Err(PlanError::EmptyToken));
        assert_eq!(parse_timeframes(""), Err(PlanError::EmptyToken));
    }

    #[test]
    fn missing_last_n_fails() {
        assert_eq!(
            parse_timeframes("4h"),
            Err(PlanError::MissingLastN("4h".to_string()))
        );
    }

    #[test]
    fn zero_or_garbage_last_n_fails() {
        assert!(matches!(
            parse_timeframes("4h:0"),
            Err(PlanError::InvalidLastN { value, .. }) if value == "0"
        ));
        assert!(matches!(
            parse_timeframes("4h:lots"),
            Err(PlanError::InvalidLastN { .. })
        ));
    }

    #[test]
    fn duplicate_timeframe_fails() {
        assert_eq!(
            parse_timeframes("1h:10, 1h:20"),
            Err(PlanError::DuplicateTimeframe("1h".to_string()))
        );
    }

    #[test]
    fn timeframe_grammar() {
        for ok in ["1m", "15m", "4h", "1d", "1w", "1M"] {
            assert_eq!(parse_timeframe(ok).unwrap(), ok);
        }
        for bad in ["", "h", "0h", "4x", "-1h", "+1h", "1.5h", "4 h"] {
            assert!(parse_timeframe(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn fetch_count_covers_warmup() {
        let plan = AnalysisPlan::new(vec![spec("1h", 100)]);
        assert_eq!(plan.fetch_count(5), 210);
        assert_eq!(plan.fetch_count(100), 300);
    }

    #[test]
    fn plan_from_config() {
        let config = FileConfigAdapter::from_string(
            "[analysis]\ntimeframes = 4h:100, 15m:200\nscalping_timeframes = 15m\ninclude_candles = true\n",
        )
        .unwrap();
        let plan = AnalysisPlan::from_config(&config).unwrap();
        assert_eq!(plan.timeframes, vec![spec("4h", 100), spec("15m", 200)]);
        assert!(plan.wants_scalping("15m"));
        assert!(!plan.wants_scalping("4h"));
        assert!(plan.include_candles);
        assert_eq!(plan.settings, IndicatorSettings::default());
    }

    #[test]
    fn missing_timeframes_key_fails() {
        let config = FileConfigAdapter::from_string("[analysis]\nsymbol = BTC/USDT\n").unwrap();
        let err = AnalysisPlan::from_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::ConfigMissing { key, .. } if key == "timeframes"));
    }

    #[test]
    fn scalping_timeframe_must_be_planned() {
        let config = FileConfigAdapter::from_string(
            "[analysis]\ntimeframes = 4h:100\nscalping_timeframes = 5m\n",
        )
        .unwrap();
        let err = AnalysisPlan::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Plan(PlanError::UnknownScalpingTimeframe(tf)) if tf == "5m"
        ));
    }

    #[test]
    fn symbol_stem_replaces_separators() {
        assert_eq!(symbol_stem("BTC/USDT"), "BTC-USDT");
        assert_eq!(symbol_stem("BINANCE:ETH/USDT"), "BINANCE-ETH-USDT");
        assert_eq!(symbol_stem("SOL"), "SOL");
    }
}
