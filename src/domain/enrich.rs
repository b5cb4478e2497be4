//! Enrichment stage: a raw candle table in, one enriched row per candle out.

use chrono::SecondsFormat;
use serde::Serialize;
use tracing::debug;

use crate::domain::candle::{Candle, CandleTable, MIN_TABLE_ROWS};
use crate::domain::error::EngineError;
use crate::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_obv, calculate_rsi,
    calculate_sma, calculate_stoch_rsi, calculate_vwap, defined, Series,
};
use crate::domain::indicator_helpers::calc_atr;
use crate::domain::pattern::{classify_candle, CandlePattern};
use crate::domain::settings::IndicatorSettings;

/// A candle plus every derived column.
///
/// The moving-average fields are named after the default periods; with
/// overridden settings `sma50` holds the short period, `sma200` the long one.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedCandle {
    pub candle: Candle,
    pub sma50: Option<f64>,
    pub sma100: Option<f64>,
    pub sma200: Option<f64>,
    pub ema50: Option<f64>,
    pub ema100: Option<f64>,
    pub ema200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub atr14: Option<f64>,
    pub obv: Option<f64>,
    pub change_pct: Option<f64>,
    pub above_sma200: Option<bool>,
    pub above_ema200: Option<bool>,
    pub pattern: CandlePattern,
    // Short-timeframe columns. They never decide whether a row is complete.
    pub ema20: Option<f64>,
    pub vwap: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_percent_b: Option<f64>,
    pub bb_bandwidth: Option<f64>,
    pub stoch_rsi: Option<f64>,
}

impl AsRef<Candle> for EnrichedCandle {
    fn as_ref(&self) -> &Candle {
        &self.candle
    }
}

impl EnrichedCandle {
    /// Core numeric columns by name, in output order.
    pub fn core_fields(&self) -> [(&'static str, Option<f64>); 13] {
        [
            ("sma50", self.sma50),
            ("sma100", self.sma100),
            ("sma200", self.sma200),
            ("ema50", self.ema50),
            ("ema100", self.ema100),
            ("ema200", self.ema200),
            ("rsi14", self.rsi14),
            ("macd", self.macd),
            ("macd_signal", self.macd_signal),
            ("macd_hist", self.macd_hist),
            ("atr14", self.atr14),
            ("obv", self.obv),
            ("change_pct", self.change_pct),
        ]
    }

    pub fn auxiliary_fields(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("ema20", self.ema20),
            ("vwap", self.vwap),
            ("bb_middle", self.bb_middle),
            ("bb_upper", self.bb_upper),
            ("bb_lower", self.bb_lower),
            ("bb_percent_b", self.bb_percent_b),
            ("bb_bandwidth", self.bb_bandwidth),
            ("stoch_rsi", self.stoch_rsi),
        ]
    }

    /// Every core column is defined.
    pub fn is_complete(&self) -> bool {
        self.core_fields().iter().all(|(_, value)| value.is_some())
            && self.above_sma200.is_some()
            && self.above_ema200.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTable {
    rows: Vec<EnrichedCandle>,
}

impl EnrichedTable {
    pub fn rows(&self) -> &[EnrichedCandle] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with every core column defined, in order.
    pub fn complete_rows(&self) -> Vec<EnrichedCandle> {
        self.rows.iter().filter(|row| row.is_complete()).cloned().collect()
    }

    /// The trailing `n` rows, complete or not.
    pub fn tail(&self, n: usize) -> &[EnrichedCandle] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }
}

/// Enrich with the default indicator periods.
pub fn enrich(table: CandleTable) -> Result<EnrichedTable, EngineError> {
    enrich_with(table, &IndicatorSettings::default())
}

pub fn enrich_with(
    table: CandleTable,
    settings: &IndicatorSettings,
) -> Result<EnrichedTable, EngineError> {
    if table.len() < MIN_TABLE_ROWS {
        return Err(EngineError::InsufficientData {
            rows: table.len(),
            minimum: MIN_TABLE_ROWS,
        });
    }

    let closes = table.closes();
    let prices = defined(&closes);
    let [short, medium, long] = settings.ma_periods;

    let sma = [short, medium, long].map(|period| calculate_sma(&prices, period));
    let ema = [short, medium, long].map(|period| calculate_ema(&prices, period));
    let ema_short = calculate_ema(&prices, settings.ema_short_period);
    let rsi = calculate_rsi(&closes, settings.rsi_period);
    let macd = calculate_macd(
        &closes,
        settings.macd_fast,
        settings.macd_slow,
        settings.macd_signal,
    );
    let atr = calc_atr(table.candles(), settings.atr_period);
    let obv = calculate_obv(table.candles());
    let vwap = calculate_vwap(table.candles());
    let bands = calculate_bollinger(
        &closes,
        settings.bollinger_period,
        settings.bollinger_mult_x100,
    );
    let stoch = calculate_stoch_rsi(&rsi, settings.stoch_rsi_period);

    let rows: Vec<EnrichedCandle> = table
        .into_candles()
        .into_iter()
        .enumerate()
        .map(|(i, candle)| {
            let close = candle.close;
            EnrichedCandle {
                sma50: sma[0][i],
                sma100: sma[1][i],
                sma200: sma[2][i],
                ema50: ema[0][i],
                ema100: ema[1][i],
                ema200: ema[2][i],
                rsi14: rsi[i],
                macd: macd.line[i],
                macd_signal: macd.signal[i],
                macd_hist: macd.histogram[i],
                atr14: atr[i],
                obv: obv[i],
                change_pct: candle.change_pct(),
                above_sma200: above(close, &sma[2], i),
                above_ema200: above(close, &ema[2], i),
                pattern: classify_candle(&candle),
                ema20: ema_short[i],
                vwap: vwap[i],
                bb_middle: bands.middle[i],
                bb_upper: bands.upper[i],
                bb_lower: bands.lower[i],
                bb_percent_b: bands.percent_b[i],
                bb_bandwidth: bands.bandwidth[i],
                stoch_rsi: stoch[i],
                candle,
            }
        })
        .collect();

    debug!(
        rows = rows.len(),
        complete = rows.iter().filter(|row| row.is_complete()).count(),
        "enriched candle table"
    );

    Ok(EnrichedTable { rows })
}

fn above(close: f64, average: &Series, index: usize) -> Option<bool> {
    average[index].map(|value| close > value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendFlags {
    pub above_sma200: Option<bool>,
    pub above_ema200: Option<bool>,
}

/// Per-candle output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleRecord {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub sma50: Option<f64>,
    pub sma100: Option<f64>,
    pub sma200: Option<f64>,
    pub ema50: Option<f64>,
    pub ema100: Option<f64>,
    pub ema200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub atr14: Option<f64>,
    pub obv: Option<f64>,
    pub change_pct: Option<f64>,
    pub trend_flags: TrendFlags,
    pub pattern: CandlePattern,
}

impl From<&EnrichedCandle> for CandleRecord {
    fn from(row: &EnrichedCandle) -> Self {
        let candle = &row.candle;
        Self {
            timestamp: candle.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            sma50: row.sma50,
            sma100: row.sma100,
            sma200: row.sma200,
            ema50: row.ema50,
            ema100: row.ema100,
            ema200: row.ema200,
            rsi14: row.rsi14,
            macd: row.macd,
            macd_signal: row.macd_signal,
            macd_hist: row.macd_hist,
            atr14: row.atr14,
            obv: row.obv,
            change_pct: row.change_pct,
            trend_flags: TrendFlags {
                above_sma200: row.above_sma200,
                above_ema200: row.above_ema200,
            },
            pattern: row.pattern,
        }
    }
}

/// Records for the last `last_n` complete rows.
pub fn recent_candles(table: &EnrichedTable, last_n: usize) -> Vec<CandleRecord> {
    let complete = table.complete_rows();
    complete[complete.len().saturating_sub(last_n)..]
        .iter()
        .map(CandleRecord::from)
        .collect()
}
