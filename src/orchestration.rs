//! Multi-timeframe analysis of one symbol, and publishing the result.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::enrich::{enrich_with, recent_candles, CandleRecord};
use crate::domain::error::EngineError;
use crate::domain::scalping::{enhanced_short_term_analysis, ShortTermReport};
use crate::domain::summary::{build_summary, SummaryTree};
use crate::domain::timeframe_plan::{symbol_stem, AnalysisPlan};
use crate::ports::candle_source::CandleSource;
use crate::ports::result_sink::ResultSink;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeReport {
    pub summary: SummaryTree,
    /// Present when the timeframe was asked for; `null` inside when there
    /// were too few rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalping: Option<Option<ShortTermReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candles: Option<Vec<CandleRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    #[serde(serialize_with = "as_rfc3339")]
    pub as_of_utc: DateTime<Utc>,
    /// Keyed by timeframe, in plan order.
    #[serde(serialize_with = "as_ordered_map")]
    pub timeframes: Vec<(String, TimeframeReport)>,
}

impl SymbolReport {
    pub fn timeframe(&self, timeframe: &str) -> Option<&TimeframeReport> {
        self.timeframes
            .iter()
            .find(|(tf, _)| tf == timeframe)
            .map(|(_, report)| report)
    }
}

fn as_rfc3339<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn as_ordered_map<S: Serializer>(
    entries: &[(String, TimeframeReport)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (timeframe, report) in entries {
        map.serialize_entry(timeframe, report)?;
    }
    map.end()
}

/// Fetch, enrich and summarize every timeframe of `plan`. The first failing
/// fetch aborts the run.
pub fn analyze_symbol(
    source: &dyn CandleSource,
    symbol: &str,
    plan: &AnalysisPlan,
    as_of: DateTime<Utc>,
) -> Result<SymbolReport, EngineError> {
    let mut timeframes = Vec::with_capacity(plan.timeframes.len());

    for spec in &plan.timeframes {
        let count = plan.fetch_count(spec.last_n);
        let table = source.fetch(symbol, &spec.timeframe, count)?;
        let enriched = enrich_with(table, &plan.settings)?;

        let complete = enriched.rows().iter().filter(|row| row.is_complete()).count();
        if complete < spec.last_n {
            warn!(
                symbol,
                timeframe = %spec.timeframe,
                complete,
                last_n = spec.last_n,
                "fewer complete rows than requested"
            );
        }

        let scalping = plan.wants_scalping(&spec.timeframe).then(|| {
            let report = enhanced_short_term_analysis(&enriched);
            if report.is_none() {
                warn!(
                    symbol,
                    timeframe = %spec.timeframe,
                    rows = enriched.len(),
                    "too few rows for short-term analysis"
                );
            }
            report
        });

        let report = TimeframeReport {
            summary: build_summary(&enriched, spec.last_n)?,
            scalping,
            candles: plan
                .include_candles
                .then(|| recent_candles(&enriched, spec.last_n)),
        };
        info!(
            symbol,
            timeframe = %spec.timeframe,
            rows = enriched.len(),
            complete,
            "analyzed timeframe"
        );
        timeframes.push((spec.timeframe.clone(), report));
    }

    Ok(SymbolReport {
        symbol: symbol.to_string(),
        as_of_utc: as_of,
        timeframes,
    })
}

pub fn publish(
    sink: &dyn ResultSink,
    key: &str,
    report: &SymbolReport,
) -> Result<(), EngineError> {
    let value = serde_json::to_value(report)?;
    sink.store(key, &value)?;
    info!(key, symbol = %report.symbol, "published report");
    Ok(())
}

/// Result key used when the config names none: `BTC/USDT` → `btc-usdt_analysis`.
pub fn default_result_key(symbol: &str) -> String {
    format!("{}_analysis", symbol_stem(symbol).to_lowercase())
}
