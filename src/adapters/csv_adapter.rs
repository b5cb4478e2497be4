//! CSV file candle source: one file per symbol and timeframe.

use crate::domain::candle::{Candle, CandleTable};
use crate::domain::error::EngineError;
use crate::domain::timeframe_plan::symbol_stem;
use crate::ports::candle_source::CandleSource;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

pub struct CsvCandleSource {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl CsvCandleSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `BTC/USDT` at `1h` lives in `BTC-USDT_1h.csv`.
    pub fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol_stem(symbol), timeframe))
    }
}

impl CandleSource for CsvCandleSource {
    fn fetch(
        &self,
        symbol: &str,
        timeframe: &str,
        count: usize,
    ) -> Result<CandleTable, EngineError> {
        let path = self.csv_path(symbol, timeframe);
        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => EngineError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            },
            _ => EngineError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let mut candles = Vec::new();

        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| EngineError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            candles.push(to_candle(row).map_err(|reason| EngineError::DataSource {
                reason: format!("{} data row {}: {}", path.display(), line + 1, reason),
            })?);
        }

        if candles.is_empty() {
            return Err(EngineError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            });
        }

        candles.sort_by_key(|c| c.timestamp);
        let skip = candles.len().saturating_sub(count);
        let candles = candles.split_off(skip);

        info!(
            symbol,
            timeframe,
            rows = candles.len(),
            requested = count,
            path = %path.display(),
            "loaded candles"
        );
        CandleTable::new(candles)
    }
}

fn to_candle(row: CsvRow) -> Result<Candle, String> {
    let timestamp = parse_timestamp(&row.timestamp)?;
    for (name, value) in [
        ("open", row.open),
        ("high", row.high),
        ("low", row.low),
        ("close", row.close),
        ("volume", row.volume),
    ] {
        if !value.is_finite() {
            return Err(format!("{} is not finite", name));
        }
    }
    if row.volume < 0.0 {
        return Err("volume is negative".to_string());
    }
    Ok(Candle {
        timestamp,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        volume: row.volume,
    })
}

/// RFC 3339, or integer milliseconds since the Unix epoch.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(millis) = value.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| format!("epoch milliseconds out of range: {}", value));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp {:?}: {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "timestamp,open,high,low,close,volume\n";

    fn setup_test_data() -> (TempDir, CsvCandleSource) {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{HEADER}\
            2024-01-15T00:00:00Z,100.0,110.0,90.0,105.0,50000\n\
            2024-01-15T01:00:00Z,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15T02:00:00Z,110.0,120.0,105.0,115.0,55000\n"
        );
        fs::write(dir.path().join("BTC-USDT_1h.csv"), content).unwrap();
        fs::write(dir.path().join("EMPTY_1h.csv"), HEADER).unwrap();
        let source = CsvCandleSource::new(dir.path().to_path_buf());
        (dir, source)
    }

    #[test]
    fn symbol_separators_become_dashes() {
        let source = CsvCandleSource::new(PathBuf::from("/data"));
        assert_eq!(
            source.csv_path("BTC/USDT:USDT", "15m"),
            PathBuf::from("/data/BTC-USDT-USDT_15m.csv")
        );
    }

    #[test]
    fn fetch_returns_candles_in_order() {
        let (_dir, source) = setup_test_data();
        let table = source.fetch("BTC/USDT", "1h", 10).unwrap();
        assert_eq!(table.len(), 3);
        let first = table.get(0).unwrap();
        assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.volume, 50000.0);
    }

    #[test]
    fn fetch_keeps_most_recent_rows() {
        let (_dir, source) = setup_test_data();
        let table = source.fetch("BTC/USDT", "1h", 2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.candles()[0].close, 110.0);
        assert_eq!(table.last().unwrap().close, 115.0);
    }

    #[test]
    fn out_of_order_rows_are_sorted() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{HEADER}1704070800000,2,3,1,2,10\n1704067200000,1,2,0.5,1.5,10\n"
        );
        fs::write(dir.path().join("ETH_4h.csv"), content).unwrap();
        let source = CsvCandleSource::new(dir.path().to_path_buf());
        let table = source.fetch("ETH", "4h", 10).unwrap();
        assert_eq!(table.candles()[0].close, 1.5);
        assert_eq!(
            table.candles()[1].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn duplicate_timestamps_are_rejected() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{HEADER}2024-01-01T00:00:00Z,1,2,0.5,1,10\n2024-01-01T00:00:00Z,1,2,0.5,1,10\n"
        );
        fs::write(dir.path().join("ETH_1d.csv"), content).unwrap();
        let source = CsvCandleSource::new(dir.path().to_path_buf());
        let err = source.fetch("ETH", "1d", 10).unwrap_err();
        assert!(matches!(err, EngineError::UnorderedTimestamps { index: 1 }));
    }

    #[test]
    fn missing_file_is_no_data() {
        let (_dir, source) = setup_test_data();
        let err = source.fetch("XYZ", "1h", 10).unwrap_err();
        assert!(matches!(err, EngineError::NoData { symbol, .. } if symbol == "XYZ"));
    }

    #[test]
    fn header_only_file_is_no_data() {
        let (_dir, source) = setup_test_data();
        let err = source.fetch("EMPTY", "1h", 10).unwrap_err();
        assert!(matches!(err, EngineError::NoData { .. }));
    }

    #[test]
    fn bad_row_is_a_source_error() {
        let dir = TempDir::new().unwrap();
        let content = format!("{HEADER}yesterday,1,2,0.5,1,10\n");
        fs::write(dir.path().join("ETH_1h.csv"), content).unwrap();
        let source = CsvCandleSource::new(dir.path().to_path_buf());
        let err = source.fetch("ETH", "1h", 10).unwrap_err();
        assert!(matches!(err, EngineError::DataSource { reason } if reason.contains("row 1")));
    }

    #[test]
    fn parses_both_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T02:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("1704067200000").unwrap(), expected);
        assert!(parse_timestamp("2024-01-01").is_err());
    }
}
