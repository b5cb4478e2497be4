//! CLI integration tests: real INI and CSV files on disk, through the
//! `analyze`, `candles` and `validate` commands.

mod common;

use chrono::SecondsFormat;
use clap::Parser;
use common::*;
use marketscope::cli::{self, Cli};
use marketscope::domain::error::EngineError;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

fn write_csv(dir: &Path, file_name: &str, candles: &[Candle]) {
    let mut writer = csv::Writer::from_path(dir.join(file_name)).unwrap();
    writer
        .write_record(["timestamp", "open", "high", "low", "close", "volume"])
        .unwrap();
    for c in candles {
        writer
            .write_record([
                c.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                c.open.to_string(),
                c.high.to_string(),
                c.low.to_string(),
                c.close.to_string(),
                c.volume.to_string(),
            ])
            .unwrap();
    }
    writer.flush().unwrap();
}

/// A workspace with candles for `BTC/USDT` at 4h and 15m and a config
/// pointing at it.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        write_csv(&data, "BTC-USDT_4h.csv", &wave_series(320));
        write_csv(&data, "BTC-USDT_15m.csv", &wave_series(420));
        Self { dir }
    }

    fn data_dir(&self) -> String {
        self.dir.path().join("data").display().to_string()
    }

    fn out_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("out")
    }

    fn write_config(&self, extra: &str) -> std::path::PathBuf {
        let content = format!(
            "[analysis]\n\
             symbol = BTC/USDT\n\
             timeframes = 4h:100, 15m:200\n\
             scalping_timeframes = 15m\n\
             include_candles = true\n\
             \n\
             [data]\n\
             directory = {}\n\
             \n\
             [output]\n\
             directory = {}\n\
             key = btc_report\n\
             {}",
            self.data_dir(),
            self.out_dir().display(),
            extra
        );
        let path = self.dir.path().join("run.ini");
        fs::write(&path, content).unwrap();
        path
    }
}

fn is_success(code: ExitCode) -> bool {
    format!("{:?}", code) == format!("{:?}", ExitCode::SUCCESS)
}

fn same_code(a: ExitCode, b: u8) -> bool {
    format!("{:?}", a) == format!("{:?}", ExitCode::from(b))
}

mod analyze {
    use super::*;

    #[test]
    fn writes_report_for_every_timeframe() {
        let ws = Workspace::new();
        let config = ws.write_config("");

        let path = cli::run_analyze(&config, None, None, start()).unwrap();
        assert_eq!(path, ws.out_dir().join("btc_report.json"));

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(report["symbol"], "BTC/USDT");
        let keys: Vec<&String> = report["timeframes"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["4h", "15m"]);
        assert!(report["timeframes"]["15m"]["scalping"].is_object());
        assert!(report["timeframes"]["4h"].get("scalping").is_none());
        assert_eq!(
            report["timeframes"]["4h"]["candles"].as_array().unwrap().len(),
            100
        );
    }

    #[test]
    fn overrides_symbol_and_output() {
        let ws = Workspace::new();
        write_csv(
            &ws.dir.path().join("data"),
            "ETH-USDT_4h.csv",
            &wave_series(320),
        );
        write_csv(
            &ws.dir.path().join("data"),
            "ETH-USDT_15m.csv",
            &wave_series(420),
        );
        let config = ws.write_config("");
        let elsewhere = ws.dir.path().join("elsewhere");

        let path = cli::run_analyze(&config, Some("ETH/USDT"), Some(&elsewhere), start()).unwrap();
        assert_eq!(path, elsewhere.join("btc_report.json"));
        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(report["symbol"], "ETH/USDT");
    }

    #[test]
    fn missing_candles_file_is_no_data() {
        let ws = Workspace::new();
        let config = ws.write_config("");
        let err = cli::run_analyze(&config, Some("DOGE/USDT"), None, start()).unwrap_err();
        assert!(matches!(err, EngineError::NoData { timeframe, .. } if timeframe == "4h"));
        assert!(!ws.out_dir().join("btc_report.json").exists());
    }

    #[test]
    fn exit_code_reflects_failure_kind() {
        let ws = Workspace::new();
        let config = ws.write_config("");
        let cli = Cli::try_parse_from([
            "marketscope",
            "analyze",
            "--config",
            config.to_str().unwrap(),
            "--symbol",
            "DOGE/USDT",
        ])
        .unwrap();
        assert!(same_code(cli::run(cli), 3));

        let cli = Cli::try_parse_from([
            "marketscope",
            "analyze",
            "--config",
            config.to_str().unwrap(),
        ])
        .unwrap();
        assert!(is_success(cli::run(cli)));
    }
}

mod candles {
    use super::*;

    #[test]
    fn returns_requested_number_of_records() {
        let ws = Workspace::new();
        let config = ws.write_config("");
        let records = cli::run_candles(&config, "15m", Some(25)).unwrap();
        assert_eq!(records.len(), 25);
        assert!(records.iter().all(|r| r.sma200.is_some() && r.rsi14.is_some()));
    }

    #[test]
    fn defaults_to_plan_last_n() {
        let ws = Workspace::new();
        let config = ws.write_config("");
        let records = cli::run_candles(&config, "4h", None).unwrap();
        assert_eq!(records.len(), 100);
    }

    #[test]
    fn rejects_malformed_timeframe() {
        let ws = Workspace::new();
        let config = ws.write_config("");
        let err = cli::run_candles(&config, "4hours", None).unwrap_err();
        assert!(matches!(err, EngineError::Plan(_)));
    }
}

mod validate {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let ws = Workspace::new();
        let config = ws.write_config("");
        assert!(cli::run_validate(&config).is_ok());
    }

    #[test]
    fn invalid_indicator_section_fails_with_config_code() {
        let ws = Workspace::new();
        let config = ws.write_config("\n[indicators]\nsma_short = 300\n");
        let err = cli::run_validate(&config).unwrap_err();
        assert!(matches!(err, EngineError::ConfigInvalid { key, .. } if key == "sma_long"));

        let cli = Cli::try_parse_from([
            "marketscope",
            "validate",
            "--config",
            config.to_str().unwrap(),
        ])
        .unwrap();
        assert!(same_code(cli::run(cli), 2));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = cli::run_validate(Path::new("/nonexistent/run.ini")).unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse { .. }));
    }
}
