//! CLI definition and dispatch.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvCandleSource;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_sink_adapter::JsonFileSink;
use crate::domain::config_validation::{
    require, validate_analysis_config, validate_candles_config, DATA_SECTION, OUTPUT_SECTION,
};
use crate::domain::enrich::{enrich_with, recent_candles, CandleRecord};
use crate::domain::error::EngineError;
use crate::domain::timeframe_plan::{parse_timeframe, AnalysisPlan, ANALYSIS_SECTION};
use crate::orchestration::{analyze_symbol, default_result_key, publish};
use crate::ports::candle_source::CandleSource;
use crate::ports::config_port::ConfigPort;

/// Rows printed by `candles` when neither the flag nor the plan gives a count.
pub const DEFAULT_CANDLES_LAST_N: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "marketscope", about = "Multi-timeframe candle feature extraction")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze every configured timeframe and write the JSON report
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [analysis] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Overrides [output] directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print enriched candle records for one timeframe as JSON
    Candles {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        timeframe: String,
        #[arg(long)]
        last_n: Option<usize>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            config,
            symbol,
            output,
        } => run_analyze(&config, symbol.as_deref(), output.as_deref(), Utc::now()).map(|path| {
            eprintln!("Report written to {}", path.display());
        }),
        Command::Candles {
            config,
            timeframe,
            last_n,
        } => run_candles(&config, &timeframe, last_n).and_then(|records| {
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, EngineError> {
    let config = FileConfigAdapter::from_file(path)?;
    info!(source = config.source(), "loaded config");
    Ok(config)
}

/// Load, validate, analyze and publish. Returns the written report path.
pub fn run_analyze(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_override: Option<&Path>,
    as_of: DateTime<Utc>,
) -> Result<PathBuf, EngineError> {
    let config = load_config(config_path)?;
    match output_override {
        Some(_) => validate_candles_config(&config)?,
        None => validate_analysis_config(&config)?,
    }

    let plan = AnalysisPlan::from_config(&config)?;
    let symbol = resolve_symbol(&config, symbol_override)?;
    let source = csv_source(&config)?;
    let output_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from(require(&config, OUTPUT_SECTION, "directory")?),
    };
    let key = resolve_key(&config, &symbol);

    info!(
        symbol = %symbol,
        timeframes = plan.timeframes.len(),
        scalping = plan.scalping_timeframes.len(),
        "starting analysis"
    );
    let report = analyze_symbol(&source, &symbol, &plan, as_of)?;

    let sink = JsonFileSink::new(output_dir);
    publish(&sink, &key, &report)?;
    Ok(sink.path_for(&key))
}

/// Enriched candle records for `timeframe`, using the config's symbol, data
/// directory and indicator settings.
pub fn run_candles(
    config_path: &Path,
    timeframe: &str,
    last_n: Option<usize>,
) -> Result<Vec<CandleRecord>, EngineError> {
    let config = load_config(config_path)?;
    validate_candles_config(&config)?;
    let timeframe = parse_timeframe(timeframe)?;

    let plan = AnalysisPlan::from_config(&config)?;
    let last_n = last_n
        .or_else(|| {
            plan.timeframes
                .iter()
                .find(|spec| spec.timeframe == timeframe)
                .map(|spec| spec.last_n)
        })
        .unwrap_or(DEFAULT_CANDLES_LAST_N);
    let symbol = resolve_symbol(&config, None)?;
    let source = csv_source(&config)?;

    let table = source.fetch(&symbol, &timeframe, plan.fetch_count(last_n))?;
    let enriched = enrich_with(table, &plan.settings)?;
    let records = recent_candles(&enriched, last_n);
    info!(symbol = %symbol, timeframe = %timeframe, records = records.len(), "enriched candles");
    Ok(records)
}

pub fn run_validate(config_path: &Path) -> Result<(), EngineError> {
    let config = load_config(config_path)?;
    validate_analysis_config(&config)?;

    let plan = AnalysisPlan::from_config(&config)?;
    let symbol = resolve_symbol(&config, None)?;
    eprintln!("Symbol: {}", symbol);
    for spec in &plan.timeframes {
        let scalping = if plan.wants_scalping(&spec.timeframe) {
            " + scalping"
        } else {
            ""
        };
        eprintln!(
            "  {:>4}  last {} rows, fetch {}{}",
            spec.timeframe,
            spec.last_n,
            plan.fetch_count(spec.last_n),
            scalping
        );
    }
    eprintln!("Config is valid");
    Ok(())
}

pub fn resolve_symbol(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<String, EngineError> {
    match symbol_override.map(str::trim) {
        Some(symbol) if !symbol.is_empty() => Ok(symbol.to_string()),
        _ => require(config, ANALYSIS_SECTION, "symbol"),
    }
}

/// `[output] key`, or a key derived from the symbol.
pub fn resolve_key(config: &dyn ConfigPort, symbol: &str) -> String {
    config
        .get_string(OUTPUT_SECTION, "key")
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| default_result_key(symbol))
}

fn csv_source(config: &dyn ConfigPort) -> Result<CsvCandleSource, EngineError> {
    let directory = require(config, DATA_SECTION, "directory")?;
    Ok(CsvCandleSource::new(PathBuf::from(directory)))
}
