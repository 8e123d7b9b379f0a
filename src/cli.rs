//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::cached_data_port::CachedDataPort;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::chart::ChartData;
use crate::domain::config_validation::{
    validate_chart_config, validate_data_config, validate_screen_config,
};
use crate::domain::date_range::{DateRange, DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};
use crate::domain::error::ScreenerError;
use crate::domain::price_series::PriceSeries;
use crate::domain::resample::Period;
use crate::domain::screening::ScreenCriteria;
use crate::domain::settings::{DataSettings, SourceKind};
use crate::domain::universe::{parse_codes, screen_with_port, ScreenReport};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, PriceDataset};
use crate::ports::report_port::ReportPort;

const DEFAULT_RETRIES: i64 = 2;

#[derive(Parser, Debug)]
#[command(name = "twscreener", about = "Taiwan stock chart data and screening")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen a universe of codes
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated codes, overrides [universe] codes
        #[arg(long)]
        codes: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Emit daily, weekly or monthly bars with moving averages
    Chart {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(long)]
        period: Option<Period>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    match cli.command {
        Command::Screen {
            config,
            codes,
            output,
        } => run_screen(&config, codes.as_deref(), output),
        Command::Chart {
            config,
            code,
            period,
            output,
        } => run_chart(&config, &code, period, output),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ScreenerError> {
    FileConfigAdapter::from_file(path).map_err(|e| ScreenerError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn report_failure(err: ScreenerError) -> ExitCode {
    error!("{err}");
    ExitCode::from(&err)
}

fn run_screen(config_path: &PathBuf, codes_override: Option<&str>, output: Option<PathBuf>) -> ExitCode {
    match screen_command(config_path, codes_override, output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report_failure(e),
    }
}

fn screen_command(
    config_path: &PathBuf,
    codes_override: Option<&str>,
    output: Option<PathBuf>,
) -> Result<ScreenReport, ScreenerError> {
    info!(path = %config_path.display(), "loading config");
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    validate_screen_config(&config)?;

    let settings = build_data_settings(&config, Local::now().date_naive())?;
    let criteria = build_screen_criteria(&config)?;
    let codes = resolve_codes(codes_override, &config)?;
    let data_port = build_data_port(&settings)?;
    let report = CsvReportAdapter::new(output);

    run_screen_pipeline(data_port.as_ref(), &codes, &settings, &criteria, &report)
}

fn run_chart(
    config_path: &PathBuf,
    code: &str,
    period: Option<Period>,
    output: Option<PathBuf>,
) -> ExitCode {
    match chart_command(config_path, code, period, output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report_failure(e),
    }
}

fn chart_command(
    config_path: &PathBuf,
    code: &str,
    period: Option<Period>,
    output: Option<PathBuf>,
) -> Result<ChartData, ScreenerError> {
    info!(path = %config_path.display(), "loading config");
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    validate_chart_config(&config)?;

    let settings = build_data_settings(&config, Local::now().date_naive())?;
    let period = match period {
        Some(p) => p,
        None => resolve_period(&config)?,
    };
    let data_port = build_data_port(&settings)?;
    let report = CsvReportAdapter::new(output);

    run_chart_pipeline(data_port.as_ref(), &code.to_uppercase(), &settings, period, &report)
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let result = load_config(config_path).and_then(|config| {
        validate_data_config(&config)?;
        validate_screen_config(&config)?;
        validate_chart_config(&config)?;
        Ok(())
    });

    match result {
        Ok(()) => {
            println!("Configuration is valid: {}", config_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(e),
    }
}

pub fn build_screen_criteria(config: &dyn ConfigPort) -> Result<ScreenCriteria, ScreenerError> {
    let days = config.get_int("screen", "min_foreign_buy_days", 0);
    let min_foreign_buy_days =
        usize::try_from(days).map_err(|_| ScreenerError::ConfigInvalid {
            section: "screen".into(),
            key: "min_foreign_buy_days".into(),
            reason: "min_foreign_buy_days must be non-negative".into(),
        })?;

    Ok(ScreenCriteria {
        ma20_up: config.get_bool("screen", "ma20_up", false),
        ma100_up: config.get_bool("screen", "ma100_up", false),
        min_foreign_buy_days,
        min_volume_ratio: config.get_double("screen", "min_volume_ratio", 0.0),
    })
}

pub fn build_data_settings(
    config: &dyn ConfigPort,
    today: NaiveDate,
) -> Result<DataSettings, ScreenerError> {
    let source = match config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string())
        .to_lowercase()
        .as_str()
    {
        "csv" => SourceKind::Csv {
            dir: PathBuf::from(
                config
                    .get_string("data", "csv_dir")
                    .unwrap_or_else(|| "data".to_string()),
            ),
        },
        "finmind" => SourceKind::FinMind {
            token: config.get_string("data", "token").ok_or_else(|| {
                ScreenerError::ConfigMissing {
                    section: "data".into(),
                    key: "token".into(),
                }
            })?,
        },
        other => {
            return Err(ScreenerError::ConfigInvalid {
                section: "data".into(),
                key: "source".into(),
                reason: format!("unknown source '{other}'"),
            });
        }
    };

    let dataset = match config.get_string("data", "dataset") {
        Some(v) => v.parse::<PriceDataset>().map_err(|reason| ScreenerError::ConfigInvalid {
            section: "data".into(),
            key: "dataset".into(),
            reason,
        })?,
        None => PriceDataset::default(),
    };

    let end = match config.get_string("data", "end_date") {
        Some(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| {
            ScreenerError::ConfigInvalid {
                section: "data".into(),
                key: "end_date".into(),
                reason: "invalid date format (expected YYYY-MM-DD)".into(),
            }
        })?,
        None => today,
    };
    let lookback = config.get_int("data", "lookback_days", DEFAULT_LOOKBACK_DAYS);
    let range = (1..=MAX_LOOKBACK_DAYS)
        .contains(&lookback)
        .then(|| DateRange::trailing(end, lookback))
        .flatten()
        .ok_or_else(|| ScreenerError::ConfigInvalid {
            section: "data".into(),
            key: "lookback_days".into(),
            reason: format!("lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}"),
        })?;
    let retries = config.get_int("data", "retries", DEFAULT_RETRIES);

    Ok(DataSettings {
        source,
        dataset,
        range,
        retries: u32::try_from(retries).unwrap_or(0),
    })
}

pub fn resolve_codes(
    codes_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, ScreenerError> {
    let raw = match codes_override {
        Some(c) => c.to_string(),
        None => config
            .get_string("universe", "codes")
            .ok_or_else(|| ScreenerError::ConfigMissing {
                section: "universe".into(),
                key: "codes".into(),
            })?,
    };
    parse_codes(&raw).map_err(|e| ScreenerError::ConfigInvalid {
        section: "universe".into(),
        key: "codes".into(),
        reason: e.to_string(),
    })
}

pub fn resolve_period(config: &dyn ConfigPort) -> Result<Period, ScreenerError> {
    match config.get_string("chart", "period") {
        Some(v) => v.parse::<Period>().map_err(|reason| ScreenerError::ConfigInvalid {
            section: "chart".into(),
            key: "period".into(),
            reason,
        }),
        None => Ok(Period::Day),
    }
}

pub fn build_data_port(settings: &DataSettings) -> Result<Box<dyn DataPort>, ScreenerError> {
    match &settings.source {
        SourceKind::Csv { dir } => Ok(Box::new(CachedDataPort::new(
            CsvAdapter::new(dir.clone()),
            settings.retries,
        ))),
        #[cfg(feature = "finmind")]
        SourceKind::FinMind { token } => {
            use crate::adapters::finmind::FinMindAdapter;
            Ok(Box::new(CachedDataPort::new(
                FinMindAdapter::new(token.clone())?,
                settings.retries,
            )))
        }
        #[cfg(not(feature = "finmind"))]
        SourceKind::FinMind { .. } => Err(ScreenerError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "built without the finmind feature".into(),
        }),
    }
}

pub fn run_screen_pipeline(
    data_port: &dyn DataPort,
    codes: &[String],
    settings: &DataSettings,
    criteria: &ScreenCriteria,
    report: &dyn ReportPort,
) -> Result<ScreenReport, ScreenerError> {
    let result = screen_with_port(data_port, codes, settings.dataset, settings.range, criteria);
    report.write_screen(&result.results)?;
    Ok(result)
}

pub fn run_chart_pipeline(
    data_port: &dyn DataPort,
    code: &str,
    settings: &DataSettings,
    period: Period,
    report: &dyn ReportPort,
) -> Result<ChartData, ScreenerError> {
    let bars = data_port.fetch_price_history(
        code,
        settings.dataset,
        settings.range.start,
        settings.range.end,
    )?;
    let series = PriceSeries::new(code, bars)?;
    info!(code, bars = series.len(), %period, "building chart");

    let chart = ChartData::build(&series, period)?;
    report.write_chart(&chart)?;
    Ok(chart)
}
