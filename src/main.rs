//! # commodity-arima
//!
//! Command-line entry point: load a price table, fit the change model and
//! render every diagnostic and prediction chart.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use commodity_arima::analysis::PriceChangeArimaAnalyzer;
use commodity_arima::config::AnalyzerConfig;
use commodity_arima::data::load_csv;
use commodity_arima::models::ArimaOrder;
use commodity_arima::render::{ChartRenderer, JsonRenderer, TextRenderer};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "commodity-arima")]
#[command(about = "Fit ARIMA to daily commodity price changes", long_about = None)]
struct Cli {
    /// CSV with a date column, "daily change" and "Inflation Adjusted Price"
    #[arg(short, long)]
    input: PathBuf,

    /// YAML analyzer configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ARIMA order as p,d,q
    #[arg(long, value_parser = parse_order)]
    order: Option<ArimaOrder>,

    /// Hold out the most recent rows as a test set
    #[arg(long)]
    split: bool,

    /// Share of rows used for training with --split
    #[arg(long)]
    split_fraction: Option<f64>,

    /// Out-of-sample forecast horizon in days
    #[arg(long)]
    horizon_days: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Use one-step (static) in-sample predictions instead of dynamic ones
    #[arg(long = "static")]
    static_predictions: bool,
}

fn parse_order(value: &str) -> std::result::Result<ArimaOrder, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected p,d,q, got {value:?}"));
    }
    let mut numbers = [0usize; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid order component {part:?}: {e}"))?;
    }
    Ok(ArimaOrder::new(numbers[0], numbers[1], numbers[2]))
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "commodity_arima=info,warn".into()),
        )
        .init();
}

/// Attach the step name and error category to a library error.
fn step<T>(name: &str, result: commodity_arima::Result<T>) -> Result<T> {
    result.map_err(|err| {
        let category = err.category();
        anyhow::Error::new(err).context(format!("{name} failed ({category})"))
    })
}

fn build_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => step("loading configuration", AnalyzerConfig::from_yaml_file(path))
            .with_context(|| format!("config file {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    if let Some(order) = cli.order {
        config.order = order;
    }
    if cli.split {
        config.use_split = true;
    }
    if let Some(fraction) = cli.split_fraction {
        config.split_fraction = fraction;
    }
    if let Some(horizon) = cli.horizon_days {
        config.horizon_days = horizon;
    }
    if cli.static_predictions {
        config.dynamic = false;
    }
    Ok(config)
}

/// Writes non-chart results in the selected format.
fn emit<T: Serialize>(format: OutputFormat, label: &str, value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let mut document = serde_json::Map::new();
            document.insert(label.to_string(), serde_json::to_value(value)?);
            serde_json::to_writer(&mut out, &document)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "== {label} ==")?;
            writeln!(out, "{}", serde_yaml::to_string(value)?.trim_end())?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    let dataset = step("loading data", load_csv(&cli.input))
        .with_context(|| format!("input file {}", cli.input.display()))?;

    let mut renderer: Box<dyn ChartRenderer> = match cli.format {
        OutputFormat::Text => Box::new(TextRenderer::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonRenderer::new(io::stdout())),
    };

    let mut analyzer = PriceChangeArimaAnalyzer::new();
    let horizon = config.horizon_days;
    let dynamic = config.dynamic;
    step("configuring analyzer", analyzer.configure(dataset, config))?;
    if let Some(split) = analyzer.split() {
        info!(train = split.train_len(), test = split.test_len(), "using train/test split");
    }

    step("fitting model", analyzer.fit().map(|_| ()))?;
    emit(cli.format, "model", &step("summarising model", analyzer.summary())?)?;

    let (chart, stationarity) = step("diagnostic plot", analyzer.diagnostic_plot())?;
    step("rendering", renderer.render(&chart))?;
    emit(cli.format, "stationarity", &stationarity)?;

    let (chart, diagnostics) = step("residual plot", analyzer.residual_plot())?;
    step("rendering", renderer.render(&chart))?;
    emit(cli.format, "residuals", &diagnostics)?;

    let path = step("in-sample predictions", analyzer.in_sample_predictions(dynamic))?;
    let chart = step("in-sample plot", analyzer.plot_in_sample(&path))?;
    step("rendering", renderer.render(&chart))?;

    let forecast = step("out-of-sample predictions", analyzer.out_sample_predictions(horizon))?;
    let chart = step("out-of-sample plot", analyzer.plot_out_sample(&forecast))?;
    step("rendering", renderer.render(&chart))?;

    info!("analysis complete");
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    run(Cli::parse())
}
