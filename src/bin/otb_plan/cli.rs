use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use otb_engine::demand_forecast::ForecastMethod;

/// Open-to-buy planning tool.
#[derive(Parser)]
#[command(
    name = "otb-plan",
    version,
    about = "Demand forecasts, markdown recommendations and replenishment alerts"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Forecast weekly demand from an observation CSV.
    Forecast(ForecastArgs),
    /// Recommend markdown actions for SKUs under a plan.
    Markdown(MarkdownArgs),
    /// Check months of cover and raise replenishment alerts.
    Monitor(MonitorArgs),
    /// Compare what-if markdown scenarios against the baseline.
    Simulate(SimulateArgs),
}

/// Options shared by every subcommand.
#[derive(clap::Args)]
pub struct CommonArgs {
    /// Path to TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write JSON output here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    MovingAverage,
    ExponentialSmoothing,
    TrendAdjusted,
    Ensemble,
}

impl From<MethodArg> for ForecastMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::MovingAverage => ForecastMethod::MovingAverage,
            MethodArg::ExponentialSmoothing => ForecastMethod::ExponentialSmoothing,
            MethodArg::TrendAdjusted => ForecastMethod::TrendAdjusted,
            MethodArg::Ensemble => ForecastMethod::Ensemble,
        }
    }
}

/// Arguments for the `forecast` subcommand.
#[derive(clap::Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// CSV with header `entity_id,week,units_sold,stock_on_hand`.
    #[arg(long)]
    pub observations: PathBuf,

    /// Entities to forecast (repeatable); all entities when omitted.
    #[arg(short, long = "entity")]
    pub entities: Vec<String>,

    /// Forecasting method.
    #[arg(short, long, value_enum, default_value = "ensemble")]
    pub method: MethodArg,

    /// Weeks of history the models look at.
    #[arg(long, default_value_t = 8)]
    pub lookback: usize,

    /// Weeks to forecast.
    #[arg(long, default_value_t = 4)]
    pub horizon: usize,

    /// Ensemble weights as `moving_average,exp_smoothing,trend`.
    #[arg(long, value_delimiter = ',', default_values_t = [0.4, 0.3, 0.3])]
    pub weights: Vec<f64>,
}

/// Arguments for the `markdown` subcommand.
#[derive(clap::Args)]
pub struct MarkdownArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Markdown plan JSON.
    #[arg(long)]
    pub plan: PathBuf,

    /// JSON array of SKU snapshots.
    #[arg(long)]
    pub skus: PathBuf,

    /// Evaluation date (YYYY-MM-DD).
    #[arg(long)]
    pub as_of: NaiveDate,
}

/// Arguments for the `monitor` subcommand.
#[derive(clap::Args)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Category CSV with stock, rate and MOC thresholds.
    #[arg(long)]
    pub categories: PathBuf,
}

/// Arguments for the `simulate` subcommand.
#[derive(clap::Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Markdown plan JSON.
    #[arg(long)]
    pub plan: PathBuf,

    /// JSON array of SKU snapshots.
    #[arg(long)]
    pub skus: PathBuf,

    /// JSON array of scenarios.
    #[arg(long)]
    pub scenarios: PathBuf,

    /// Evaluation date (YYYY-MM-DD).
    #[arg(long)]
    pub as_of: NaiveDate,
}
