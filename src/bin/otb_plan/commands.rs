use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use otb_engine::demand_forecast::{ForecastMethod, ObservationLoader, RunStatus};
use otb_engine::markdown_engine::{MarkdownPlan, Scenario, SkuSnapshot};
use otb_engine::replenishment::utils::load_category_snapshots;
use otb_engine::{EngineConfig, InventoryDecisionEngine};

use crate::cli::{CommonArgs, ForecastArgs, MarkdownArgs, MonitorArgs, SimulateArgs};

fn engine(common: &CommonArgs) -> Result<InventoryDecisionEngine> {
    let config = match &common.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(InventoryDecisionEngine::new(config)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(file, value)?;
            info!(path = %path.display(), "output written");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, value)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

pub fn forecast(args: ForecastArgs) -> Result<()> {
    let engine = engine(&args.common)?;
    let store = ObservationLoader::from_csv(&args.observations)
        .with_context(|| format!("failed to load {}", args.observations.display()))?;

    let method = ForecastMethod::from(args.method);
    let weights = match args.weights.as_slice() {
        [ma, es, trend] => Some((*ma, *es, *trend)),
        other => bail!("expected 3 ensemble weights, got {}", other.len()),
    };
    let config = engine.config().forecast.forecast_config(
        "otb-plan",
        method,
        args.lookback,
        args.horizon,
        weights,
    )?;

    let entities: Vec<String> = if args.entities.is_empty() {
        store.entity_ids().map(str::to_string).collect()
    } else {
        args.entities
    };

    let runs = engine.forecast(&config, &store, &entities)?;
    let failed = runs
        .iter()
        .filter(|run| run.status() == RunStatus::Failed)
        .count();
    info!(runs = runs.len(), failed, "forecasts finished");

    write_json(&runs, args.common.output.as_deref())
}

pub fn markdown(args: MarkdownArgs) -> Result<()> {
    let engine = engine(&args.common)?;
    let plan: MarkdownPlan = read_json(&args.plan)?;
    let skus: Vec<SkuSnapshot> = read_json(&args.skus)?;

    let result = engine.optimize(&plan, args.as_of, &skus)?;
    info!(
        skus = result.total_skus,
        revenue = result.summary.total_expected_revenue,
        "markdown recommendations ready"
    );

    write_json(&result, args.common.output.as_deref())
}

pub fn monitor(args: MonitorArgs) -> Result<()> {
    let engine = engine(&args.common)?;
    let snapshots = load_category_snapshots(&args.categories)
        .with_context(|| format!("failed to load {}", args.categories.display()))?;

    let report = engine.monitor(&snapshots)?;
    for alert in &report.alerts {
        info!("{}", alert);
    }

    write_json(&report, args.common.output.as_deref())
}

pub fn simulate(args: SimulateArgs) -> Result<()> {
    let engine = engine(&args.common)?;
    let plan: MarkdownPlan = read_json(&args.plan)?;
    let skus: Vec<SkuSnapshot> = read_json(&args.skus)?;
    let scenarios: Vec<Scenario> = read_json(&args.scenarios)?;

    let report = engine.what_if(&plan, args.as_of, &skus, &scenarios)?;
    write_json(&report, args.common.output.as_deref())
}
