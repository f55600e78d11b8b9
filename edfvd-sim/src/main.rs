/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use edfvd_sim::config::ScenarioConfig;
use edfvd_sim::memo::{InMemoryStore, YamlFileStore};
use edfvd_sim::report::{ReportSink, TracingReportSink};
use edfvd_sim::simulation::{Simulation, SimulationReport};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Run one partitioned EDF-VD scenario.
///
/// Example:
///   edfvd-sim --config scenario.yaml --seed 7 --memo memo.yaml --report
#[derive(Debug, Parser)]
#[command(
    name = "edfvd-sim",
    about = "Partitioned dual-criticality EDF-VD scheduling simulator",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML scenario file.  Defaults apply when omitted.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// RNG seed (overrides the scenario file).
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// YAML utilization memo store, created on first save.
    #[arg(short = 'm', long = "memo")]
    memo: Option<PathBuf>,

    /// Log the per-processor execution timeline.
    #[arg(short = 'r', long = "report", default_value_t = false)]
    report: bool,

    /// Write the full run report as YAML.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    #[arg(long = "tasks")]
    task_count: Option<usize>,

    #[arg(long = "utilization")]
    target_utilization: Option<f64>,

    #[arg(long = "processors")]
    processor_count: Option<usize>,

    #[arg(long = "aperiodic")]
    aperiodic_job_count: Option<usize>,

    #[arg(long = "overrun-probability")]
    overrun_probability: Option<f64>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut ScenarioConfig) {
        if let Some(v) = self.task_count {
            config.task_count = v;
        }
        if let Some(v) = self.target_utilization {
            config.target_utilization = v;
        }
        if let Some(v) = self.processor_count {
            config.processor_count = v;
        }
        if let Some(v) = self.aperiodic_job_count {
            config.aperiodic_job_count = v;
        }
        if let Some(v) = self.overrun_probability {
            config.overrun_probability = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ScenarioConfig::load_from_file(path)?,
        None => {
            warn!("No scenario file provided, using default parameters");
            ScenarioConfig::default()
        }
    };
    cli.apply_overrides(&mut config);

    info!(
        config = ?cli.config,
        memo = ?cli.memo,
        seed = ?config.seed,
        "edfvd-sim starting"
    );

    let seed = config.seed;
    let simulation = Simulation::new(config).context("Invalid scenario parameters")?;

    let report = match &cli.memo {
        Some(path) => {
            let mut store = YamlFileStore::open(path);
            let report = execute(&simulation, seed, &mut store);
            store.save()?;
            report?
        }
        None => execute(&simulation, seed, &mut InMemoryStore::new())?,
    };

    if cli.report {
        TracingReportSink.publish(&report);
    } else {
        TracingReportSink.summary(&report);
    }

    if let Some(path) = &cli.output {
        let yaml = serde_yaml::to_string(&report).context("Failed to serialise run report")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Cannot write report file: {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn execute<S>(simulation: &Simulation, seed: Option<u64>, store: &mut S) -> Result<SimulationReport>
where
    S: edfvd_sim::memo::UtilizationStore,
{
    let report = match seed {
        Some(seed) => simulation.run_seeded(seed, store)?,
        None => simulation.run(&mut StdRng::from_os_rng(), store)?,
    };
    Ok(report)
}
