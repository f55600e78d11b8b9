/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

mod config;
mod sweep;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use edfvd_sim::memo::{InMemoryStore, YamlFileStore};

use config::SweepConfig;
use sweep::{run_sweep, PointSummary};

/// Parameter sweep over the EDF-VD scheduling simulator.
///
/// Example:
///   edfvd-sweep --config sweep.yaml --memo memo.yaml --output results.yaml
#[derive(Debug, Parser)]
#[command(
    name = "edfvd-sweep",
    about = "Parameter sweep driver for the EDF-VD scheduling simulator",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML sweep file.  Defaults apply when omitted.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// YAML utilization memo store shared by every run.
    #[arg(short = 'm', long = "memo")]
    memo: Option<PathBuf>,

    /// Write the aggregated table as YAML.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() {
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
    let config = match &cli.config {
        Some(path) => SweepConfig::load_from_file(path)?,
        None => {
            warn!("No sweep file provided, using the default grid");
            let config = SweepConfig::default();
            config.validate().context("Invalid default sweep")?;
            config
        }
    };

    let summaries = match &cli.memo {
        Some(path) => {
            let mut store = YamlFileStore::open(path);
            let summaries = run_sweep(&config, &mut store);
            store.save()?;
            summaries?
        }
        None => run_sweep(&config, &mut InMemoryStore::new())?,
    };

    print_table(&summaries);

    if let Some(path) = &cli.output {
        let yaml = serde_yaml::to_string(&summaries).context("Failed to serialise sweep results")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Cannot write results file: {}", path.display()))?;
        info!("Results written to {}", path.display());
    }
    Ok(())
}

fn print_table(summaries: &[PointSummary]) {
    info!(
        "{:>4} {:>6} {:>6} {:>8} {:>6} {:>8} {:>8} {:>8}",
        "m", "u/m", "aper", "p_ovr", "sched", "qos", "drops", "misses"
    );
    for s in summaries {
        let qos = s
            .mean_qos
            .map_or_else(|| "-".to_string(), |q| format!("{q:.2}"));
        info!(
            "{:>4} {:>6.2} {:>6} {:>8.2} {:>6.2} {:>8} {:>8.2} {:>8.2}",
            s.point.processor_count,
            s.point.utilization_per_processor,
            s.point.aperiodic_job_count,
            s.point.overrun_probability,
            s.schedulable_fraction,
            qos,
            s.mean_dropped,
            s.mean_deadline_misses,
        );
    }
}
