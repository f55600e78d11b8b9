/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Sweep configuration: a grid of scenario parameters.
//!
//! ```yaml
//! repetitions: 20
//! base_seed: 1
//! tasks_per_processor: 3
//! processor_counts: [2, 4, 8]
//! utilizations_per_processor: [0.5, 0.7, 0.9]
//! aperiodic_job_counts: [10, 40]
//! overrun_probabilities: [0.0, 0.2, 0.5]
//! base:
//!   periods: [10, 20, 30, 40, 50]
//! ```
//!
//! Each grid point fixes `processor_count`, `task_count =
//! tasks_per_processor * processor_count` and `target_utilization =
//! utilization_per_processor * processor_count`; every other scenario field
//! comes from `base`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use edfvd_sim::config::{ConfigError, ScenarioConfig};

#[derive(Debug, Error, PartialEq)]
pub enum SweepConfigError {
    #[error("{0} must not be empty")]
    EmptyAxis(&'static str),

    #[error("repetitions must be at least 1")]
    NoRepetitions,

    #[error("tasks_per_processor must be at least 1")]
    NoTasksPerProcessor,

    #[error("grid point {point}: {source}")]
    InvalidPoint {
        point: String,
        #[source]
        source: ConfigError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,

    #[serde(default)]
    pub base_seed: u64,

    #[serde(default = "default_tasks_per_processor")]
    pub tasks_per_processor: usize,

    #[serde(default = "default_processor_counts")]
    pub processor_counts: Vec<usize>,

    #[serde(default = "default_utilizations")]
    pub utilizations_per_processor: Vec<f64>,

    #[serde(default = "default_aperiodic_job_counts")]
    pub aperiodic_job_counts: Vec<usize>,

    #[serde(default = "default_overrun_probabilities")]
    pub overrun_probabilities: Vec<f64>,

    /// Scenario fields shared by every grid point.
    #[serde(default)]
    pub base: ScenarioConfig,
}

fn default_repetitions() -> u32 {
    10
}
fn default_tasks_per_processor() -> usize {
    3
}
fn default_processor_counts() -> Vec<usize> {
    vec![2, 4]
}
fn default_utilizations() -> Vec<f64> {
    vec![0.5, 0.7, 0.9]
}
fn default_aperiodic_job_counts() -> Vec<usize> {
    vec![20]
}
fn default_overrun_probabilities() -> Vec<f64> {
    vec![0.0, 0.2]
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            repetitions: default_repetitions(),
            base_seed: 0,
            tasks_per_processor: default_tasks_per_processor(),
            processor_counts: default_processor_counts(),
            utilizations_per_processor: default_utilizations(),
            aperiodic_job_counts: default_aperiodic_job_counts(),
            overrun_probabilities: default_overrun_probabilities(),
            base: ScenarioConfig::default(),
        }
    }
}

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPoint {
    pub processor_count: usize,
    pub utilization_per_processor: f64,
    pub aperiodic_job_count: usize,
    pub overrun_probability: f64,
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "m={} u={} aperiodic={} p_overrun={}",
            self.processor_count,
            self.utilization_per_processor,
            self.aperiodic_job_count,
            self.overrun_probability
        )
    }
}

impl SweepConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading sweep configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open sweep file: {}", path.display()))?;
        let config: SweepConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid sweep in {}", path.display()))?;

        debug!(points = config.grid().len(), "sweep loaded");
        Ok(config)
    }

    /// Grid points in nesting order: processors, utilization, aperiodic
    /// count, overrun probability.
    pub fn grid(&self) -> Vec<GridPoint> {
        let mut points = Vec::new();
        for &processor_count in &self.processor_counts {
            for &utilization_per_processor in &self.utilizations_per_processor {
                for &aperiodic_job_count in &self.aperiodic_job_counts {
                    for &overrun_probability in &self.overrun_probabilities {
                        points.push(GridPoint {
                            processor_count,
                            utilization_per_processor,
                            aperiodic_job_count,
                            overrun_probability,
                        });
                    }
                }
            }
        }
        points
    }

    /// Scenario parameters for `point`.
    pub fn scenario(&self, point: &GridPoint) -> ScenarioConfig {
        ScenarioConfig {
            task_count: self.tasks_per_processor * point.processor_count,
            target_utilization: point.utilization_per_processor * point.processor_count as f64,
            processor_count: point.processor_count,
            aperiodic_job_count: point.aperiodic_job_count,
            overrun_probability: point.overrun_probability,
            seed: None,
            ..self.base.clone()
        }
    }

    pub fn validate(&self) -> Result<(), SweepConfigError> {
        if self.repetitions == 0 {
            return Err(SweepConfigError::NoRepetitions);
        }
        if self.tasks_per_processor == 0 {
            return Err(SweepConfigError::NoTasksPerProcessor);
        }
        let axes = [
            ("processor_counts", self.processor_counts.is_empty()),
            ("utilizations_per_processor", self.utilizations_per_processor.is_empty()),
            ("aperiodic_job_counts", self.aperiodic_job_counts.is_empty()),
            ("overrun_probabilities", self.overrun_probabilities.is_empty()),
        ];
        for (name, empty) in axes {
            if empty {
                return Err(SweepConfigError::EmptyAxis(name));
            }
        }
        for point in self.grid() {
            self.scenario(&point)
                .validate()
                .map_err(|source| SweepConfigError::InvalidPoint {
                    point: point.to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
