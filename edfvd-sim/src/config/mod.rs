/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Scenario configuration loading and validation.
//!
//! The expected YAML structure is (every field optional):
//! ```yaml
//! task_count: 12
//! target_utilization: 2.0
//! processor_count: 4
//! aperiodic_job_count: 40
//! overrun_probability: 0.2
//! overrun_factor: 2.0
//! high_criticality_probability: 0.5
//! periods: [10, 20, 30, 40, 50]
//! max_generation_attempts: 1000
//! hyper_period_limit: 1000000
//! seed: 42
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::hyperperiod::DEFAULT_HYPER_PERIOD_LIMIT;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Admissible task periods used when the scenario file does not list any.
pub const DEFAULT_PERIODS: [u64; 5] = [10, 20, 30, 40, 50];

/// Execution-time multiplier applied to jobs sampled as overrunning.
pub const DEFAULT_OVERRUN_FACTOR: f64 = 2.0;

pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 1_000;

fn default_task_count() -> usize {
    12
}

fn default_target_utilization() -> f64 {
    2.0
}

fn default_processor_count() -> usize {
    4
}

fn default_aperiodic_job_count() -> usize {
    40
}

fn default_overrun_probability() -> f64 {
    0.2
}

fn default_overrun_factor() -> f64 {
    DEFAULT_OVERRUN_FACTOR
}

fn default_high_criticality_probability() -> f64 {
    0.5
}

fn default_periods() -> Vec<u64> {
    DEFAULT_PERIODS.to_vec()
}

fn default_max_generation_attempts() -> u32 {
    DEFAULT_MAX_GENERATION_ATTEMPTS
}

fn default_hyper_period_limit() -> u64 {
    DEFAULT_HYPER_PERIOD_LIMIT
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Scenario parameters outside their admissible range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("task_count must be at least 1")]
    NoTasks,

    #[error("processor_count must be at least 1")]
    NoProcessors,

    #[error("target_utilization must be positive and at most task_count ({task_count}), got {value}")]
    UtilizationOutOfRange { value: f64, task_count: usize },

    #[error("{name} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("overrun_factor must be at least 1.0, got {0}")]
    OverrunFactorTooSmall(f64),

    #[error("periods must be a non-empty list of positive integers")]
    InvalidPeriods,

    #[error("max_generation_attempts must be at least 1")]
    NoGenerationAttempts,
}

// ── ScenarioConfig ────────────────────────────────────────────────────────────

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_task_count")]
    pub task_count: usize,

    /// Aggregate utilization across all tasks (UUniFast target).
    #[serde(default = "default_target_utilization")]
    pub target_utilization: f64,

    #[serde(default = "default_processor_count")]
    pub processor_count: usize,

    #[serde(default = "default_aperiodic_job_count")]
    pub aperiodic_job_count: usize,

    /// Probability that a high-criticality job overruns its budget.
    #[serde(default = "default_overrun_probability")]
    pub overrun_probability: f64,

    /// Execution-time multiplier for overrunning jobs.
    #[serde(default = "default_overrun_factor")]
    pub overrun_factor: f64,

    #[serde(default = "default_high_criticality_probability")]
    pub high_criticality_probability: f64,

    /// Admissible periods; task periods and aperiodic relative deadlines are
    /// drawn uniformly from this set.
    #[serde(default = "default_periods")]
    pub periods: Vec<u64>,

    /// UUniFast retry budget before falling back to the memo store.
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,

    #[serde(default = "default_hyper_period_limit")]
    pub hyper_period_limit: u64,

    /// RNG seed; `None` draws one from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            task_count: default_task_count(),
            target_utilization: default_target_utilization(),
            processor_count: default_processor_count(),
            aperiodic_job_count: default_aperiodic_job_count(),
            overrun_probability: default_overrun_probability(),
            overrun_factor: default_overrun_factor(),
            high_criticality_probability: default_high_criticality_probability(),
            periods: default_periods(),
            max_generation_attempts: default_max_generation_attempts(),
            hyper_period_limit: default_hyper_period_limit(),
            seed: None,
        }
    }
}

impl ScenarioConfig {
    /// Parse and validate a scenario file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is malformed, or
    /// a parameter fails [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading scenario configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open scenario file: {}", path.display()))?;

        let config: ScenarioConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid scenario in {}", path.display()))?;

        debug!(?config, "scenario loaded");
        Ok(config)
    }

    /// Check every parameter against its admissible range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task_count == 0 {
            return Err(ConfigError::NoTasks);
        }
        if self.processor_count == 0 {
            return Err(ConfigError::NoProcessors);
        }
        if !(self.target_utilization > 0.0 && self.target_utilization <= self.task_count as f64) {
            return Err(ConfigError::UtilizationOutOfRange {
                value: self.target_utilization,
                task_count: self.task_count,
            });
        }
        check_probability("overrun_probability", self.overrun_probability)?;
        check_probability(
            "high_criticality_probability",
            self.high_criticality_probability,
        )?;
        if !(self.overrun_factor >= 1.0 && self.overrun_factor.is_finite()) {
            return Err(ConfigError::OverrunFactorTooSmall(self.overrun_factor));
        }
        if self.periods.is_empty() || self.periods.contains(&0) {
            return Err(ConfigError::InvalidPeriods);
        }
        if self.max_generation_attempts == 0 {
            return Err(ConfigError::NoGenerationAttempts);
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ScenarioConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.periods, vec![10, 20, 30, 40, 50]);
        assert_eq!(cfg.overrun_factor, 2.0);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn load_full_scenario() {
        let yaml = r#"
task_count: 16
target_utilization: 4.0
processor_count: 8
aperiodic_job_count: 80
overrun_probability: 0.1
overrun_factor: 1.5
high_criticality_probability: 0.3
periods: [25, 50, 100]
max_generation_attempts: 50
hyper_period_limit: 5000
seed: 7
"#;
        let f = yaml_tempfile(yaml);
        let cfg = ScenarioConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.task_count, 16);
        assert_eq!(cfg.processor_count, 8);
        assert_eq!(cfg.aperiodic_job_count, 80);
        assert_eq!(cfg.periods, vec![25, 50, 100]);
        assert_eq!(cfg.overrun_factor, 1.5);
        assert_eq!(cfg.max_generation_attempts, 50);
        assert_eq!(cfg.hyper_period_limit, 5000);
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let f = yaml_tempfile("processor_count: 2\ntarget_utilization: 1.0\n");
        let cfg = ScenarioConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.processor_count, 2);
        assert_eq!(cfg.task_count, 12);
        assert_eq!(cfg.aperiodic_job_count, 40);
        assert_eq!(cfg.overrun_probability, 0.2);
    }

    #[test]
    fn missing_file_returns_error() {
        let result = ScenarioConfig::load_from_file(Path::new("/nonexistent/scenario.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(ScenarioConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let f = yaml_tempfile("overrun_probability: 1.5\n");
        let err = ScenarioConfig::load_from_file(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("overrun_probability"));
    }

    #[test]
    fn validate_reports_each_violation() {
        let base = ScenarioConfig::default();

        let cfg = ScenarioConfig { task_count: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::NoTasks));

        let cfg = ScenarioConfig { processor_count: 0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::NoProcessors));

        let cfg = ScenarioConfig { target_utilization: 13.0, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(ConfigError::UtilizationOutOfRange { .. })));

        let cfg = ScenarioConfig { target_utilization: 0.0, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(ConfigError::UtilizationOutOfRange { .. })));

        let cfg = ScenarioConfig { high_criticality_probability: -0.1, ..base.clone() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ProbabilityOutOfRange { name: "high_criticality_probability", .. })
        ));

        let cfg = ScenarioConfig { overrun_factor: 0.5, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::OverrunFactorTooSmall(0.5)));

        let cfg = ScenarioConfig { periods: vec![], ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidPeriods));

        let cfg = ScenarioConfig { periods: vec![10, 0], ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidPeriods));

        let cfg = ScenarioConfig { max_generation_attempts: 0, ..base };
        assert_eq!(cfg.validate(), Err(ConfigError::NoGenerationAttempts));
    }
}
