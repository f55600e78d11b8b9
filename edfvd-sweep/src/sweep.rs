/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Sweep execution and aggregation.
//!
//! Every grid point runs `repetitions` seeded scenarios.  Seeds are
//! `base_seed + point_index * repetitions + repetition`, so any single run
//! can be replayed with `edfvd-sim --seed`.
//!
//! | Outcome | Counted as |
//! |---|---|
//! | Generation exhausted / allocation failure | scenario failure, unschedulable |
//! | High-criticality deadline miss | completed, unschedulable |
//! | Otherwise | completed, schedulable |
//!
//! QoS, drops and misses are averaged over completed runs only.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use edfvd_sim::memo::UtilizationStore;
use edfvd_sim::simulation::{Simulation, SimulationError, SimulationReport};

use crate::config::{GridPoint, SweepConfig};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("grid point {point}, seed {seed}: {source}")]
    Run {
        point: String,
        seed: u64,
        #[source]
        source: SimulationError,
    },
}

/// Aggregate of all repetitions at one grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSummary {
    #[serde(flatten)]
    pub point: GridPoint,
    pub runs: u32,
    pub scenario_failures: u32,
    pub schedulable_runs: u32,
    /// `schedulable_runs / runs`.
    pub schedulable_fraction: f64,
    /// Mean over completed runs with a defined QoS.
    pub mean_qos: Option<f64>,
    pub mean_dropped: f64,
    pub mean_deadline_misses: f64,
    pub mean_unscheduled: f64,
}

/// Running totals for one grid point.
#[derive(Debug, Default)]
struct Accumulator {
    runs: u32,
    failures: u32,
    schedulable: u32,
    completed: u32,
    qos_sum: f64,
    qos_count: u32,
    dropped: usize,
    misses: usize,
    unscheduled: usize,
}

impl Accumulator {
    fn record(&mut self, report: &SimulationReport) {
        self.runs += 1;
        self.completed += 1;
        if report.high_criticality_safe() {
            self.schedulable += 1;
        }
        if let Some(qos) = report.qos {
            self.qos_sum += qos;
            self.qos_count += 1;
        }
        let totals = report.totals();
        self.dropped += totals.dropped;
        self.misses += totals.deadline_misses();
        self.unscheduled += report.unscheduled.len();
    }

    fn record_failure(&mut self) {
        self.runs += 1;
        self.failures += 1;
    }

    fn finish(self, point: GridPoint) -> PointSummary {
        let mean = |total: usize| {
            if self.completed == 0 {
                0.0
            } else {
                total as f64 / self.completed as f64
            }
        };
        PointSummary {
            point,
            runs: self.runs,
            scenario_failures: self.failures,
            schedulable_runs: self.schedulable,
            schedulable_fraction: if self.runs == 0 {
                0.0
            } else {
                self.schedulable as f64 / self.runs as f64
            },
            mean_qos: (self.qos_count > 0).then(|| self.qos_sum / self.qos_count as f64),
            mean_dropped: mean(self.dropped),
            mean_deadline_misses: mean(self.misses),
            mean_unscheduled: mean(self.unscheduled),
        }
    }
}

/// Run every grid point of `config`.
///
/// # Errors
/// Any simulation error other than a scenario failure aborts the sweep.
pub fn run_sweep<S>(config: &SweepConfig, store: &mut S) -> Result<Vec<PointSummary>, SweepError>
where
    S: UtilizationStore + ?Sized,
{
    let grid = config.grid();
    info!(
        points = grid.len(),
        repetitions = config.repetitions,
        "=== sweep start ==="
    );

    let mut summaries = Vec::with_capacity(grid.len());
    for (index, point) in grid.into_iter().enumerate() {
        let simulation = Simulation::new(config.scenario(&point)).map_err(|source| SweepError::Run {
            point: point.to_string(),
            seed: config.base_seed,
            source,
        })?;

        let mut acc = Accumulator::default();
        for rep in 0..config.repetitions {
            let seed = config.base_seed + index as u64 * config.repetitions as u64 + rep as u64;
            match simulation.run_seeded(seed, store) {
                Ok(report) => acc.record(&report),
                Err(e) if e.is_scenario_failure() => {
                    debug!(%point, seed, error = %e, "scenario failure");
                    acc.record_failure();
                }
                Err(source) => {
                    return Err(SweepError::Run {
                        point: point.to_string(),
                        seed,
                        source,
                    })
                }
            }
        }

        let summary = acc.finish(point);
        info!(
            point = %summary.point,
            schedulable_fraction = summary.schedulable_fraction,
            mean_qos = ?summary.mean_qos,
            failures = summary.scenario_failures,
            "grid point done"
        );
        summaries.push(summary);
    }
    Ok(summaries)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use edfvd_sim::config::ScenarioConfig;
    use edfvd_sim::memo::InMemoryStore;

    fn tiny_sweep() -> SweepConfig {
        SweepConfig {
            repetitions: 3,
            base_seed: 11,
            tasks_per_processor: 2,
            processor_counts: vec![2],
            utilizations_per_processor: vec![0.4, 0.6],
            aperiodic_job_counts: vec![5],
            overrun_probabilities: vec![0.0],
            base: ScenarioConfig {
                periods: vec![10, 20],
                ..ScenarioConfig::default()
            },
        }
    }

    #[test]
    fn one_summary_per_grid_point() {
        let summaries = run_sweep(&tiny_sweep(), &mut InMemoryStore::new()).unwrap();
        assert_eq!(summaries.len(), 2);
        for s in &summaries {
            assert_eq!(s.runs, 3);
            assert!(s.schedulable_runs + s.scenario_failures <= s.runs);
            assert!((0.0..=1.0).contains(&s.schedulable_fraction));
            if let Some(q) = s.mean_qos {
                assert!((0.0..=100.0).contains(&q));
            }
        }
    }

    #[test]
    fn sweeps_are_deterministic() {
        let a = run_sweep(&tiny_sweep(), &mut InMemoryStore::new()).unwrap();
        let b = run_sweep(&tiny_sweep(), &mut InMemoryStore::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_overrun_light_load_is_always_schedulable() {
        let cfg = SweepConfig {
            utilizations_per_processor: vec![0.3],
            aperiodic_job_counts: vec![0],
            ..tiny_sweep()
        };
        let summaries = run_sweep(&cfg, &mut InMemoryStore::new()).unwrap();
        assert_eq!(summaries[0].schedulable_fraction, 1.0);
        assert_eq!(summaries[0].mean_dropped, 0.0);
    }

    #[test]
    fn accumulator_counts_failures_as_unschedulable() {
        let mut acc = Accumulator::default();
        acc.record_failure();
        acc.record_failure();
        let s = acc.finish(GridPoint {
            processor_count: 1,
            utilization_per_processor: 0.9,
            aperiodic_job_count: 0,
            overrun_probability: 0.0,
        });
        assert_eq!(s.runs, 2);
        assert_eq!(s.scenario_failures, 2);
        assert_eq!(s.schedulable_fraction, 0.0);
        assert_eq!(s.mean_qos, None);
        assert_eq!(s.mean_dropped, 0.0);
    }
}
