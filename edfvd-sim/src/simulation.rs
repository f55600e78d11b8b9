/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! One end-to-end scenario run.
//!
//! ```text
//! UUniFast ─► TaskPool ─► Partitioner ─► JobFactory ─► aperiodic admission
//!                                            │                  │
//!                                            └──► Scheduler ◄───┘ ─► QoS
//! ```
//!
//! Every stochastic step draws from the single RNG handed to
//! [`Simulation::run`], so a seed reproduces the whole run.  An
//! [`IdAllocator`] is created per run; ids never leak between runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, ScenarioConfig};
use crate::hyperperiod::{HyperperiodError, HyperperiodInfo};
use crate::ids::{IdAllocator, ProcessorId};
use crate::job::Job;
use crate::jobs::{JobFactory, JobFactoryError};
use crate::memo::UtilizationStore;
use crate::partition::{PartitionError, Partitioner};
use crate::processor::Processor;
use crate::qos;
use crate::scheduler::feasibility::EdfVdAnalysis;
use crate::scheduler::{ScheduleStats, Scheduler};
use crate::task::{ModelError, Task};
use crate::workload::pool::sample_from_set;
use crate::workload::{GenerationError, TaskPool, UtilizationGenerator};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("invalid scenario: {0}")]
    Config(#[from] ConfigError),

    #[error("task-set generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("hyper-period: {0}")]
    Hyperperiod(#[from] HyperperiodError),

    #[error("partitioning failed: {0}")]
    Partition(#[from] PartitionError),

    #[error("job instantiation failed: {0}")]
    Jobs(#[from] JobFactoryError),
}

impl SimulationError {
    /// `true` for outcomes of the random scenario itself (no valid
    /// utilization vector, or a task set that does not fit), as opposed to
    /// invalid input.
    pub fn is_scenario_failure(&self) -> bool {
        matches!(
            self,
            SimulationError::Generation(GenerationError::Exhausted { .. })
                | SimulationError::Partition(PartitionError::Allocation { .. })
        )
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Read-only snapshot of one processor after its final schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessorReport {
    pub id: ProcessorId,
    pub utilization_sum: f64,
    pub server_utilization: Option<f64>,
    pub hyper_period: u64,
    pub analysis: EdfVdAnalysis,
    pub stats: ScheduleStats,
    pub tasks: Vec<Task>,
    /// Periodic and admitted aperiodic jobs with their execution history.
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub seed: Option<u64>,
    /// LCM of every task period; horizon of aperiodic arrivals.
    pub hyper_period: u64,
    pub processors: Vec<ProcessorReport>,
    /// Aperiodic jobs rejected by every processor.
    pub unscheduled: Vec<Job>,
    /// Mean QoS, `None` when no low-criticality job finished.
    pub qos: Option<f64>,
}

impl SimulationReport {
    /// Aggregate of the per-processor counters.
    pub fn totals(&self) -> ScheduleStats {
        self.processors
            .iter()
            .fold(ScheduleStats::default(), |mut acc, p| {
                acc.completed += p.stats.completed;
                acc.dropped += p.stats.dropped;
                acc.high_criticality_misses += p.stats.high_criticality_misses;
                acc.low_criticality_misses += p.stats.low_criticality_misses;
                acc.preemptions += p.stats.preemptions;
                acc.mode_switches += p.stats.mode_switches;
                acc
            })
    }

    /// Every scheduled job followed by the unscheduled ones.
    pub fn all_jobs(&self) -> impl Iterator<Item = &Job> + '_ {
        self.processors
            .iter()
            .flat_map(|p| p.jobs.iter())
            .chain(&self.unscheduled)
    }

    /// `true` when no high-criticality job missed its deadline.
    pub fn high_criticality_safe(&self) -> bool {
        self.processors
            .iter()
            .all(|p| p.stats.high_criticality_misses == 0)
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

pub struct Simulation {
    config: ScenarioConfig,
}

impl Simulation {
    /// # Errors
    /// [`SimulationError::Config`] if `config` fails validation.
    pub fn new(config: ScenarioConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Run with a [`StdRng`] seeded from `seed`.
    pub fn run_seeded<S>(&self, seed: u64, store: &mut S) -> Result<SimulationReport, SimulationError>
    where
        S: UtilizationStore + ?Sized,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut report = self.run(&mut rng, store)?;
        report.seed = Some(seed);
        Ok(report)
    }

    /// Run the full pipeline once.
    pub fn run<R, S>(&self, rng: &mut R, store: &mut S) -> Result<SimulationReport, SimulationError>
    where
        R: Rng + ?Sized,
        S: UtilizationStore + ?Sized,
    {
        let cfg = &self.config;
        let ids = IdAllocator::new();

        info!(
            task_count = cfg.task_count,
            target_utilization = cfg.target_utilization,
            processor_count = cfg.processor_count,
            aperiodic_job_count = cfg.aperiodic_job_count,
            overrun_probability = cfg.overrun_probability,
            "=== scenario start ==="
        );

        // ── Task set ─────────────────────────────────────────────────────────
        let utilizations = UtilizationGenerator::new(cfg.max_generation_attempts)
            .generate_with_store(rng, cfg.task_count, cfg.target_utilization, store)?;
        let periods = sample_from_set(rng, cfg.task_count, &cfg.periods)?;
        let tasks = TaskPool::new(cfg.high_criticality_probability)
            .build(rng, &ids, &utilizations, &periods)?;
        let hyper_period = HyperperiodInfo::for_tasks(&tasks, cfg.hyper_period_limit)?.hyper_period;

        // ── Partitioning ─────────────────────────────────────────────────────
        let processors: Vec<Processor> = (1..=cfg.processor_count)
            .map(|i| Processor::new(ProcessorId(i as u32), cfg.overrun_probability))
            .collect();
        let mut processors = Partitioner::new(cfg.overrun_factor).partition(tasks, processors)?;

        // ── Jobs ─────────────────────────────────────────────────────────────
        let factory = JobFactory::new(cfg.overrun_factor, cfg.hyper_period_limit);
        for processor in &mut processors {
            factory.instantiate(rng, &ids, processor)?;
        }
        let aperiodic = factory.aperiodic_jobs(
            rng,
            &ids,
            cfg.aperiodic_job_count,
            hyper_period,
            &cfg.periods,
        )?;
        let admission = factory.admit_aperiodic(&mut processors, aperiodic);

        // ── Final schedules ──────────────────────────────────────────────────
        let reports: Vec<ProcessorReport> = processors
            .iter()
            .map(|p| {
                let schedule = Scheduler::for_processor(p).run(p.committed_jobs().cloned().collect());
                let stats = *schedule.stats();
                ProcessorReport {
                    id: p.id(),
                    utilization_sum: p.utilization_sum(),
                    server_utilization: p.server_utilization(),
                    hyper_period: p.hyper_period(),
                    analysis: p.analysis(cfg.overrun_factor),
                    stats,
                    tasks: p.tasks().to_vec(),
                    jobs: schedule.into_jobs(),
                }
            })
            .collect();

        let mut report = SimulationReport {
            seed: cfg.seed,
            hyper_period,
            processors: reports,
            unscheduled: admission.unscheduled,
            qos: None,
        };

        report.qos = match qos::evaluate(report.all_jobs()) {
            Ok(score) => Some(score),
            Err(e) => {
                warn!(error = %e, "QoS undefined for this scenario");
                None
            }
        };

        let totals = report.totals();
        info!(
            completed = totals.completed,
            dropped = totals.dropped,
            high_misses = totals.high_criticality_misses,
            low_misses = totals.low_criticality_misses,
            mode_switches = totals.mode_switches,
            unscheduled = report.unscheduled.len(),
            qos = ?report.qos,
            "=== scenario complete ==="
        );
        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::ERROR_MARGIN;
    use crate::memo::InMemoryStore;

    fn small_config() -> ScenarioConfig {
        ScenarioConfig {
            task_count: 6,
            target_utilization: 1.5,
            processor_count: 3,
            aperiodic_job_count: 10,
            overrun_probability: 0.3,
            periods: vec![10, 20, 40],
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let cfg = ScenarioConfig {
            processor_count: 0,
            ..small_config()
        };
        assert!(matches!(
            Simulation::new(cfg),
            Err(SimulationError::Config(ConfigError::NoProcessors))
        ));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let sim = Simulation::new(small_config()).unwrap();
        let a = sim.run_seeded(42, &mut InMemoryStore::new()).unwrap();
        let b = sim.run_seeded(42, &mut InMemoryStore::new()).unwrap();
        assert_eq!(a.qos, b.qos);
        assert_eq!(a.totals(), b.totals());
        let jobs_a: Vec<&Job> = a.all_jobs().collect();
        let jobs_b: Vec<&Job> = b.all_jobs().collect();
        assert_eq!(jobs_a, jobs_b);
        assert_eq!(a.seed, Some(42));
    }

    #[test]
    fn every_task_lands_on_one_processor_within_capacity() {
        let sim = Simulation::new(small_config()).unwrap();
        let report = sim.run_seeded(7, &mut InMemoryStore::new()).unwrap();

        let placed: usize = report.processors.iter().map(|p| p.tasks.len()).sum();
        assert_eq!(placed, 6);
        for p in &report.processors {
            let sum: f64 = p.tasks.iter().map(Task::utilization).sum();
            assert!(sum <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn final_schedules_respect_execution_and_overlap_invariants() {
        let sim = Simulation::new(small_config()).unwrap();
        for seed in 0..5 {
            let report = sim.run_seeded(seed, &mut InMemoryStore::new()).unwrap();
            for p in &report.processors {
                let mut segments = Vec::new();
                for job in &p.jobs {
                    if job.is_dropped() {
                        assert_eq!(job.start_intervals(), &[job.release_time()]);
                        assert_eq!(job.finish_intervals(), &[job.release_time()]);
                        continue;
                    }
                    assert!((job.executed_time() - job.execution_time()).abs() < ERROR_MARGIN);
                    segments.extend(job.execution_intervals().filter(|(s, f)| f - s > ERROR_MARGIN));
                }
                segments.sort_by(|a, b| a.0.total_cmp(&b.0));
                for pair in segments.windows(2) {
                    assert!(pair[0].1 <= pair[1].0 + ERROR_MARGIN);
                }
            }
        }
    }

    #[test]
    fn every_aperiodic_job_is_admitted_or_reported_unscheduled() {
        let sim = Simulation::new(small_config()).unwrap();
        let report = sim.run_seeded(3, &mut InMemoryStore::new()).unwrap();
        let admitted: usize = report
            .processors
            .iter()
            .map(|p| p.jobs.iter().filter(|j| j.is_aperiodic()).count())
            .sum();
        assert_eq!(admitted + report.unscheduled.len(), 10);
        assert!(report.unscheduled.iter().all(|j| j.start_intervals().is_empty()));
    }

    #[test]
    fn utilization_vector_is_memoized() {
        let sim = Simulation::new(small_config()).unwrap();
        let mut store = InMemoryStore::new();
        sim.run_seeded(1, &mut store).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn overloaded_platform_is_a_scenario_failure() {
        let cfg = ScenarioConfig {
            task_count: 4,
            target_utilization: 3.6,
            processor_count: 2,
            ..small_config()
        };
        let err = Simulation::new(cfg)
            .unwrap()
            .run_seeded(5, &mut InMemoryStore::new())
            .unwrap_err();
        assert!(err.is_scenario_failure(), "unexpected error: {err}");
    }
}
