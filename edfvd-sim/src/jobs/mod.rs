/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Job instantiation for partitioned processors.
//!
//! [`JobFactory`] turns a processor's task set into the committed periodic
//! jobs of one hyper-period, synthesises aperiodic arrivals and admits them
//! through trial schedules (see [`admission`]).
//!
//! # Periodic jobs
//!
//! | Criticality | EDF deadline | Execution time |
//! |---|---|---|
//! | Low | `release + period` | `C` |
//! | High | `release + period * x` | `C`, or `C * overrun_factor` when sampled to overrun |
//!
//! `x` is the EDF-VD scaling factor of the processor
//! ([`scaling_factor`](crate::scheduler::feasibility::scaling_factor)).
//! Job ids follow task order, then instance number.

pub mod admission;

pub use admission::AdmissionOutcome;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::hyperperiod::{HyperperiodError, HyperperiodInfo};
use crate::ids::IdAllocator;
use crate::job::Job;
use crate::processor::Processor;
use crate::scheduler::feasibility::scaling_factor;
use crate::task::{ModelError, Task};
use crate::workload::pool::sample_from_set;
use crate::workload::GenerationError;

#[derive(Debug, Error, PartialEq)]
pub enum JobFactoryError {
    #[error("hyper-period: {0}")]
    Hyperperiod(#[from] HyperperiodError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub struct JobFactory {
    overrun_factor: f64,
    hyper_period_limit: u64,
}

impl JobFactory {
    pub fn new(overrun_factor: f64, hyper_period_limit: u64) -> Self {
        Self {
            overrun_factor,
            hyper_period_limit,
        }
    }

    pub fn overrun_factor(&self) -> f64 {
        self.overrun_factor
    }

    /// Compute the processor's hyper-period and commit its periodic jobs.
    ///
    /// A processor without tasks gets hyper-period `0` and no jobs.
    pub fn instantiate<R>(
        &self,
        rng: &mut R,
        ids: &IdAllocator,
        processor: &mut Processor,
    ) -> Result<(), JobFactoryError>
    where
        R: Rng + ?Sized,
    {
        if processor.tasks().is_empty() {
            processor.set_hyper_period(0);
            processor.set_periodic_jobs(Vec::new());
            debug!(processor = %processor.id(), "no tasks, no periodic jobs");
            return Ok(());
        }

        let info = HyperperiodInfo::for_tasks(processor.tasks(), self.hyper_period_limit)?;
        let jobs = self.periodic_jobs(
            rng,
            ids,
            processor.tasks(),
            info.hyper_period,
            processor.overrun_probability(),
        )?;

        let analysis = processor.analysis(self.overrun_factor);
        info!(
            processor = %processor.id(),
            hyper_period = info.hyper_period,
            u_low = analysis.u_low,
            u_high = analysis.u_high,
            scaling_factor = analysis.scaling_factor,
            jobs = jobs.len(),
            overruns = jobs.iter().filter(|j| j.triggers_mode_switch()).count(),
            "periodic jobs instantiated"
        );

        processor.set_hyper_period(info.hyper_period);
        processor.set_periodic_jobs(jobs);
        Ok(())
    }

    /// Periodic jobs of `tasks` over `[0, hyper_period)`.
    ///
    /// Overrun is drawn only for high-criticality jobs.
    pub fn periodic_jobs<R>(
        &self,
        rng: &mut R,
        ids: &IdAllocator,
        tasks: &[Task],
        hyper_period: u64,
        overrun_probability: f64,
    ) -> Result<Vec<Job>, ModelError>
    where
        R: Rng + ?Sized,
    {
        let (u_low, u_high) = tasks.iter().fold((0.0, 0.0), |(lo, hi), t| {
            if t.is_high_criticality() {
                (lo, hi + t.utilization())
            } else {
                (lo + t.utilization(), hi)
            }
        });
        let x = scaling_factor(u_low, u_high);
        let overrun_probability = overrun_probability.clamp(0.0, 1.0);

        let mut jobs = Vec::new();
        for task in tasks {
            let mut release = 0;
            let mut instance = 1;
            while release < hyper_period {
                let release_time = release as f64;
                let job = if task.is_high_criticality() {
                    let will_overrun = rng.random_bool(overrun_probability);
                    let exec = if will_overrun {
                        task.execution_time() * self.overrun_factor
                    } else {
                        task.execution_time()
                    };
                    Job::periodic(ids.next_job_id(), task, release_time, instance, will_overrun, exec)?
                        .with_virtual_deadline(release_time + task.period() as f64 * x)
                } else {
                    Job::periodic(
                        ids.next_job_id(),
                        task,
                        release_time,
                        instance,
                        false,
                        task.execution_time(),
                    )?
                };
                jobs.push(job);
                release += task.period();
                instance += 1;
            }
        }
        Ok(jobs)
    }

    /// `count` aperiodic jobs released uniformly on the integers of
    /// `[0, horizon]`, with relative deadlines drawn from `periods`.
    pub fn aperiodic_jobs<R>(
        &self,
        rng: &mut R,
        ids: &IdAllocator,
        count: usize,
        horizon: u64,
        periods: &[u64],
    ) -> Result<Vec<Job>, JobFactoryError>
    where
        R: Rng + ?Sized,
    {
        let relative_deadlines = sample_from_set(rng, count, periods)?;
        let mut jobs = Vec::with_capacity(count);
        for relative in relative_deadlines {
            let release = rng.random_range(0..=horizon) as f64;
            jobs.push(Job::aperiodic(ids.next_job_id(), release, relative as f64)?);
        }
        debug!(count, horizon, "aperiodic jobs synthesised");
        Ok(jobs)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
