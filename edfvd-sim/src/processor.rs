/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! A processor of the partitioned platform.
//!
//! # Lifecycle
//! 1. Created empty, then filled by the [`Partitioner`](crate::partition::Partitioner)
//!    (tasks are **moved** in and never leave).
//! 2. [`JobFactory`](crate::jobs::JobFactory) computes the hyper-period,
//!    instantiates the committed periodic jobs and admits aperiodic jobs.
//! 3. The [`Scheduler`](crate::scheduler::Scheduler) runs on a copy of the
//!    committed jobs; the committed set itself is never mutated by a run.

use tracing::debug;

use crate::ids::ProcessorId;
use crate::job::Job;
use crate::scheduler::feasibility::EdfVdAnalysis;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Processor {
    id: ProcessorId,
    tasks: Vec<Task>,
    utilization_sum: f64,
    /// Capacity left for aperiodic work, set once jobs are instantiated.
    server_utilization: Option<f64>,
    overrun_probability: f64,
    /// `0` until computed, and for a processor without tasks.
    hyper_period: u64,
    periodic_jobs: Vec<Job>,
    aperiodic_jobs: Vec<Job>,
}

impl Processor {
    pub fn new(id: ProcessorId, overrun_probability: f64) -> Self {
        Self {
            id,
            tasks: Vec::new(),
            utilization_sum: 0.0,
            server_utilization: None,
            overrun_probability,
            hyper_period: 0,
            periodic_jobs: Vec::new(),
            aperiodic_jobs: Vec::new(),
        }
    }

    pub fn id(&self) -> ProcessorId {
        self.id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn utilization_sum(&self) -> f64 {
        self.utilization_sum
    }

    /// `1 - utilization_sum`.
    pub fn remaining_capacity(&self) -> f64 {
        1.0 - self.utilization_sum
    }

    pub fn server_utilization(&self) -> Option<f64> {
        self.server_utilization
    }

    pub fn overrun_probability(&self) -> f64 {
        self.overrun_probability
    }

    pub fn hyper_period(&self) -> u64 {
        self.hyper_period
    }

    pub fn periodic_jobs(&self) -> &[Job] {
        &self.periodic_jobs
    }

    pub fn aperiodic_jobs(&self) -> &[Job] {
        &self.aperiodic_jobs
    }

    /// Committed periodic jobs followed by admitted aperiodic jobs.
    pub fn committed_jobs(&self) -> impl Iterator<Item = &Job> + '_ {
        self.periodic_jobs.iter().chain(&self.aperiodic_jobs)
    }

    pub fn analysis(&self, overrun_factor: f64) -> EdfVdAnalysis {
        EdfVdAnalysis::for_tasks(&self.tasks, overrun_factor)
    }

    // ── Mutation (partitioner / job factory only) ─────────────────────────────

    pub(crate) fn assign(&mut self, task: Task) {
        self.utilization_sum += task.utilization();
        debug!(
            processor = %self.id,
            task = %task.id(),
            utilization = task.utilization(),
            utilization_sum = self.utilization_sum,
            "task assigned"
        );
        self.tasks.push(task);
    }

    pub(crate) fn set_hyper_period(&mut self, hyper_period: u64) {
        self.hyper_period = hyper_period;
    }

    pub(crate) fn set_periodic_jobs(&mut self, jobs: Vec<Job>) {
        self.server_utilization = Some(self.remaining_capacity().max(0.0));
        self.periodic_jobs = jobs;
    }

    pub(crate) fn admit_aperiodic(&mut self, job: Job) {
        self.aperiodic_jobs.push(job);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
