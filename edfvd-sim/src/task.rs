/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Periodic task model.
//!
//! ```text
//! UUniFast ──(utilization)──┐
//!                           ├──► Task ──(partitioner)──► Processor ──(job factory)──► Job
//! period set ──(period)─────┘
//! ```
//!
//! # Ownership model
//! A `Task` is created once by the [`TaskPool`](crate::workload::TaskPool)
//! and then **moved** into exactly one [`Processor`](crate::processor::Processor)
//! by the partitioner.  Jobs never hold the task itself; they carry its
//! [`TaskId`] and the attributes the scheduler needs.

use serde::Serialize;
use thiserror::Error;

use crate::ids::{JobId, TaskId};

// ── Criticality ───────────────────────────────────────────────────────────────

/// Assurance level of a task.
///
/// A typed enum instead of a bare `bool` so call sites read as
/// `Criticality::High` rather than `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Criticality {
    /// Best-effort work; dropped on a criticality mode switch.
    #[default]
    Low,
    /// Safety-critical work; scheduled against a virtual deadline.
    High,
}

impl Criticality {
    pub fn from_high_flag(high: bool) -> Self {
        if high {
            Criticality::High
        } else {
            Criticality::Low
        }
    }

    pub fn is_high(self) -> bool {
        self == Criticality::High
    }
}

// ── Model errors ──────────────────────────────────────────────────────────────

/// Contract violations detected while constructing tasks or jobs.
///
/// These are programming/input errors, never runtime scheduling outcomes.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("invalid task: period must be > 0 and utilization in (0, 1] (period={period}, utilization={utilization})")]
    InvalidTask { period: u64, utilization: f64 },

    #[error("invalid job {job}: deadline {deadline} is not after release time {release_time}")]
    InvalidJob {
        job: JobId,
        release_time: f64,
        deadline: f64,
    },

    #[error("invalid job {job}: execution time {execution_time} must be finite and non-negative")]
    InvalidExecutionTime { job: JobId, execution_time: f64 },
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// A periodic real-time task.
///
/// `execution_time == utilization * period` is fixed at construction and the
/// fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    id: TaskId,
    period: u64,
    utilization: f64,
    execution_time: f64,
    criticality: Criticality,
}

impl Task {
    /// Build a task, deriving its execution time from `utilization * period`.
    ///
    /// # Errors
    /// [`ModelError::InvalidTask`] if `period == 0` or `utilization` is not in
    /// `(0, 1]`.
    pub fn new(
        id: TaskId,
        period: u64,
        utilization: f64,
        criticality: Criticality,
    ) -> Result<Self, ModelError> {
        if period == 0 || utilization <= 0.0 || !(0.0..=1.0).contains(&utilization) {
            return Err(ModelError::InvalidTask {
                period,
                utilization,
            });
        }
        Ok(Self {
            id,
            period,
            utilization,
            execution_time: utilization * period as f64,
            criticality,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn utilization(&self) -> f64 {
        self.utilization
    }

    /// Declared (low-mode) execution budget per job.
    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    pub fn criticality(&self) -> Criticality {
        self.criticality
    }

    pub fn is_high_criticality(&self) -> bool {
        self.criticality.is_high()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
