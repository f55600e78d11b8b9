/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Job instances and their execution history.
//!
//! A [`Job`] is one activation of work on a processor.  Periodic and
//! aperiodic jobs share all scheduling state (intervals, remaining time, drop
//! flag); the variant-specific fields live in [`JobKind`].
//!
//! # Deadlines
//! Every job carries two absolute deadlines:
//!
//! * `nominal_deadline` – `release + relative deadline`; validated at
//!   construction and used for deadline-miss accounting.
//! * `deadline` – the key EDF orders by.  Equal to the nominal deadline
//!   except for high-criticality periodic jobs, whose deadline is the
//!   EDF-VD *virtual* deadline `release + period * x`.
//!
//! # Interval invariant
//! `start_intervals.len() == finish_intervals.len()` while the job is idle
//! or completed, and `start_intervals.len() == finish_intervals.len() + 1`
//! while it holds the processor.

use serde::Serialize;

use crate::ids::{JobId, TaskId};
use crate::task::{Criticality, ModelError, Task};

/// Tolerance used when comparing accumulated execution time.
pub const ERROR_MARGIN: f64 = 1e-10;

// ── JobKind ───────────────────────────────────────────────────────────────────

/// Variant-specific job data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum JobKind {
    /// Instance of a periodic task.
    Periodic {
        /// Originating task (non-owning).
        task: TaskId,
        criticality: Criticality,
        /// 1-based activation counter within the hyper-period.
        instance_number: u32,
        /// Sampled execution-time overrun; triggers the mode switch.
        will_overrun: bool,
    },
    /// Sporadic arrival not tied to any task.
    Aperiodic,
}

// ── Job ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    id: JobId,
    release_time: f64,
    deadline: f64,
    nominal_deadline: f64,
    execution_time: f64,
    remaining_execution_time: f64,
    start_intervals: Vec<f64>,
    finish_intervals: Vec<f64>,
    dropped: bool,
    kind: JobKind,
}

impl Job {
    /// Generic constructor.  The EDF deadline starts equal to
    /// `nominal_deadline`.
    ///
    /// # Errors
    /// * [`ModelError::InvalidJob`] if `nominal_deadline <= release_time`.
    /// * [`ModelError::InvalidExecutionTime`] if `execution_time` is negative
    ///   or not finite.
    pub fn new(
        id: JobId,
        release_time: f64,
        nominal_deadline: f64,
        execution_time: f64,
        kind: JobKind,
    ) -> Result<Self, ModelError> {
        if release_time.is_nan() || nominal_deadline.is_nan() || nominal_deadline <= release_time {
            return Err(ModelError::InvalidJob {
                job: id,
                release_time,
                deadline: nominal_deadline,
            });
        }
        if !execution_time.is_finite() || execution_time < 0.0 {
            return Err(ModelError::InvalidExecutionTime { job: id, execution_time });
        }
        Ok(Self {
            id,
            release_time,
            deadline: nominal_deadline,
            nominal_deadline,
            execution_time,
            remaining_execution_time: execution_time,
            start_intervals: Vec::new(),
            finish_intervals: Vec::new(),
            dropped: false,
            kind,
        })
    }

    /// Periodic instance of `task` released at `release_time`.
    ///
    /// `execution_time` is passed in explicitly because an overrunning job
    /// demands more than the task's declared budget.
    pub fn periodic(
        id: JobId,
        task: &Task,
        release_time: f64,
        instance_number: u32,
        will_overrun: bool,
        execution_time: f64,
    ) -> Result<Self, ModelError> {
        Self::new(
            id,
            release_time,
            release_time + task.period() as f64,
            execution_time,
            JobKind::Periodic {
                task: task.id(),
                criticality: task.criticality(),
                instance_number,
                will_overrun,
            },
        )
    }

    /// Aperiodic job: execution time is half its relative deadline.
    pub fn aperiodic(id: JobId, release_time: f64, relative_deadline: f64) -> Result<Self, ModelError> {
        Self::new(
            id,
            release_time,
            release_time + relative_deadline,
            relative_deadline / 2.0,
            JobKind::Aperiodic,
        )
    }

    /// Replace the EDF deadline with a virtual one.  A virtual deadline may
    /// coincide with the release time (scaling factor `0`), but never
    /// precede it.
    pub fn with_virtual_deadline(mut self, deadline: f64) -> Self {
        self.deadline = deadline.max(self.release_time);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn release_time(&self) -> f64 {
        self.release_time
    }

    /// Absolute EDF deadline (virtual for high-criticality periodic jobs).
    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    /// Absolute deadline before any virtual scaling.
    pub fn nominal_deadline(&self) -> f64 {
        self.nominal_deadline
    }

    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    pub fn remaining_execution_time(&self) -> f64 {
        self.remaining_execution_time
    }

    pub fn start_intervals(&self) -> &[f64] {
        &self.start_intervals
    }

    pub fn finish_intervals(&self) -> &[f64] {
        &self.finish_intervals
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn kind(&self) -> &JobKind {
        &self.kind
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self.kind, JobKind::Periodic { .. })
    }

    pub fn is_aperiodic(&self) -> bool {
        matches!(self.kind, JobKind::Aperiodic)
    }

    pub fn task_id(&self) -> Option<TaskId> {
        match self.kind {
            JobKind::Periodic { task, .. } => Some(task),
            JobKind::Aperiodic => None,
        }
    }

    pub fn instance_number(&self) -> Option<u32> {
        match self.kind {
            JobKind::Periodic { instance_number, .. } => Some(instance_number),
            JobKind::Aperiodic => None,
        }
    }

    /// Aperiodic jobs are best-effort and count as low criticality.
    pub fn criticality(&self) -> Criticality {
        match self.kind {
            JobKind::Periodic { criticality, .. } => criticality,
            JobKind::Aperiodic => Criticality::Low,
        }
    }

    /// `true` only for high-criticality periodic jobs flagged to overrun.
    pub fn triggers_mode_switch(&self) -> bool {
        matches!(
            self.kind,
            JobKind::Periodic {
                criticality: Criticality::High,
                will_overrun: true,
                ..
            }
        )
    }

    /// First time the job got the processor.
    pub fn start_time(&self) -> Option<f64> {
        self.start_intervals.first().copied()
    }

    /// Last recorded finish (completion time once the job is done).
    pub fn finish_time(&self) -> Option<f64> {
        self.finish_intervals.last().copied()
    }

    /// Closed `(start, finish)` execution segments.
    pub fn execution_intervals(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.start_intervals
            .iter()
            .copied()
            .zip(self.finish_intervals.iter().copied())
    }

    /// Total processor time recorded in closed segments.
    pub fn executed_time(&self) -> f64 {
        self.execution_intervals().map(|(s, f)| f - s).sum()
    }

    pub fn is_running(&self) -> bool {
        self.start_intervals.len() == self.finish_intervals.len() + 1
    }

    /// Completed or dropped.
    pub fn is_finished(&self) -> bool {
        !self.is_running()
            && !self.finish_intervals.is_empty()
            && self.remaining_execution_time <= ERROR_MARGIN
    }

    /// Finished (not dropped) after its nominal deadline.
    pub fn missed_deadline(&self) -> bool {
        !self.dropped
            && self
                .finish_time()
                .is_some_and(|f| f > self.nominal_deadline + ERROR_MARGIN)
    }

    // ── Scheduler-only mutation ───────────────────────────────────────────────

    pub(crate) fn start_segment(&mut self, at: f64) {
        debug_assert!(!self.is_running(), "{} started twice", self.id);
        self.start_intervals.push(at);
    }

    /// Undo a segment start that ended up with zero length.
    pub(crate) fn retract_segment(&mut self) {
        if self.is_running() {
            self.start_intervals.pop();
        }
    }

    /// Close the running segment at `at` and charge the executed time.
    pub(crate) fn stop_segment(&mut self, at: f64) {
        let started = self.start_intervals.last().copied().unwrap_or(at);
        self.finish_intervals.push(at);
        self.remaining_execution_time -= at - started;
        if self.remaining_execution_time <= ERROR_MARGIN {
            self.remaining_execution_time = 0.0;
        }
    }

    /// Close the running segment at `at` and mark the job complete.
    pub(crate) fn complete(&mut self, at: f64) {
        self.finish_intervals.push(at);
        self.remaining_execution_time = 0.0;
    }

    /// Discard all recorded execution and mark the job dropped: a single
    /// zero-length interval at the release time.
    pub(crate) fn drop_job(&mut self) {
        self.start_intervals.clear();
        self.finish_intervals.clear();
        self.start_intervals.push(self.release_time);
        self.finish_intervals.push(self.release_time);
        self.remaining_execution_time = 0.0;
        self.dropped = true;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
