/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Hyper-period calculation.
//!
//! The hyper-period of a processor is the LCM of the periods of the tasks
//! assigned to it.  It is the simulation horizon for periodic job
//! instantiation and the window size of the criticality mode switch.
//!
//! | Failure | Variant |
//! |---------|---------|
//! | no task with a non-zero period | `NoValidPeriods` |
//! | LCM does not fit in `u64` | `Overflow` |
//! | LCM above the configured limit | `TooLarge` |

pub mod math;

use tracing::{debug, warn};

use crate::task::Task;
use math::lcm_of_periods;

/// Default upper bound on a hyper-period, in simulation time units.
pub const DEFAULT_HYPER_PERIOD_LIMIT: u64 = 1_000_000;

// ── Error type ────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum HyperperiodError {
    /// No task with a non-zero period was supplied.
    NoValidPeriods,

    /// LCM overflowed `u64`; carries the operands for the log message.
    Overflow { a: u64, b: u64 },

    /// The hyper-period exceeds the configured limit.  Simulating it would
    /// instantiate an unreasonable number of jobs.
    TooLarge { value: u64, limit: u64 },
}

impl std::fmt::Display for HyperperiodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HyperperiodError::NoValidPeriods => {
                write!(f, "no tasks with a valid (non-zero) period")
            }
            HyperperiodError::Overflow { a, b } => {
                write!(f, "LCM overflow computing lcm({a}, {b})")
            }
            HyperperiodError::TooLarge { value, limit } => {
                write!(f, "hyper-period {value} exceeds limit {limit}")
            }
        }
    }
}

impl std::error::Error for HyperperiodError {}

// ── HyperperiodInfo ───────────────────────────────────────────────────────────

/// Hyper-period of a task set together with the periods that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperperiodInfo {
    pub hyper_period: u64,

    /// Distinct periods, sorted ascending.
    pub unique_periods: Vec<u64>,

    pub task_count: usize,
}

impl HyperperiodInfo {
    /// Compute the hyper-period of `tasks`, rejecting values above `limit`.
    pub fn for_tasks<'a, I>(tasks: I, limit: u64) -> Result<Self, HyperperiodError>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut periods: Vec<u64> = tasks
            .into_iter()
            .map(Task::period)
            .filter(|&p| p > 0)
            .collect();
        let task_count = periods.len();

        if periods.is_empty() {
            return Err(HyperperiodError::NoValidPeriods);
        }

        periods.sort_unstable();
        periods.dedup();

        let hyper_period = lcm_of_periods(periods.iter().copied())?;
        if hyper_period > limit {
            warn!(hyper_period, limit, "hyper-period exceeds configured limit");
            return Err(HyperperiodError::TooLarge {
                value: hyper_period,
                limit,
            });
        }

        debug!(
            hyper_period,
            task_count,
            unique_periods = ?periods,
            "calculated hyper-period"
        );

        Ok(Self {
            hyper_period,
            unique_periods: periods,
            task_count,
        })
    }
}

/// End of the hyper-period window containing `time`:
/// `(floor(time / H) + 1) * H`.
pub fn window_end(time: f64, hyper_period: u64) -> f64 {
    let h = hyper_period as f64;
    ((time / h).floor() + 1.0) * h
}

// ── Tests ─────────────────────────────────────────────────────────────────────
