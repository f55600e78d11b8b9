/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Random task-set synthesis: utilization vectors (UUniFast) and the task
//! pool built from them.

pub mod pool;
pub mod uunifast;

pub use pool::TaskPool;
pub use uunifast::UtilizationGenerator;

use thiserror::Error;

/// Failures while synthesising a task set.
#[derive(Debug, Error, PartialEq)]
pub enum GenerationError {
    /// UUniFast cannot satisfy `0 < u <= 1` for these parameters at all.
    #[error("cannot split utilization {target} over {task_count} task(s) with every share in (0, 1]")]
    InvalidParameters { task_count: usize, target: f64 },

    /// The retry budget ran out and no cached vector was available.
    #[error("UUniFast produced no valid vector for {task_count} task(s) at utilization {target} in {attempts} attempt(s)")]
    Exhausted {
        task_count: usize,
        target: f64,
        attempts: u32,
    },

    #[error("the admissible period set is empty")]
    EmptyPeriodSet,
}
