/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured errors for task-to-processor partitioning.
//!
//! Every variant carries enough data to emit a fully-qualified `tracing`
//! event (task id, utilization, best remaining capacity) without further
//! lookups.  An allocation failure aborts one scenario run; the caller
//! decides whether to retry with new parameters or record the outcome.

use thiserror::Error;

use crate::ids::TaskId;

#[derive(Debug, Error, PartialEq)]
pub enum PartitionError {
    /// `partition()` was called without any processor.
    #[error("no processors available for partitioning")]
    NoProcessors,

    /// No processor had enough remaining capacity for this task.
    ///
    /// `largest_remaining` is the biggest free capacity over all processors
    /// at the moment of failure.
    #[error("cannot place task {task} (utilization {utilization:.4}): largest remaining capacity is {largest_remaining:.4}")]
    Allocation {
        task: TaskId,
        utilization: f64,
        largest_remaining: f64,
    },
}
