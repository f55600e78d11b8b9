/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Identity types and the id allocator shared by the generators.
//!
//! Every simulation owns one [`IdAllocator`]; there is no process-wide
//! counter.  The allocator is `Send + Sync` so per-processor work can be
//! fanned out to threads without changing how ids are handed out.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Identifier of a [`Task`](crate::task::Task).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TaskId(pub u64);

/// Identifier of a [`Job`](crate::job::Job).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct JobId(pub u64);

/// Identifier of a [`Processor`](crate::processor::Processor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProcessorId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Monotonic id source for tasks and jobs.
///
/// Task and job counters are independent and both start at `1`.
#[derive(Debug)]
pub struct IdAllocator {
    next_task: AtomicU64,
    next_job: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_task: AtomicU64::new(1),
            next_job: AtomicU64::new(1),
        }
    }

    pub fn next_task_id(&self) -> TaskId {
        TaskId(self.next_task.fetch_add(1, Ordering::Relaxed))
    }

    pub fn next_job_id(&self) -> JobId {
        JobId(self.next_job.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn ids_start_at_one_and_increase() {
        let ids = IdAllocator::new();
        assert_eq!(ids.next_task_id(), TaskId(1));
        assert_eq!(ids.next_task_id(), TaskId(2));
        assert_eq!(ids.next_job_id(), JobId(1));
        assert_eq!(ids.next_job_id(), JobId(2));
    }

    #[test]
    fn task_and_job_counters_are_independent() {
        let ids = IdAllocator::new();
        ids.next_job_id();
        ids.next_job_id();
        assert_eq!(ids.next_task_id(), TaskId(1));
    }

    #[test]
    fn concurrent_allocation_never_repeats() {
        let ids = Arc::new(IdAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..250).map(|_| ids.next_job_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 1_000);
    }

    #[test]
    fn display_uses_short_prefixes() {
        assert_eq!(TaskId(3).to_string(), "T3");
        assert_eq!(JobId(7).to_string(), "J7");
        assert_eq!(ProcessorId(2).to_string(), "P2");
    }
}
