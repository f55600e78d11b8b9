/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task pool: turns utilization and period samples into [`Task`]s.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use super::GenerationError;
use crate::ids::IdAllocator;
use crate::task::{Criticality, ModelError, Task};

#[derive(Debug, Clone, Copy)]
pub struct TaskPool {
    /// Bernoulli parameter of the high-criticality flag.
    high_criticality_probability: f64,
}

impl TaskPool {
    pub fn new(high_criticality_probability: f64) -> Self {
        Self {
            high_criticality_probability: high_criticality_probability.clamp(0.0, 1.0),
        }
    }

    /// Build one task per `(utilization, period)` pair, each with a fresh id
    /// and an independently drawn criticality.
    ///
    /// The result is sorted by utilization, largest first.  Extra entries in
    /// the longer of the two slices are ignored.
    pub fn build<R>(
        &self,
        rng: &mut R,
        ids: &IdAllocator,
        utilizations: &[f64],
        periods: &[u64],
    ) -> Result<Vec<Task>, ModelError>
    where
        R: Rng + ?Sized,
    {
        let mut tasks = utilizations
            .iter()
            .zip(periods)
            .map(|(&u, &period)| {
                let high = rng.random_bool(self.high_criticality_probability);
                Task::new(ids.next_task_id(), period, u, Criticality::from_high_flag(high))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tasks.sort_by(|a, b| b.utilization().total_cmp(&a.utilization()));

        debug!(
            task_count = tasks.len(),
            high = tasks.iter().filter(|t| t.is_high_criticality()).count(),
            "task pool built"
        );
        Ok(tasks)
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// Draw `n` values independently and uniformly from `set`.
pub fn sample_from_set<R>(rng: &mut R, n: usize, set: &[u64]) -> Result<Vec<u64>, GenerationError>
where
    R: Rng + ?Sized,
{
    (0..n)
        .map(|_| set.choose(rng).copied().ok_or(GenerationError::EmptyPeriodSet))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
