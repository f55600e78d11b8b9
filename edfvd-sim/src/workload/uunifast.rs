/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! UUniFast utilization-vector generation with a bounded retry budget.
//!
//! Each attempt splits a running budget `U` into `N` shares:
//!
//! ```text
//! for remaining in N..=2:
//!     next   = budget * r^(1 / (remaining - 1)),  r ~ U(0, 1)
//!     emit     budget - next
//!     budget = next
//! emit budget
//! ```
//!
//! An attempt is rejected when any share falls outside `(0, 1]`.  After
//! `max_attempts` rejections the generator either recalls a vector cached
//! under the same `(N, U)` or reports [`GenerationError::Exhausted`].

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use super::GenerationError;
use crate::config::DEFAULT_MAX_GENERATION_ATTEMPTS;
use crate::memo::{UtilizationKey, UtilizationStore};

/// Tolerance on `sum(result) == target`.
pub const SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct UtilizationGenerator {
    max_attempts: u32,
}

impl UtilizationGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draw a vector of `task_count` utilizations summing to `target`.
    ///
    /// # Errors
    /// * [`GenerationError::InvalidParameters`] if no valid vector exists
    ///   (`task_count == 0`, `target <= 0` or `target > task_count`).
    /// * [`GenerationError::Exhausted`] if every attempt was rejected.
    pub fn generate<R>(
        &self,
        rng: &mut R,
        task_count: usize,
        target: f64,
    ) -> Result<Vec<f64>, GenerationError>
    where
        R: Rng + ?Sized,
    {
        check_parameters(task_count, target)?;

        for attempt in 1..=self.max_attempts {
            let candidate = uunifast(rng, task_count, target);
            if is_valid(&candidate, target) {
                debug!(task_count, target, attempt, "UUniFast vector accepted");
                return Ok(candidate);
            }
        }

        warn!(
            task_count,
            target,
            attempts = self.max_attempts,
            "UUniFast retry budget exhausted"
        );
        Err(GenerationError::Exhausted {
            task_count,
            target,
            attempts: self.max_attempts,
        })
    }

    /// [`generate`](Self::generate), caching every fresh vector in `store`
    /// and falling back to a cached one when the retry budget runs out.
    pub fn generate_with_store<R, S>(
        &self,
        rng: &mut R,
        task_count: usize,
        target: f64,
        store: &mut S,
    ) -> Result<Vec<f64>, GenerationError>
    where
        R: Rng + ?Sized,
        S: UtilizationStore + ?Sized,
    {
        let key = UtilizationKey::new(task_count, target);

        match self.generate(rng, task_count, target) {
            Ok(vector) => {
                store.put(&key, vector.clone());
                Ok(vector)
            }
            Err(GenerationError::Exhausted { .. }) => {
                let cached: Vec<Vec<f64>> = store
                    .get(&key)
                    .into_iter()
                    .filter(|v| v.len() == task_count && is_valid(v, target))
                    .collect();
                match cached.choose(rng) {
                    Some(vector) => {
                        info!(%key, candidates = cached.len(), "reusing memoized utilization vector");
                        Ok(vector.clone())
                    }
                    None => Err(GenerationError::Exhausted {
                        task_count,
                        target,
                        attempts: self.max_attempts,
                    }),
                }
            }
            Err(other) => Err(other),
        }
    }
}

impl Default for UtilizationGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GENERATION_ATTEMPTS)
    }
}

/// One UUniFast draw, without validation.
fn uunifast<R>(rng: &mut R, task_count: usize, target: f64) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    let mut shares = Vec::with_capacity(task_count);
    let mut budget = target;
    for remaining in (2..=task_count).rev() {
        let r: f64 = rng.random();
        let next = budget * r.powf(1.0 / (remaining - 1) as f64);
        shares.push(budget - next);
        budget = next;
    }
    shares.push(budget);
    shares
}

fn check_parameters(task_count: usize, target: f64) -> Result<(), GenerationError> {
    if task_count == 0 || !(target > 0.0 && target <= task_count as f64) {
        return Err(GenerationError::InvalidParameters { task_count, target });
    }
    Ok(())
}

fn is_valid(shares: &[f64], target: f64) -> bool {
    shares.iter().all(|&u| u > 0.0 && u <= 1.0)
        && (shares.iter().sum::<f64>() - target).abs() < SUM_TOLERANCE
}

// ── Tests ─────────────────────────────────────────────────────────────────────
