/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task-to-processor partitioning (admission control).
//!
//! [`Partitioner`] places every task on exactly one processor using
//! **best-fit decreasing** on utilization:
//!
//! 1. Sort tasks by utilization, largest first.
//! 2. For each task, among processors with `1 - U_p >= u`, pick the one that
//!    leaves the smallest leftover `(1 - U_p) - u`.  Ties go to the
//!    lowest processor index.
//! 3. If no processor qualifies the whole attempt fails with
//!    [`PartitionError::Allocation`].
//!
//! Partitioning is all-or-nothing: the processors are taken by value and only
//! returned on success, so a failed attempt cannot leak a half-filled
//! platform.  Tasks never migrate once placed.

pub mod error;

pub use error::PartitionError;

use tracing::{debug, info, warn};

use crate::processor::Processor;
use crate::task::Task;

pub struct Partitioner {
    /// Used only for the post-partition EDF-VD feasibility warning.
    overrun_factor: f64,
}

impl Partitioner {
    pub fn new(overrun_factor: f64) -> Self {
        Self { overrun_factor }
    }

    /// Place `tasks` onto `processors`.
    ///
    /// # Errors
    /// * [`PartitionError::NoProcessors`] if `processors` is empty.
    /// * [`PartitionError::Allocation`] for the first task that fits nowhere.
    pub fn partition(
        &self,
        mut tasks: Vec<Task>,
        mut processors: Vec<Processor>,
    ) -> Result<Vec<Processor>, PartitionError> {
        if processors.is_empty() {
            return Err(PartitionError::NoProcessors);
        }

        info!(
            task_count = tasks.len(),
            processor_count = processors.len(),
            total_utilization = tasks.iter().map(Task::utilization).sum::<f64>(),
            "=== partitioning (best-fit decreasing) ==="
        );

        tasks.sort_by(|a, b| b.utilization().total_cmp(&a.utilization()));

        for task in tasks {
            match Self::find_best_fit(&task, &processors) {
                Some(idx) => {
                    debug!(
                        task = %task.id(),
                        processor = %processors[idx].id(),
                        leftover = processors[idx].remaining_capacity() - task.utilization(),
                        "best fit"
                    );
                    processors[idx].assign(task);
                }
                None => {
                    let largest_remaining = processors
                        .iter()
                        .map(Processor::remaining_capacity)
                        .fold(f64::NEG_INFINITY, f64::max);
                    warn!(
                        task = %task.id(),
                        utilization = task.utilization(),
                        largest_remaining,
                        "✗ task cannot be placed on any processor"
                    );
                    return Err(PartitionError::Allocation {
                        task: task.id(),
                        utilization: task.utilization(),
                        largest_remaining,
                    });
                }
            }
        }

        self.run_edf_vd_check(&processors);

        info!(
            utilizations = ?processors.iter().map(Processor::utilization_sum).collect::<Vec<_>>(),
            "=== partitioning complete ==="
        );
        Ok(processors)
    }

    /// Index of the processor with the smallest leftover that still fits
    /// `task`, or `None`.
    fn find_best_fit(task: &Task, processors: &[Processor]) -> Option<usize> {
        let u = task.utilization();
        let mut best: Option<(usize, f64)> = None;

        for (idx, p) in processors.iter().enumerate() {
            let remaining = p.remaining_capacity();
            if remaining < u {
                continue;
            }
            let leftover = remaining - u;
            if best.map_or(true, |(_, b)| leftover < b) {
                best = Some((idx, leftover));
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// Emit a warning for every processor whose task set fails the EDF-VD
    /// sufficient test.  The partition is not invalidated.
    fn run_edf_vd_check(&self, processors: &[Processor]) {
        for p in processors {
            let a = p.analysis(self.overrun_factor);
            if !a.is_schedulable() {
                warn!(
                    processor = %p.id(),
                    u_low = a.u_low,
                    u_high = a.u_high,
                    scaling_factor = a.scaling_factor,
                    high_mode_load = a.high_mode_load,
                    "task set may not be EDF-VD schedulable after a mode switch"
                );
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ProcessorId, TaskId};
    use crate::task::Criticality;

    fn task(id: u64, u: f64) -> Task {
        Task::new(TaskId(id), 10, u, Criticality::Low).unwrap()
    }

    fn processors(n: u32) -> Vec<Processor> {
        (1..=n).map(|i| Processor::new(ProcessorId(i), 0.0)).collect()
    }

    fn placement(ps: &[Processor]) -> Vec<Vec<u64>> {
        ps.iter()
            .map(|p| p.tasks().iter().map(|t| t.id().0).collect())
            .collect()
    }

    #[test]
    fn best_fit_picks_tightest_processor() {
        // 0.6 → P1; 0.5 → P2; 0.4 fits only P1 (0.4 left) or P2 (0.5 left):
        // best fit is P1 (leftover 0.0).
        let tasks = vec![task(1, 0.6), task(2, 0.5), task(3, 0.4)];
        let ps = Partitioner::new(2.0).partition(tasks, processors(2)).unwrap();
        assert_eq!(placement(&ps), vec![vec![1, 3], vec![2]]);
    }

    #[test]
    fn tasks_are_placed_largest_first_regardless_of_input_order() {
        let tasks = vec![task(1, 0.2), task(2, 0.9), task(3, 0.3)];
        let ps = Partitioner::new(2.0).partition(tasks, processors(2)).unwrap();
        // 0.9 → P1; 0.3 → P2 (P1 has only 0.1); 0.2 → P2 (leftover 0.5).
        assert_eq!(placement(&ps), vec![vec![2], vec![3, 1]]);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let ps = Partitioner::new(2.0)
            .partition(vec![task(1, 0.5)], processors(3))
            .unwrap();
        assert_eq!(placement(&ps), vec![vec![1], vec![], vec![]]);
    }

    #[test]
    fn every_processor_stays_within_capacity() {
        let tasks: Vec<Task> = (1..=10).map(|i| task(i, 0.05 * i as f64)).collect();
        let ps = Partitioner::new(2.0).partition(tasks, processors(4)).unwrap();
        let placed: usize = ps.iter().map(|p| p.tasks().len()).sum();
        assert_eq!(placed, 10);
        for p in &ps {
            let sum: f64 = p.tasks().iter().map(Task::utilization).sum();
            assert!(sum <= 1.0 + 1e-9, "{} overloaded: {sum}", p.id());
        }
    }

    #[test]
    fn unplaceable_task_aborts_with_allocation_error() {
        let tasks = vec![task(1, 0.7), task(2, 0.7), task(3, 0.7)];
        let err = Partitioner::new(2.0)
            .partition(tasks, processors(2))
            .unwrap_err();
        match err {
            PartitionError::Allocation {
                task,
                utilization,
                largest_remaining,
            } => {
                assert_eq!(task, TaskId(3));
                assert!((utilization - 0.7).abs() < 1e-12);
                assert!((largest_remaining - 0.3).abs() < 1e-9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exact_fit_is_accepted() {
        let tasks = vec![task(1, 0.5), task(2, 0.5)];
        let ps = Partitioner::new(2.0).partition(tasks, processors(1)).unwrap();
        assert_eq!(ps[0].tasks().len(), 2);
    }

    #[test]
    fn no_processors_is_an_error() {
        let err = Partitioner::new(2.0)
            .partition(vec![task(1, 0.1)], Vec::new())
            .unwrap_err();
        assert_eq!(err, PartitionError::NoProcessors);
    }

    #[test]
    fn empty_task_list_leaves_processors_empty() {
        let ps = Partitioner::new(2.0).partition(Vec::new(), processors(2)).unwrap();
        assert!(ps.iter().all(|p| p.tasks().is_empty()));
    }
}
