/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Quality-of-service score of best-effort work.
//!
//! Only low-criticality jobs are scored: periodic jobs of low-criticality
//! tasks and every aperiodic job.  A job with no recorded finish is
//! skipped.
//!
//! | Finish | Score |
//! |---|---|
//! | `<= deadline` | `100` |
//! | `deadline + d` | `max(0, 100 - 10 * d)` |
//!
//! The result is the arithmetic mean over scored jobs.  Dropped jobs carry a
//! finish at their release time and therefore score `100`.

use thiserror::Error;
use tracing::debug;

use crate::job::Job;
use crate::task::Criticality;

pub const MAX_SCORE: f64 = 100.0;

/// Points lost per time unit of lateness.
pub const LATENESS_PENALTY: f64 = 10.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QosError {
    #[error("no finished low-criticality job to score")]
    NoScoredJobs,
}

/// Score of one finished job, `None` if it never finished.
pub fn job_score(job: &Job) -> Option<f64> {
    let finish = job.finish_time()?;
    let lateness = finish - job.deadline();
    if lateness <= 0.0 {
        Some(MAX_SCORE)
    } else {
        Some((MAX_SCORE - LATENESS_PENALTY * lateness).max(0.0))
    }
}

/// Mean QoS over the low-criticality jobs in `jobs`.
///
/// # Errors
/// [`QosError::NoScoredJobs`] when no low-criticality job has finished.
pub fn evaluate<'a, I>(jobs: I) -> Result<f64, QosError>
where
    I: IntoIterator<Item = &'a Job>,
{
    let (sum, count) = jobs
        .into_iter()
        .filter(|j| j.criticality() == Criticality::Low)
        .filter_map(job_score)
        .fold((0.0, 0usize), |(sum, n), s| (sum + s, n + 1));

    if count == 0 {
        return Err(QosError::NoScoredJobs);
    }
    let qos = sum / count as f64;
    debug!(scored = count, qos, "QoS evaluated");
    Ok(qos)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{JobId, TaskId};
    use crate::task::Task;

    fn finished_aperiodic(id: u64, release: f64, relative: f64, finish: f64) -> Job {
        let mut job = Job::aperiodic(JobId(id), release, relative).unwrap();
        job.start_segment(finish - job.execution_time());
        job.complete(finish);
        job
    }

    #[test]
    fn on_time_and_five_late_average_to_75() {
        let a = finished_aperiodic(1, 0.0, 10.0, 10.0);
        let b = finished_aperiodic(2, 0.0, 10.0, 15.0);
        let qos = evaluate([&a, &b]).unwrap();
        assert!((qos - 75.0).abs() < 1e-12);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let jobs = vec![
            finished_aperiodic(1, 0.0, 10.0, 10.0),
            finished_aperiodic(2, 0.0, 10.0, 13.5),
        ];
        let first = evaluate(&jobs).unwrap();
        let second = evaluate(&jobs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn score_is_floored_at_zero() {
        let job = finished_aperiodic(1, 0.0, 10.0, 40.0);
        assert_eq!(job_score(&job), Some(0.0));
    }

    #[test]
    fn high_criticality_and_unfinished_jobs_are_ignored() {
        let hi_task = Task::new(TaskId(1), 10, 0.2, Criticality::High).unwrap();
        let mut hi = Job::periodic(JobId(1), &hi_task, 0.0, 1, false, 2.0).unwrap();
        hi.start_segment(50.0);
        hi.complete(52.0);
        let unfinished = Job::aperiodic(JobId(2), 0.0, 10.0).unwrap();
        let ok = finished_aperiodic(3, 0.0, 10.0, 8.0);

        assert_eq!(evaluate([&hi, &unfinished, &ok]), Ok(100.0));
    }

    #[test]
    fn dropped_low_job_scores_full_marks() {
        let lo_task = Task::new(TaskId(1), 10, 0.2, Criticality::Low).unwrap();
        let mut job = Job::periodic(JobId(1), &lo_task, 20.0, 3, false, 2.0).unwrap();
        job.drop_job();
        assert_eq!(job_score(&job), Some(100.0));
    }

    #[test]
    fn nothing_to_score_is_an_error() {
        let none: [Job; 0] = [];
        assert_eq!(evaluate(&none), Err(QosError::NoScoredJobs));
        let unfinished = Job::aperiodic(JobId(1), 0.0, 10.0).unwrap();
        assert_eq!(evaluate([&unfinished]), Err(QosError::NoScoredJobs));
    }
}
