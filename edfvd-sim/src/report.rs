/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Presentation of finished runs.
//!
//! A [`ReportSink`] receives read-only snapshots once scheduling is done;
//! the pipeline never waits on it.  [`TracingReportSink`] writes the
//! execution timeline of each processor to the log, and [`timeline`] builds
//! the same rows for any other consumer.

use serde::Serialize;
use tracing::{debug, info};

use crate::ids::JobId;
use crate::job::{Job, ERROR_MARGIN};
use crate::simulation::{ProcessorReport, SimulationReport};
use crate::task::Criticality;

pub trait ReportSink {
    fn processor(&mut self, processor: &ProcessorReport);

    fn unscheduled(&mut self, jobs: &[Job]);

    fn summary(&mut self, report: &SimulationReport);

    /// Feed a whole report through the three hooks.
    fn publish(&mut self, report: &SimulationReport) {
        for p in &report.processors {
            self.processor(p);
        }
        self.unscheduled(&report.unscheduled);
        self.summary(report);
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SegmentEnd {
    Preempted,
    Finished,
    Dropped,
}

/// One execution segment of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub job: JobId,
    pub criticality: Criticality,
    pub start: f64,
    pub finish: f64,
    /// Execution still owed after this segment.
    pub remaining: f64,
    pub end: SegmentEnd,
}

/// Every segment of `jobs`, ordered by start time (ties by job id).
pub fn timeline(jobs: &[Job]) -> Vec<TimelineRow> {
    let mut rows = Vec::new();
    for job in jobs {
        if job.is_dropped() {
            rows.push(TimelineRow {
                job: job.id(),
                criticality: job.criticality(),
                start: job.release_time(),
                finish: job.release_time(),
                remaining: 0.0,
                end: SegmentEnd::Dropped,
            });
            continue;
        }
        let mut remaining = job.execution_time();
        for (start, finish) in job.execution_intervals() {
            remaining -= finish - start;
            let done = remaining <= ERROR_MARGIN;
            rows.push(TimelineRow {
                job: job.id(),
                criticality: job.criticality(),
                start,
                finish,
                remaining: if done { 0.0 } else { remaining },
                end: if done {
                    SegmentEnd::Finished
                } else {
                    SegmentEnd::Preempted
                },
            });
        }
    }
    rows.sort_by(|a, b| a.start.total_cmp(&b.start).then_with(|| a.job.cmp(&b.job)));
    rows
}

// ── TracingReportSink ─────────────────────────────────────────────────────────

/// Logs timelines at `debug` and summaries at `info`.
#[derive(Debug, Default)]
pub struct TracingReportSink;

impl ReportSink for TracingReportSink {
    fn processor(&mut self, p: &ProcessorReport) {
        info!(
            processor = %p.id,
            tasks = p.tasks.len(),
            utilization_sum = p.utilization_sum,
            server_utilization = ?p.server_utilization,
            hyper_period = p.hyper_period,
            scaling_factor = p.analysis.scaling_factor,
            edf_vd_schedulable = p.analysis.is_schedulable(),
            "processor"
        );
        for t in &p.tasks {
            debug!(
                processor = %p.id,
                task = %t.id(),
                period = t.period(),
                utilization = t.utilization(),
                execution_time = t.execution_time(),
                criticality = ?t.criticality(),
                "  task"
            );
        }
        for row in timeline(&p.jobs) {
            match row.end {
                SegmentEnd::Preempted => debug!(
                    processor = %p.id,
                    job = %row.job,
                    start = row.start,
                    finish = row.finish,
                    "  {} [{:.3}, {:.3}] preempted, remaining {:.3}",
                    row.job, row.start, row.finish, row.remaining
                ),
                SegmentEnd::Finished => debug!(
                    processor = %p.id,
                    job = %row.job,
                    "  {} [{:.3}, {:.3}] finished",
                    row.job, row.start, row.finish
                ),
                SegmentEnd::Dropped => debug!(
                    processor = %p.id,
                    job = %row.job,
                    "  {} dropped at {:.3}",
                    row.job, row.start
                ),
            }
        }
        info!(
            processor = %p.id,
            completed = p.stats.completed,
            dropped = p.stats.dropped,
            high_misses = p.stats.high_criticality_misses,
            low_misses = p.stats.low_criticality_misses,
            preemptions = p.stats.preemptions,
            mode_switches = p.stats.mode_switches,
            "processor schedule"
        );
    }

    fn unscheduled(&mut self, jobs: &[Job]) {
        for job in jobs {
            debug!(
                job = %job.id(),
                release = job.release_time(),
                deadline = job.deadline(),
                "unscheduled aperiodic job"
            );
        }
    }

    fn summary(&mut self, report: &SimulationReport) {
        let totals = report.totals();
        match report.qos {
            Some(qos) => info!(
                qos,
                deadline_misses = totals.deadline_misses(),
                dropped = totals.dropped,
                unscheduled = report.unscheduled.len(),
                "run summary"
            ),
            None => info!(
                deadline_misses = totals.deadline_misses(),
                dropped = totals.dropped,
                unscheduled = report.unscheduled.len(),
                "run summary (QoS undefined)"
            ),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{JobId, ProcessorId, TaskId};
    use crate::scheduler::Scheduler;
    use crate::task::Task;

    #[test]
    fn preempted_job_shows_two_segments() {
        let t = Task::new(TaskId(1), 100, 0.1, Criticality::Low).unwrap();
        let jobs = vec![
            Job::periodic(JobId(1), &t, 0.0, 1, false, 10.0).unwrap(),
            Job::aperiodic(JobId(2), 2.0, 10.0).unwrap(),
        ];
        let schedule = Scheduler::new(ProcessorId(1), 100).run(jobs);
        let rows = timeline(schedule.jobs());

        let summary: Vec<(u64, f64, f64, SegmentEnd)> = rows
            .iter()
            .map(|r| (r.job.0, r.start, r.finish, r.end))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, 0.0, 2.0, SegmentEnd::Preempted),
                (2, 2.0, 7.0, SegmentEnd::Finished),
                (1, 7.0, 15.0, SegmentEnd::Finished),
            ]
        );
        assert!((rows[0].remaining - 8.0).abs() < 1e-12);
    }

    #[test]
    fn dropped_job_is_a_single_point() {
        let t = Task::new(TaskId(1), 10, 0.1, Criticality::Low).unwrap();
        let mut job = Job::periodic(JobId(1), &t, 10.0, 2, false, 1.0).unwrap();
        job.drop_job();
        let rows = timeline(&[job]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].end, SegmentEnd::Dropped);
        assert_eq!((rows[0].start, rows[0].finish), (10.0, 10.0));
    }

    #[derive(Default)]
    struct Counting {
        processors: usize,
        unscheduled: usize,
        summaries: usize,
    }

    impl ReportSink for Counting {
        fn processor(&mut self, _: &ProcessorReport) {
            self.processors += 1;
        }
        fn unscheduled(&mut self, jobs: &[Job]) {
            self.unscheduled += jobs.len();
        }
        fn summary(&mut self, _: &SimulationReport) {
            self.summaries += 1;
        }
    }

    #[test]
    fn publish_visits_every_part_once() {
        let report = SimulationReport {
            seed: None,
            hyper_period: 0,
            processors: Vec::new(),
            unscheduled: vec![Job::aperiodic(JobId(1), 0.0, 10.0).unwrap()],
            qos: None,
        };
        let mut sink = Counting::default();
        sink.publish(&report);
        assert_eq!(sink.processors, 0);
        assert_eq!(sink.unscheduled, 1);
        assert_eq!(sink.summaries, 1);
        TracingReportSink.publish(&report);
    }
}
