/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Preemptive EDF-VD engine for one processor.
//!
//! [`Scheduler`] consumes a set of [`Job`]s and simulates them until none is
//! pending, recording every execution segment on the jobs themselves.  The
//! result is a [`Schedule`]: the jobs with their final history plus
//! [`ScheduleStats`].
//!
//! # Step
//!
//! | Phase | Action |
//! |---|---|
//! | Dispatch | Advance the clock to the earliest pending release if idle, start the released job with the earliest EDF deadline |
//! | Mode switch | An overrunning high-criticality job drops every pending low-criticality periodic job released up to the end of its hyper-period window |
//! | Preemption | A pending job released before the active one would finish, with a strictly earlier deadline, takes the processor at its release |
//! | Completion | Otherwise the active job runs to completion |
//!
//! # Determinism
//!
//! | Choice | Order |
//! |---|---|
//! | Dispatch | `(deadline, release, job id)` |
//! | Preemptor | `(release, deadline, job id)` |
//!
//! # Pool
//! Jobs live in a dense arena for the whole run; the pending set is a list
//! of arena indices.  Nothing is removed from the arena, so the returned
//! history covers completed and dropped jobs alike.

pub mod feasibility;

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, info};

use crate::hyperperiod::window_end;
use crate::ids::ProcessorId;
use crate::job::{Job, ERROR_MARGIN};
use crate::processor::Processor;
use crate::task::Criticality;

// ── Results ───────────────────────────────────────────────────────────────────

/// Counters collected during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleStats {
    /// Jobs that ran to completion (dropped jobs are not included).
    pub completed: usize,
    pub dropped: usize,
    /// High-criticality jobs finishing after their nominal deadline.
    pub high_criticality_misses: usize,
    /// Low-criticality periodic and aperiodic jobs finishing late.
    pub low_criticality_misses: usize,
    /// Segments cut short by an earlier-deadline arrival.
    pub preemptions: usize,
    /// Overrunning high-criticality jobs that triggered a switch.
    pub mode_switches: usize,
}

impl ScheduleStats {
    pub fn deadline_misses(&self) -> usize {
        self.high_criticality_misses + self.low_criticality_misses
    }
}

/// Outcome of one [`Scheduler::run`].
#[derive(Debug, Clone)]
pub struct Schedule {
    processor: ProcessorId,
    jobs: Vec<Job>,
    stats: ScheduleStats,
}

impl Schedule {
    pub fn processor(&self) -> ProcessorId {
        self.processor
    }

    /// Every job of the run, in input order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }

    pub fn stats(&self) -> &ScheduleStats {
        &self.stats
    }

    /// Jobs that finished after their nominal deadline.
    pub fn missed_jobs(&self) -> impl Iterator<Item = &Job> + '_ {
        self.jobs.iter().filter(|j| j.missed_deadline())
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// EDF-VD engine bound to one processor's hyper-period.
///
/// Stateless between runs: every call to [`run`](Self::run) owns its pool.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    processor: ProcessorId,
    hyper_period: u64,
}

impl Scheduler {
    pub fn new(processor: ProcessorId, hyper_period: u64) -> Self {
        Self {
            processor,
            hyper_period,
        }
    }

    pub fn for_processor(processor: &Processor) -> Self {
        Self::new(processor.id(), processor.hyper_period())
    }

    /// Simulate `jobs` until the pending pool is empty.
    pub fn run(&self, jobs: Vec<Job>) -> Schedule {
        let mut jobs = jobs;
        let mut pending: Vec<usize> = (0..jobs.len()).collect();
        let mut stats = ScheduleStats::default();
        let mut clock = 0.0_f64;
        // Set only when a preemptor takes over directly.
        let mut handover: Option<usize> = None;

        while !pending.is_empty() {
            let current = match handover.take() {
                Some(idx) => idx,
                None => {
                    let earliest_release = pending
                        .iter()
                        .map(|&i| jobs[i].release_time())
                        .fold(f64::INFINITY, f64::min);
                    clock = clock.max(earliest_release);
                    match Self::select_earliest_deadline(&jobs, &pending, clock) {
                        Some(idx) => idx,
                        None => break,
                    }
                }
            };

            jobs[current].start_segment(clock);

            if jobs[current].triggers_mode_switch() {
                self.switch_mode(&mut jobs, &mut pending, current, &mut stats);
            }

            let horizon = clock + jobs[current].remaining_execution_time();
            match Self::select_preemptor(&jobs, &pending, current, horizon) {
                Some(preemptor) => {
                    let at = jobs[preemptor].release_time().max(clock);
                    if at <= clock {
                        jobs[current].retract_segment();
                    } else {
                        jobs[current].stop_segment(at);
                        // Arrival exactly at completion: the job is done.
                        if jobs[current].remaining_execution_time() <= ERROR_MARGIN {
                            Self::retire(&mut pending, current);
                            stats.completed += 1;
                        } else {
                            stats.preemptions += 1;
                            debug!(
                                processor = %self.processor,
                                job = %jobs[current].id(),
                                by = %jobs[preemptor].id(),
                                at,
                                remaining = jobs[current].remaining_execution_time(),
                                "preempted"
                            );
                        }
                    }
                    clock = at;
                    handover = Some(preemptor);
                }
                None => {
                    clock += jobs[current].remaining_execution_time();
                    jobs[current].complete(clock);
                    Self::retire(&mut pending, current);
                    stats.completed += 1;
                }
            }
        }

        for job in jobs.iter().filter(|j| j.missed_deadline()) {
            match job.criticality() {
                Criticality::High => stats.high_criticality_misses += 1,
                Criticality::Low => stats.low_criticality_misses += 1,
            }
        }

        debug!(
            processor = %self.processor,
            jobs = jobs.len(),
            completed = stats.completed,
            dropped = stats.dropped,
            misses = stats.deadline_misses(),
            preemptions = stats.preemptions,
            mode_switches = stats.mode_switches,
            end = clock,
            "schedule finished"
        );

        Schedule {
            processor: self.processor,
            jobs,
            stats,
        }
    }

    // ── Steps ─────────────────────────────────────────────────────────────────

    /// Drop every pending low-criticality periodic job released up to the end
    /// of the hyper-period window containing the trigger's release.
    fn switch_mode(
        &self,
        jobs: &mut [Job],
        pending: &mut Vec<usize>,
        trigger: usize,
        stats: &mut ScheduleStats,
    ) {
        let release = jobs[trigger].release_time();
        let boundary = if self.hyper_period == 0 {
            f64::INFINITY
        } else {
            window_end(release, self.hyper_period)
        };

        let mut dropped = 0;
        pending.retain(|&idx| {
            let job = &mut jobs[idx];
            let droppable = job.is_periodic()
                && job.criticality() == Criticality::Low
                && job.release_time() <= boundary;
            if droppable {
                job.drop_job();
                dropped += 1;
                debug!(job = %job.id(), release = job.release_time(), "low-criticality job dropped");
            }
            !droppable
        });

        // A resumed trigger re-runs the check; only its first start counts.
        if jobs[trigger].start_intervals().len() == 1 {
            stats.mode_switches += 1;
            info!(
                processor = %self.processor,
                job = %jobs[trigger].id(),
                release,
                window_end = boundary,
                dropped,
                "mode switch: high-criticality overrun"
            );
        }
        stats.dropped += dropped;
    }

    /// Released job with the earliest EDF deadline.
    fn select_earliest_deadline(jobs: &[Job], pending: &[usize], clock: f64) -> Option<usize> {
        pending
            .iter()
            .copied()
            .filter(|&i| jobs[i].release_time() <= clock)
            .min_by(|&a, &b| dispatch_order(&jobs[a], &jobs[b]))
    }

    /// Earliest-released job that would arrive before `active` finishes and
    /// has a strictly earlier deadline.
    fn select_preemptor(
        jobs: &[Job],
        pending: &[usize],
        active: usize,
        horizon: f64,
    ) -> Option<usize> {
        let deadline = jobs[active].deadline();
        pending
            .iter()
            .copied()
            .filter(|&i| i != active)
            .filter(|&i| jobs[i].release_time() <= horizon && jobs[i].deadline() < deadline)
            .min_by(|&a, &b| preemption_order(&jobs[a], &jobs[b]))
    }

    fn retire(pending: &mut Vec<usize>, idx: usize) {
        pending.retain(|&i| i != idx);
    }
}

fn dispatch_order(a: &Job, b: &Job) -> Ordering {
    a.deadline()
        .total_cmp(&b.deadline())
        .then_with(|| a.release_time().total_cmp(&b.release_time()))
        .then_with(|| a.id().cmp(&b.id()))
}

fn preemption_order(a: &Job, b: &Job) -> Ordering {
    a.release_time()
        .total_cmp(&b.release_time())
        .then_with(|| a.deadline().total_cmp(&b.deadline()))
        .then_with(|| a.id().cmp(&b.id()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
