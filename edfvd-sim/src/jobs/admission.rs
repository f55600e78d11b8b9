/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Trial admission of aperiodic jobs.
//!
//! A candidate is offered to the processors least-loaded first
//! (`utilization_sum` ascending, then processor id).  For each processor the
//! committed jobs plus the candidate are cloned and scheduled; the trial is
//! **infeasible** when a high-criticality job misses its nominal deadline
//! that did not miss it in the committed schedule.  Late low-criticality or
//! aperiodic work only lowers QoS and never causes a rejection.
//!
//! Trials never touch the committed history: a rejected candidate leaves
//! the processor exactly as it was, and an accepted one is appended to the
//! committed aperiodic jobs untouched by the trial run.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::JobFactory;
use crate::ids::{JobId, ProcessorId};
use crate::job::Job;
use crate::processor::Processor;
use crate::scheduler::Scheduler;
use crate::task::Criticality;

/// Result of admitting a batch of aperiodic jobs.
#[derive(Debug, Clone, Default)]
pub struct AdmissionOutcome {
    /// `(job, processor)` for every admitted job, in offer order.
    pub admitted: Vec<(JobId, ProcessorId)>,
    /// Jobs no processor accepted.  They keep their pristine history.
    pub unscheduled: Vec<Job>,
}

/// Why a trial run was refused.  Never leaves this module.
#[derive(Debug)]
pub(crate) struct InfeasibleTrialSchedule {
    processor: ProcessorId,
    newly_missed: Vec<JobId>,
}

impl JobFactory {
    /// Offer every job in `candidates` to `processors`, one at a time.
    pub fn admit_aperiodic(
        &self,
        processors: &mut [Processor],
        candidates: Vec<Job>,
    ) -> AdmissionOutcome {
        let mut order: Vec<usize> = (0..processors.len()).collect();
        order.sort_by(|&a, &b| {
            processors[a]
                .utilization_sum()
                .total_cmp(&processors[b].utilization_sum())
                .then_with(|| processors[a].id().cmp(&processors[b].id()))
        });

        let mut baselines: Vec<BTreeSet<JobId>> = processors
            .iter()
            .map(|p| high_criticality_misses(schedule_committed(p, None)))
            .collect();

        let mut outcome = AdmissionOutcome::default();
        let total = candidates.len();

        'candidates: for job in candidates {
            for &idx in &order {
                match trial(&processors[idx], &job, &baselines[idx]) {
                    Ok(misses) => {
                        debug!(job = %job.id(), processor = %processors[idx].id(), "aperiodic job admitted");
                        outcome.admitted.push((job.id(), processors[idx].id()));
                        baselines[idx] = misses;
                        processors[idx].admit_aperiodic(job);
                        continue 'candidates;
                    }
                    Err(infeasible) => {
                        debug!(
                            job = %job.id(),
                            processor = %infeasible.processor,
                            newly_missed = ?infeasible.newly_missed,
                            "trial schedule infeasible, rolled back"
                        );
                    }
                }
            }
            debug!(job = %job.id(), "aperiodic job left unscheduled");
            outcome.unscheduled.push(job);
        }

        info!(
            offered = total,
            admitted = outcome.admitted.len(),
            unscheduled = outcome.unscheduled.len(),
            "aperiodic admission complete"
        );
        outcome
    }
}

/// Schedule the processor's committed jobs, plus `extra` if given, on clones.
fn schedule_committed(processor: &Processor, extra: Option<&Job>) -> Vec<Job> {
    let jobs: Vec<Job> = processor
        .committed_jobs()
        .chain(extra)
        .cloned()
        .collect();
    Scheduler::for_processor(processor).run(jobs).into_jobs()
}

fn high_criticality_misses(jobs: Vec<Job>) -> BTreeSet<JobId> {
    jobs.iter()
        .filter(|j| j.criticality() == Criticality::High && j.missed_deadline())
        .map(Job::id)
        .collect()
}

/// Run one trial.  On success returns the high-criticality misses of the
/// trial schedule, the baseline for the next candidate.
fn trial(
    processor: &Processor,
    candidate: &Job,
    baseline: &BTreeSet<JobId>,
) -> Result<BTreeSet<JobId>, InfeasibleTrialSchedule> {
    let misses = high_criticality_misses(schedule_committed(processor, Some(candidate)));
    let newly_missed: Vec<JobId> = misses.difference(baseline).copied().collect();
    if newly_missed.is_empty() {
        Ok(misses)
    } else {
        Err(InfeasibleTrialSchedule {
            processor: processor.id(),
            newly_missed,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyperperiod::DEFAULT_HYPER_PERIOD_LIMIT;
    use crate::ids::{IdAllocator, TaskId};
    use crate::task::Task;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn factory() -> JobFactory {
        JobFactory::new(2.0, DEFAULT_HYPER_PERIOD_LIMIT)
    }

    /// Processor holding one task with committed jobs over its hyper-period.
    fn loaded_processor(id: u32, period: u64, u: f64, c: Criticality, ids: &IdAllocator) -> Processor {
        let mut rng = StdRng::seed_from_u64(0);
        let mut p = Processor::new(ProcessorId(id), 0.0);
        p.assign(Task::new(TaskId(id as u64), period, u, c).unwrap());
        factory().instantiate(&mut rng, ids, &mut p).unwrap();
        p
    }

    #[test]
    fn candidate_goes_to_least_loaded_processor() {
        let ids = IdAllocator::new();
        let mut ps = vec![
            loaded_processor(1, 10, 0.6, Criticality::Low, &ids),
            loaded_processor(2, 10, 0.2, Criticality::Low, &ids),
        ];
        let job = Job::aperiodic(ids.next_job_id(), 0.0, 20.0).unwrap();
        let outcome = factory().admit_aperiodic(&mut ps, vec![job]);

        assert_eq!(outcome.admitted.len(), 1);
        assert_eq!(outcome.admitted[0].1, ProcessorId(2));
        assert!(outcome.unscheduled.is_empty());
        assert_eq!(ps[1].aperiodic_jobs().len(), 1);
        assert!(ps[0].aperiodic_jobs().is_empty());
    }

    #[test]
    fn admitted_job_keeps_pristine_history() {
        let ids = IdAllocator::new();
        let mut ps = vec![loaded_processor(1, 10, 0.2, Criticality::Low, &ids)];
        let job = Job::aperiodic(ids.next_job_id(), 0.0, 20.0).unwrap();
        factory().admit_aperiodic(&mut ps, vec![job]);

        let committed = &ps[0].aperiodic_jobs()[0];
        assert!(committed.start_intervals().is_empty());
        assert_eq!(committed.remaining_execution_time(), 10.0);
        assert!(ps[0].periodic_jobs().iter().all(|j| j.start_intervals().is_empty()));
    }

    #[test]
    fn candidate_breaking_a_high_deadline_is_rolled_back() {
        let ids = IdAllocator::new();
        // High task: C = 9 every 10, virtual deadline 9 (x = 0.9).
        let mut ps = vec![loaded_processor(1, 10, 0.9, Criticality::High, &ids)];
        let before = ps[0].committed_jobs().cloned().collect::<Vec<_>>();

        // Deadline 4 < 9: runs first and pushes the high job to 11.
        let job = Job::aperiodic(ids.next_job_id(), 0.0, 4.0).unwrap();
        let outcome = factory().admit_aperiodic(&mut ps, vec![job.clone()]);

        assert!(outcome.admitted.is_empty());
        assert_eq!(outcome.unscheduled, vec![job]);
        let after = ps[0].committed_jobs().cloned().collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn rejected_candidate_is_offered_to_the_next_processor() {
        let ids = IdAllocator::new();
        let mut ps = vec![
            loaded_processor(1, 10, 0.9, Criticality::High, &ids),
            loaded_processor(2, 10, 0.95, Criticality::Low, &ids),
        ];
        let job = Job::aperiodic(ids.next_job_id(), 0.0, 4.0).unwrap();
        let outcome = factory().admit_aperiodic(&mut ps, vec![job]);

        // P1 is least loaded but refuses; P2 only has low work to delay.
        assert_eq!(outcome.admitted.len(), 1);
        assert_eq!(outcome.admitted[0].1, ProcessorId(2));
        assert!(ps[0].aperiodic_jobs().is_empty());
    }

    #[test]
    fn late_low_work_does_not_block_admission() {
        let ids = IdAllocator::new();
        let mut ps = vec![loaded_processor(1, 10, 1.0, Criticality::Low, &ids)];
        let job = Job::aperiodic(ids.next_job_id(), 0.0, 4.0).unwrap();
        let outcome = factory().admit_aperiodic(&mut ps, vec![job]);
        assert_eq!(outcome.admitted.len(), 1);
    }

    #[test]
    fn no_processors_leaves_everything_unscheduled() {
        let ids = IdAllocator::new();
        let jobs = vec![
            Job::aperiodic(ids.next_job_id(), 0.0, 10.0).unwrap(),
            Job::aperiodic(ids.next_job_id(), 5.0, 10.0).unwrap(),
        ];
        let outcome = factory().admit_aperiodic(&mut [], jobs);
        assert!(outcome.admitted.is_empty());
        assert_eq!(outcome.unscheduled.len(), 2);
    }
}
