/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! EDF-VD schedulability analysis for one processor.
//!
//! # Status: warning only
//!
//! The analysis is **computed and logged** after partitioning.  A processor
//! that fails the test is still simulated; the simulation itself shows which
//! jobs miss their deadlines.
//!
//! # Theory
//! With `U_lo` / `U_hi` the low-mode utilizations of the low- and
//! high-criticality tasks, EDF-VD scales every high-criticality relative
//! deadline by
//!
//! $$x = \frac{U_{hi}}{1 - U_{lo}}$$
//!
//! which makes the low-mode demand `U_lo + U_hi / x` exactly `1`.  After a
//! mode switch the low-criticality work is dropped and high-criticality jobs
//! may demand `overrun_factor` times their budget.  The sufficient
//! high-mode condition is
//!
//! $$x \cdot U_{lo} + f \cdot U_{hi} \leq 1$$
//!
//! | Case | `x` |
//! |---|---|
//! | `U_lo >= 1` | `0` (no slack for high-criticality work) |
//! | no high-criticality tasks | `0` |
//! | `U_lo + U_hi = 1` | `1` |

use serde::Serialize;

use crate::task::Task;

/// Small slack on the high-mode inequality to absorb rounding.
const BOUND_TOLERANCE: f64 = 1e-9;

/// EDF-VD deadline scaling factor.
pub fn scaling_factor(u_low: f64, u_high: f64) -> f64 {
    if u_low >= 1.0 {
        0.0
    } else {
        u_high / (1.0 - u_low)
    }
}

/// Result of the EDF-VD test for one processor's task set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdfVdAnalysis {
    pub u_low: f64,
    pub u_high: f64,
    pub scaling_factor: f64,
    /// `x * U_lo + overrun_factor * U_hi`.
    pub high_mode_load: f64,
}

impl EdfVdAnalysis {
    pub fn for_tasks(tasks: &[Task], overrun_factor: f64) -> Self {
        let (u_low, u_high) = tasks.iter().fold((0.0, 0.0), |(lo, hi), t| {
            if t.is_high_criticality() {
                (lo, hi + t.utilization())
            } else {
                (lo + t.utilization(), hi)
            }
        });
        let x = scaling_factor(u_low, u_high);
        Self {
            u_low,
            u_high,
            scaling_factor: x,
            high_mode_load: x * u_low + overrun_factor * u_high,
        }
    }

    /// Low-mode total utilization.
    pub fn total_utilization(&self) -> f64 {
        self.u_low + self.u_high
    }

    /// `true` if both the low-mode (`U <= 1`) and high-mode conditions hold.
    pub fn is_schedulable(&self) -> bool {
        self.total_utilization() <= 1.0 + BOUND_TOLERANCE
            && self.high_mode_load <= 1.0 + BOUND_TOLERANCE
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
