/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Integer helpers for hyper-period arithmetic: GCD and checked LCM.

use super::HyperperiodError;

/// Iterative Euclidean GCD.  `gcd(0, n) == n`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// LCM of two periods, `Err(Overflow)` if it does not fit in `u64`.
///
/// Zero operands yield `Ok(0)`.
pub fn lcm(a: u64, b: u64) -> Result<u64, HyperperiodError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(HyperperiodError::Overflow { a, b })
}

/// Fold a sequence of periods into their LCM.  An empty sequence gives `0`.
pub fn lcm_of_periods<I>(periods: I) -> Result<u64, HyperperiodError>
where
    I: IntoIterator<Item = u64>,
{
    let mut iter = periods.into_iter();
    let Some(first) = iter.next() else {
        return Ok(0);
    };
    iter.try_fold(first, lcm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_of_admissible_periods() {
        assert_eq!(gcd(40, 30), 10);
        assert_eq!(gcd(50, 20), 10);
        assert_eq!(gcd(17, 13), 1);
        assert_eq!(gcd(0, 9), 9);
        assert_eq!(gcd(9, 0), 9);
    }

    #[test]
    fn lcm_pairs() {
        assert_eq!(lcm(40, 30).unwrap(), 120);
        assert_eq!(lcm(10, 50).unwrap(), 50);
        assert_eq!(lcm(0, 50).unwrap(), 0);
    }

    #[test]
    fn lcm_overflow_is_reported() {
        let a = u64::MAX / 2 + 1;
        let b = u64::MAX / 2 + 3;
        assert!(matches!(lcm(a, b), Err(HyperperiodError::Overflow { .. })));
    }

    #[test]
    fn default_period_set_repeats_every_600() {
        assert_eq!(lcm_of_periods([10, 20, 30, 40, 50]).unwrap(), 600);
    }

    #[test]
    fn empty_and_single_period_sets() {
        assert_eq!(lcm_of_periods(std::iter::empty()).unwrap(), 0);
        assert_eq!(lcm_of_periods([35]).unwrap(), 35);
    }
}
