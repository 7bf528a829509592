// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Servo range sweep, run by the main loop.

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SweepStep {
    pub angle: u8,
    pub dwell_ms: u16,
}

const fn step(angle: u8, dwell_ms: u16) -> SweepStep {
    SweepStep { angle, dwell_ms }
}

const DWELL_MS: u16 = 600;
const PARK_MS: u16 = 100;

/// Number of range states.
pub const RANGE_STATES: u8 = 5;

static RANGE1: [SweepStep; 2] = [step(180, DWELL_MS), step(90, DWELL_MS)];
static RANGE2: [SweepStep; 2] = [step(180, DWELL_MS), step(0, DWELL_MS)];
static RANGE3: [SweepStep; 2] = [step(90, DWELL_MS), step(0, DWELL_MS)];
static RANGE4: [SweepStep; 2] = [step(135, DWELL_MS), step(45, DWELL_MS)];
// Parked in the middle.
static RANGE5: [SweepStep; 1] = [step(90, PARK_MS)];

/// One sweep cycle of a range state (1..=5).
pub fn sweep_steps(range: u8) -> &'static [SweepStep] {
    match range {
        1 => &RANGE1,
        2 => &RANGE2,
        3 => &RANGE3,
        4 => &RANGE4,
        5 => &RANGE5,
        _ => &[],
    }
}

/// The range state following `range`.
pub fn next_range(range: u8) -> u8 {
    range % RANGE_STATES + 1
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_steps() {
        assert_eq!(sweep_steps(1), [step(180, 600), step(90, 600)]);
        assert_eq!(sweep_steps(4)[1].angle, 45);
        assert_eq!(sweep_steps(5), [step(90, 100)]);
        assert!(sweep_steps(0).is_empty());
        assert!(sweep_steps(6).is_empty());
    }

    #[test]
    fn test_next_range() {
        assert_eq!(next_range(1), 2);
        assert_eq!(next_range(4), 5);
        assert_eq!(next_range(5), 1);
    }
}

// vim: ts=4 sw=4 expandtab
