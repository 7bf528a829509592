// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer reload arithmetic.
//!
//! An overflow timer counts from the reload value up to its maximum count.
//! The reload value for a requested period is
//! `max - period / (tick * prescale) + 1`.

use derive_more::{Add, Sub};

/// Time span in microseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Add, Sub)]
pub struct Micros(pub u32);

impl Micros {
    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        Micros(ms * 1000)
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Micros(self.0.saturating_sub(other.0))
    }
}

/// Timer clock source.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Clock {
    hz: u32,
    cycles_per_tick: u32,
}

impl Clock {
    /// Oscillator frequency and the number of oscillator cycles per
    /// unprescaled timer tick.
    pub const fn new(hz: u32, cycles_per_tick: u32) -> Self {
        assert!(hz != 0);
        assert!(cycles_per_tick != 0);
        Self { hz, cycles_per_tick }
    }

    /// Number of prescaled timer counts in the given time span.
    /// Truncates toward zero.
    pub const fn counts(&self, time: Micros, prescale: u16) -> u64 {
        if prescale == 0 {
            return 0;
        }
        let num = time.0 as u64 * self.hz as u64;
        let den = 1_000_000 * self.cycles_per_tick as u64 * prescale as u64;
        num / den
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CounterWidth {
    Bits8,
    Bits16,
}

impl CounterWidth {
    /// Maximum count of the counter.
    pub const fn max(self) -> u16 {
        match self {
            CounterWidth::Bits8 => u8::MAX as u16,
            CounterWidth::Bits16 => u16::MAX,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TimingError {
    /// The counter cannot represent the period.
    PeriodTooLong,
    /// The period is shorter than one timer count.
    PeriodTooShort,
    ZeroPrescale,
}

/// Timer reload register value.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Reload {
    value: u16,
    width: CounterWidth,
}

impl Reload {
    #[inline]
    pub const fn value(&self) -> u16 {
        self.value
    }

    #[inline]
    pub const fn width(&self) -> CounterWidth {
        self.width
    }
}

pub const fn compute_reload(
    clock: Clock,
    period: Micros,
    prescale: u16,
    width: CounterWidth,
) -> Result<Reload, TimingError> {
    if prescale == 0 {
        return Err(TimingError::ZeroPrescale);
    }
    let counts = clock.counts(period, prescale);
    let max = width.max() as u64;
    if counts == 0 {
        Err(TimingError::PeriodTooShort)
    } else if counts > max + 1 {
        Err(TimingError::PeriodTooLong)
    } else {
        Ok(Reload {
            value: (max - counts + 1) as u16,
            width,
        })
    }
}

/// Compute a reload value at build time.
///
/// Panics (fails const evaluation) on an unrepresentable period.
pub const fn reload_const(clock: Clock, period: Micros, prescale: u16, width: CounterWidth) -> Reload {
    match compute_reload(clock, period, prescale, width) {
        Ok(reload) => reload,
        Err(TimingError::PeriodTooLong) => panic!("Timer period too long for the counter"),
        Err(TimingError::PeriodTooShort) => panic!("Timer period shorter than one count"),
        Err(TimingError::ZeroPrescale) => panic!("Timer prescaler is zero"),
    }
}


// vim: ts=4 sw=4 expandtab
