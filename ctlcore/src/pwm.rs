// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! PWM duty cycle computation.

use crate::timing::{Clock, Micros};

/// Width of the coarse duty register field.
const COARSE_BITS: u8 = 8;

/// Servo pulse length at 0 degrees.
pub const SERVO_MIN_PULSE: Micros = Micros(450);
/// Servo pulse length span from 0 to 180 degrees.
pub const SERVO_PULSE_SPAN: Micros = Micros(2000);
pub const SERVO_MAX_ANGLE: u8 = 180;

/// Duty value split into the coarse and fine register fields.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PwmDuty {
    value: u16,
    fine_bits: u8,
}

impl PwmDuty {
    /// Build a duty from a raw value. Saturates at the resolution maximum.
    pub const fn from_value(value: u16, resolution_bits: u8) -> Self {
        let max = Self::max_value(resolution_bits);
        let value = if value > max { max } else { value };
        let fine_bits = resolution_bits.saturating_sub(COARSE_BITS);
        Self { value, fine_bits }
    }

    pub const fn off(resolution_bits: u8) -> Self {
        Self::from_value(0, resolution_bits)
    }

    pub const fn full(resolution_bits: u8) -> Self {
        Self::from_value(Self::max_value(resolution_bits), resolution_bits)
    }

    const fn max_value(resolution_bits: u8) -> u16 {
        if resolution_bits >= 16 {
            u16::MAX
        } else {
            (1 << resolution_bits) - 1
        }
    }

    /// The complete duty value.
    #[inline]
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// The high order register field.
    #[inline]
    pub const fn coarse(&self) -> u16 {
        self.value >> self.fine_bits
    }

    /// The low order register field.
    #[inline]
    pub const fn fine(&self) -> u8 {
        (self.value & ((1 << self.fine_bits) - 1)) as u8
    }
}

/// Duty value for the given high time.
pub const fn compute_duty(clock: Clock, high_time: Micros, prescale: u16, resolution_bits: u8) -> PwmDuty {
    let counts = clock.counts(high_time, prescale);
    let value = if counts > u16::MAX as u64 {
        u16::MAX
    } else {
        counts as u16
    };
    PwmDuty::from_value(value, resolution_bits)
}

/// Servo pulse length for an angle in degrees.
/// Angles above 180 are clamped.
pub fn angle_to_pulse_us(angle: u8) -> Micros {
    let angle = angle.min(SERVO_MAX_ANGLE);
    SERVO_MIN_PULSE + Micros(angle as u32 * SERVO_PULSE_SPAN.0 / SERVO_MAX_ANGLE as u32)
}

/// Timebase of a PWM channel.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PwmTimebase {
    pub clock: Clock,
    pub prescale: u16,
    pub resolution_bits: u8,
}

impl PwmTimebase {
    pub const fn duty_for_us(&self, high_time: Micros) -> PwmDuty {
        compute_duty(self.clock, high_time, self.prescale, self.resolution_bits)
    }

    pub fn duty_for_angle(&self, angle: u8) -> PwmDuty {
        self.duty_for_us(angle_to_pulse_us(angle))
    }

    pub const fn off(&self) -> PwmDuty {
        PwmDuty::off(self.resolution_bits)
    }

    pub const fn full(&self) -> PwmDuty {
        PwmDuty::full(self.resolution_bits)
    }
}


// vim: ts=4 sw=4 expandtab
