// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Board configuration. Everything in here is evaluated at build time.

use ctlcore::{
    config::{LedMode, Modes, PwmLedMode, ServoMode},
    pwm::PwmTimebase,
    system::{Config, TickTimer},
    timing::{Clock, CounterWidth, Micros},
};

pub const CPU_HZ: u32 = 16_000_000;

/// The AVR timers count the prescaled CPU clock.
pub const CLOCK: Clock = Clock::new(CPU_HZ, 1);

pub const BAUD: u32 = 9600;
pub const UBRR: u16 = (CPU_HZ / (16 * BAUD) - 1) as u16;

/// Timer1: 10 bit fast PWM, 4 us per count.
pub const PWM_PRESCALE: u16 = 64;
/// Timer3: periodic sequence tick.
pub const PERIODIC_PRESCALE: u16 = 64;
/// Timer0: button hold-off tick.
pub const DEBOUNCE_PRESCALE: u16 = 1024;

const PWM: PwmTimebase = PwmTimebase {
    clock: CLOCK,
    prescale: PWM_PRESCALE,
    resolution_bits: 10,
};

pub const CONFIG: Config = Config {
    modes: Modes::new_const(LedMode::Off, ServoMode::LineAngle, PwmLedMode::Off),
    periodic: TickTimer::new(
        CLOCK,
        Micros::from_millis(250),
        PERIODIC_PRESCALE,
        CounterWidth::Bits16,
    ),
    debounce_tick: TickTimer::new(
        CLOCK,
        Micros::from_millis(10),
        DEBOUNCE_PRESCALE,
        CounterWidth::Bits8,
    ),
    servo: PWM,
    led_pwm: PWM,
};

// vim: ts=4 sw=4 expandtab
