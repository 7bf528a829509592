// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output policies.
//!
//! Pure mappings from a smoothed conversion value (and a little
//! mode local state) to output values.

use crate::timing::Micros;

/// Brightness pulse length at full scale.
const BRIGHTNESS_SPAN: Micros = Micros(4100);

/// Raw sample change that flips the direction indicator.
pub const DIRECTION_HYSTERESIS: u16 = 5;

/// The digit sequence shown by the seven state date display.
pub const DATE_DIGITS: [u8; 7] = [2, 0, 2, 5, 12, 0, 3];

/// Blink thresholds of the four sample zones, in conversion events.
pub const BLINK_THRESHOLDS: [u8; 4] = [50, 100, 150, 200];

/// 4 bit binary display level.
pub fn binary_level(smoothed: u16) -> u8 {
    (smoothed as u32 * 15 / 1023).min(15) as u8
}

/// Quantize a sample into one of `n` equally sized states.
pub fn quantize(smoothed: u16, n: u8) -> u8 {
    let n = n.max(1);
    (smoothed as u32 * n as u32 / 1024).min(n as u32 - 1) as u8
}

/// Four out of a rolling 0b1111_0000_1111 window.
pub fn marquee_pattern(smoothed: u16) -> u8 {
    let pos = smoothed as u32 * 8 / 1020;
    ((0b1111_0000_1111_u32 >> pos) & 0xF) as u8
}

/// Single LED walking across the bank.
/// The first and the last position show nothing.
pub fn single_marquee_pattern(smoothed: u16) -> u8 {
    match (smoothed / 171).min(5) {
        0 | 5 => 0,
        pos => 1 << (pos - 1),
    }
}

pub fn date_digit(smoothed: u16) -> u8 {
    DATE_DIGITS[quantize(smoothed, DATE_DIGITS.len() as u8) as usize]
}

/// Servo angle in degrees.
pub fn sample_to_angle(smoothed: u16) -> u8 {
    (smoothed as u32 * 180 / 1024) as u8
}

/// LED PWM high time.
pub fn sample_to_pulse(smoothed: u16) -> Micros {
    Micros(smoothed as u32 * BRIGHTNESS_SPAN.0 / 1024)
}

/// Update the direction indicator with hysteresis.
pub fn update_direction(increasing: bool, raw: u16, prev_raw: u16) -> bool {
    if raw > prev_raw + DIRECTION_HYSTERESIS {
        true
    } else if prev_raw > raw + DIRECTION_HYSTERESIS {
        false
    } else {
        increasing
    }
}

/// Eight level state, times two, plus the direction bit.
pub fn parity_display(smoothed: u16, increasing: bool) -> u8 {
    let state = (smoothed >> 7).min(7) as u8;
    state * 2 + increasing as u8
}

/// Zone dependent blinker.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BlinkState {
    zone: u8,
    counter: u8,
    on: bool,
}

impl BlinkState {
    pub const fn new() -> Self {
        Self {
            zone: 0,
            counter: 0,
            on: false,
        }
    }

    pub fn zone(smoothed: u16) -> u8 {
        (smoothed / 256).min(BLINK_THRESHOLDS.len() as u16 - 1) as u8
    }

    /// Count one conversion event.
    /// Returns the new output state, if it toggled.
    pub fn step(&mut self, smoothed: u16) -> Option<bool> {
        let zone = Self::zone(smoothed);
        if zone != self.zone {
            self.zone = zone;
            self.counter = 0;
        }
        self.counter += 1;
        if self.counter >= BLINK_THRESHOLDS[zone as usize] {
            self.counter = 0;
            self.on = !self.on;
            Some(self.on)
        } else {
            None
        }
    }
}

impl Default for BlinkState {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequence LED state: a walking one-hot position
/// with a button selectable speed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SeqLed {
    speed: u8,
    position: u8,
    counter: u8,
    threshold: u8,
}

impl SeqLed {
    pub const fn new() -> Self {
        Self {
            speed: 1,
            position: 0,
            counter: 0,
            threshold: 1,
        }
    }

    /// Periodic ticks per step for a speed state.
    fn threshold_for(n: u8, speed: u8) -> u8 {
        match (n, speed) {
            (3, 3) => 4,
            (_, s) => s,
        }
    }

    /// Advance the speed state of an `n` LED sequence.
    /// Returns the new speed state.
    pub fn press(&mut self, n: u8) -> u8 {
        self.speed = self.speed % n + 1;
        self.threshold = Self::threshold_for(n, self.speed);
        self.counter = 0;
        self.speed
    }

    /// Count one periodic tick.
    /// Returns the new position, if the sequence advanced.
    pub fn tick(&mut self, n: u8) -> Option<u8> {
        self.counter = self.counter.saturating_add(1);
        if self.counter >= self.threshold {
            self.counter = 0;
            self.position = (self.position + 1) % n;
            Some(self.position)
        } else {
            None
        }
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

impl Default for SeqLed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_binary_level() {
        assert_eq!(binary_level(0), 0);
        assert_eq!(binary_level(1023), 15);
        assert_eq!(binary_level(681), 9);
        assert_eq!(binary_level(682), 10);
        assert_eq!(binary_level(2000), 15);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0, 10), 0);
        assert_eq!(quantize(102, 10), 0);
        assert_eq!(quantize(103, 10), 1);
        assert_eq!(quantize(1023, 10), 9);
        assert_eq!(quantize(1023, 7), 6);
        assert_eq!(quantize(500, 0), 0);
        assert_eq!(date_digit(0), 2);
        assert_eq!(date_digit(600), 12);
        assert_eq!(date_digit(1023), 3);
    }

    #[test]
    fn test_marquee() {
        assert_eq!(marquee_pattern(0), 0b1111);
        assert_eq!(marquee_pattern(128), 0b0111);
        assert_eq!(marquee_pattern(512), 0b0000);
        assert_eq!(marquee_pattern(1023), 0b1111);

        assert_eq!(single_marquee_pattern(0), 0);
        assert_eq!(single_marquee_pattern(171), 0b0001);
        assert_eq!(single_marquee_pattern(342), 0b0010);
        assert_eq!(single_marquee_pattern(513), 0b0100);
        assert_eq!(single_marquee_pattern(684), 0b1000);
        assert_eq!(single_marquee_pattern(855), 0);
        assert_eq!(single_marquee_pattern(1023), 0);
    }

    #[test]
    fn test_sample_scaling() {
        assert_eq!(sample_to_angle(0), 0);
        assert_eq!(sample_to_angle(512), 90);
        assert_eq!(sample_to_angle(1023), 179);
        assert_eq!(sample_to_pulse(0), Micros(0));
        assert_eq!(sample_to_pulse(512), Micros(2050));
    }

    #[test]
    fn test_direction_parity() {
        let mut inc = true;
        let mut prev = 0;
        for raw in (100..1000).step_by(50) {
            inc = update_direction(inc, raw, prev);
            assert_eq!(parity_display(raw, inc) % 2, 1);
            prev = raw;
        }
        for raw in (0..900).rev().step_by(50) {
            inc = update_direction(inc, raw, prev);
            assert_eq!(parity_display(raw, inc) % 2, 0);
            prev = raw;
        }
        // Within hysteresis.
        assert!(!update_direction(false, 105, 100));
        assert!(update_direction(false, 106, 100));
        assert!(update_direction(true, 95, 100));
        assert!(!update_direction(true, 94, 100));
        assert_eq!(parity_display(1023, true), 15);
    }

    #[test]
    fn test_blink() {
        let mut b = BlinkState::new();
        for _ in 0..49 {
            assert_eq!(b.step(10), None);
        }
        assert_eq!(b.step(10), Some(true));
        for _ in 0..10 {
            assert_eq!(b.step(10), None);
        }
        // Zone change restarts the count.
        for _ in 0..199 {
            assert_eq!(b.step(1000), None);
        }
        assert_eq!(b.step(1000), Some(false));
        assert_eq!(BlinkState::zone(255), 0);
        assert_eq!(BlinkState::zone(256), 1);
    }

    #[test]
    fn test_seq_led() {
        let mut s = SeqLed::new();
        assert_eq!(s.tick(3), Some(1));
        assert_eq!(s.tick(3), Some(2));
        assert_eq!(s.tick(3), Some(0));

        assert_eq!(s.press(3), 2);
        assert_eq!(s.threshold(), 2);
        assert_eq!(s.press(3), 3);
        assert_eq!(s.threshold(), 4);
        for _ in 0..3 {
            assert_eq!(s.tick(3), None);
        }
        assert_eq!(s.tick(3), Some(1));
        assert_eq!(s.press(3), 1);
        assert_eq!(s.speed(), 1);

        let mut s = SeqLed::new();
        for expect in [2, 3, 4, 1] {
            assert_eq!(s.press(4), expect);
            assert_eq!(s.threshold(), expect);
        }
    }
}

// vim: ts=4 sw=4 expandtab
