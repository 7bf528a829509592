// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behavior selection.
//!
//! Each output resource is driven by exactly one mode.

/// Behavior of the 4 LED bank.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LedMode {
    Off,
    /// Sample as a 4 bit binary number.
    SampleBinary,
    /// Sample selects a window of a rolling pattern.
    SampleMarquee,
    /// Sample walks a single LED across the bank.
    SampleSingleMarquee,
    /// Sample quantized into ten states, shown in binary.
    SampleTenState,
    /// Sample selects a digit of the date sequence.
    SampleDate,
    /// Sample level times two plus the sample direction.
    SampleDirectionParity,
    /// Number of button presses.
    ButtonCount,
    /// 3 LED sequence, the button selects the speed.
    ButtonSequence3,
    /// 4 LED sequence, the button selects the speed.
    ButtonSequence4,
    /// Binary number received on the serial line.
    LineBinary,
}

/// Behavior of the servo PWM output.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ServoMode {
    Off,
    /// Sample selects the angle.
    SampleAngle,
    /// The button selects a range that is swept by the main loop.
    ButtonRangeSweep,
    /// Every button press advances the angle.
    ButtonStep,
    /// Angle received on the serial line.
    LineAngle,
}

/// Behavior of the LED PWM output.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PwmLedMode {
    Off,
    /// Sample selects the brightness.
    SampleBrightness,
    /// Sample zone selects the blink rate.
    SampleBlinkZones,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ConfigError {
    /// Two modes consume the serial line input.
    LineInputConflict,
}

/// The active modes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Modes {
    leds: LedMode,
    servo: ServoMode,
    pwm_led: PwmLedMode,
}

impl Modes {
    pub const fn new(leds: LedMode, servo: ServoMode, pwm_led: PwmLedMode) -> Result<Self, ConfigError> {
        if matches!(leds, LedMode::LineBinary) && matches!(servo, ServoMode::LineAngle) {
            return Err(ConfigError::LineInputConflict);
        }
        Ok(Self {
            leds,
            servo,
            pwm_led,
        })
    }

    /// Build time mode selection.
    ///
    /// Panics (fails const evaluation) on conflicting modes.
    pub const fn new_const(leds: LedMode, servo: ServoMode, pwm_led: PwmLedMode) -> Self {
        match Self::new(leds, servo, pwm_led) {
            Ok(modes) => modes,
            Err(ConfigError::LineInputConflict) => {
                panic!("LedMode::LineBinary and ServoMode::LineAngle both consume the serial line")
            }
        }
    }

    #[inline]
    pub const fn leds(&self) -> LedMode {
        self.leds
    }

    #[inline]
    pub const fn servo(&self) -> ServoMode {
        self.servo
    }

    #[inline]
    pub const fn pwm_led(&self) -> PwmLedMode {
        self.pwm_led
    }

    /// Number of LEDs in the button sequence, if a sequence mode is active.
    pub const fn sequence_len(&self) -> Option<u8> {
        match self.leds {
            LedMode::ButtonSequence3 => Some(3),
            LedMode::ButtonSequence4 => Some(4),
            _ => None,
        }
    }
}


// vim: ts=4 sw=4 expandtab
