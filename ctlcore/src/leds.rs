// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::hal::{Output, Outputs};

/// Show the low 4 bits of a value on the LED bank. Bit 0 is LED0.
pub fn show4(hal: &impl Outputs, value: u8) {
    for (bit, pin) in Output::BANK.iter().enumerate() {
        hal.set_output(*pin, value & (1 << bit) != 0);
    }
}

/// Light the LED at `position` among the first `n` LEDs.
/// The other LEDs of the bank are untouched.
pub fn show_one_hot(hal: &impl Outputs, position: u8, n: u8) {
    for (i, pin) in Output::BANK.iter().take(n as usize).enumerate() {
        hal.set_output(*pin, i == position as usize);
    }
}

/// Read back the LED bank as a 4 bit value.
pub fn read4(hal: &impl Outputs) -> u8 {
    Output::BANK
        .iter()
        .enumerate()
        .fold(0, |acc, (bit, pin)| acc | ((hal.read_output(*pin) as u8) << bit))
}


// vim: ts=4 sw=4 expandtab
