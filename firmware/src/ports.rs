// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

use crate::hw::mcu;
use ctlcore::ctx::MainInitCtx;

fn pin_input(_bit: usize) -> u8 {
    0
}
fn pin_output(bit: usize) -> u8 {
    1 << bit
}
fn pin_low(_bit: usize) -> u8 {
    0
}
fn pin_floating(_bit: usize) -> u8 {
    0
}
fn pin_pullup(bit: usize) -> u8 {
    1 << bit
}

#[allow(non_snake_case)]
pub struct Ports<'a> {
    pub PORTA: &'a mcu::PORTA,
    pub PORTB: &'a mcu::PORTB,
    pub PORTD: &'a mcu::PORTD,
}

impl Ports<'_> {
    pub fn setup(&self, _: &MainInitCtx) {
        // SAFETY: Called with interrupts disabled. Ensured by &MainInitCtx.
        unsafe {
            self.PORTA.porta().write(|w| {
                w.bits(
                    pin_low(0) | // LED0
                    pin_low(1) | // LED1
                    pin_low(2) | // LED2
                    pin_low(3), // LED3
                )
            });
            self.PORTA.ddra().write(|w| {
                w.bits(
                    pin_output(0) | // LED0
                    pin_output(1) | // LED1
                    pin_output(2) | // LED2
                    pin_output(3), // LED3
                )
            });

            self.PORTB.portb().write(|w| {
                w.bits(
                    pin_low(5) | // OC1A, servo
                    pin_low(6), // OC1B, LED PWM
                )
            });
            self.PORTB.ddrb().write(|w| {
                w.bits(
                    pin_output(5) | // OC1A, servo
                    pin_output(6), // OC1B, LED PWM
                )
            });

            self.PORTD.portd().write(|w| {
                w.bits(
                    pin_pullup(0) | // INT0, button to GND
                    pin_floating(1),
                )
            });
            self.PORTD.ddrd().write(|w| {
                w.bits(
                    pin_input(0) | // INT0, button to GND
                    pin_input(1),
                )
            });
        }
    }
}

// vim: ts=4 sw=4 expandtab
