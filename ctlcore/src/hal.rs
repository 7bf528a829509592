// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Peripheral access primitives.
//!
//! The control core never touches registers itself.
//! The firmware implements these traits for the real chip
//! and the tests implement them with a recording mock.

use crate::{pwm::PwmDuty, timing::Reload};

/// Digital output of the LED bank.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Output {
    Led0,
    Led1,
    Led2,
    Led3,
}

impl Output {
    /// The LED bank, bit 0 first.
    pub const BANK: [Output; 4] = [Output::Led0, Output::Led1, Output::Led2, Output::Led3];
}

/// PWM compare output.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum PwmOutput {
    Servo,
    Led,
}

/// Reloadable overflow timer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Timer {
    /// 250 ms periodic tick.
    Periodic,
    /// 10 ms button hold-off tick.
    DebounceTick,
}

/// Interrupt source.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum IrqSource {
    ButtonEdge,
    Periodic,
    DebounceTick,
    Conversion,
    SerialRx,
}

impl IrqSource {
    /// Bit of this source in a pending mask.
    #[inline]
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }
}

pub trait Outputs {
    fn set_output(&self, pin: Output, level: bool);
    fn read_output(&self, pin: Output) -> bool;
}

pub trait Analog {
    fn start_conversion(&self);
    /// Read the last conversion result (0..=1023).
    fn read_conversion(&self) -> u16;
}

pub trait SerialPort {
    fn transmit_ready(&self) -> bool;
    fn transmit_byte(&self, data: u8);

    /// Load `data` if the transmitter is ready.
    ///
    /// The ready check and the data register write form one critical section,
    /// so a higher level cannot load a byte in between.
    fn try_transmit(&self, data: u8) -> bool {
        critical_section::with(|_| {
            if self.transmit_ready() {
                self.transmit_byte(data);
                true
            } else {
                false
            }
        })
    }

    fn receive_byte(&self) -> u8;
    /// Receiver overrun indicated.
    fn overrun_error(&self) -> bool;
    /// Framing error indicated for the byte that is about to be read.
    fn framing_error(&self) -> bool;
    fn set_receiver_enabled(&self, enabled: bool);
}

pub trait Timers {
    fn set_reload(&self, timer: Timer, reload: Reload);
    fn set_duty(&self, output: PwmOutput, duty: PwmDuty);
}

pub trait Irq {
    fn pending(&self, source: IrqSource) -> bool;
    fn clear_pending(&self, source: IrqSource);
}

pub trait Delay {
    /// Busy wait.
    fn delay_ms(&self, ms: u16);
}

/// All peripheral primitives the controller needs.
pub trait Hal: Outputs + Analog + SerialPort + Timers + Irq + Delay {}

impl<T: Outputs + Analog + SerialPort + Timers + Irq + Delay> Hal for T {}


// vim: ts=4 sw=4 expandtab
