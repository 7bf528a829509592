// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording peripheral mock for the host tests.

use crate::{
    hal::{Analog, Delay, Irq, IrqSource, Output, Outputs, PwmOutput, SerialPort, Timer, Timers},
    leds::show4,
    pwm::PwmDuty,
    timing::Reload,
};
use std::{
    boxed::Box,
    cell::{Cell, RefCell},
    collections::VecDeque,
    string::String,
    vec::Vec,
};

pub struct MockHal {
    outputs: Cell<u8>,
    duties: RefCell<Vec<(PwmOutput, PwmDuty)>>,
    reloads: RefCell<Vec<(Timer, Reload)>>,
    pending: Cell<u8>,
    samples: RefCell<VecDeque<u16>>,
    conversions: Cell<u32>,
    delays: RefCell<Vec<u16>>,
    tx: RefCell<Vec<u8>>,
    tx_stall: Cell<u32>,
    /// Busy polls after each loaded byte.
    tx_hold: Cell<u32>,
    /// Runs right after a successful ready poll, like an interrupt would.
    tx_preempt: RefCell<Option<Box<dyn FnOnce(&MockHal)>>>,
    /// Received bytes with their framing error flag.
    rx: RefCell<VecDeque<(u8, bool)>>,
    overrun: Cell<bool>,
    receiver: RefCell<Vec<bool>>,
}

impl MockHal {
    pub fn new() -> Self {
        Self {
            outputs: Cell::new(0),
            duties: RefCell::new(Vec::new()),
            reloads: RefCell::new(Vec::new()),
            pending: Cell::new(0),
            samples: RefCell::new(VecDeque::new()),
            conversions: Cell::new(0),
            delays: RefCell::new(Vec::new()),
            tx: RefCell::new(Vec::new()),
            tx_stall: Cell::new(0),
            tx_hold: Cell::new(0),
            tx_preempt: RefCell::new(None),
            rx: RefCell::new(VecDeque::new()),
            overrun: Cell::new(false),
            receiver: RefCell::new(Vec::new()),
        }
    }

    pub fn raise(&self, source: IrqSource) {
        self.pending.set(self.pending.get() | source.mask());
    }

    pub fn show_leds(&self, value: u8) {
        show4(self, value);
    }

    /// Last duty written to an output.
    pub fn duty(&self, output: PwmOutput) -> Option<PwmDuty> {
        self.duties(output).last().copied()
    }

    pub fn duties(&self, output: PwmOutput) -> Vec<PwmDuty> {
        self.duties
            .borrow()
            .iter()
            .filter(|(o, _)| *o == output)
            .map(|(_, d)| *d)
            .collect()
    }

    /// Last reload written to a timer.
    pub fn reload(&self, timer: Timer) -> Option<Reload> {
        self.reloads
            .borrow()
            .iter()
            .rev()
            .find(|(t, _)| *t == timer)
            .map(|(_, r)| *r)
    }

    /// Number of reloads written to a timer.
    pub fn reloads(&self, timer: Timer) -> usize {
        self.reloads.borrow().iter().filter(|(t, _)| *t == timer).count()
    }

    pub fn push_sample(&self, raw: u16) {
        self.samples.borrow_mut().push_back(raw);
    }

    pub fn conversions_started(&self) -> u32 {
        self.conversions.get()
    }

    pub fn take_delays(&self) -> Vec<u16> {
        self.delays.take()
    }

    pub fn take_tx(&self) -> String {
        String::from_utf8_lossy(&self.tx.take()).into_owned()
    }

    /// Report the transmitter as busy for the next `polls` polls.
    pub fn stall_tx(&self, polls: u32) {
        self.tx_stall.set(polls);
    }

    /// Keep the transmitter busy for `polls` polls after each loaded byte.
    pub fn hold_tx(&self, polls: u32) {
        self.tx_hold.set(polls);
    }

    /// Run `f` after the next ready poll that reports ready.
    pub fn preempt_tx(&self, f: impl FnOnce(&MockHal) + 'static) {
        *self.tx_preempt.borrow_mut() = Some(Box::new(f));
    }

    fn poll_tx(&self) -> bool {
        let stall = self.tx_stall.get();
        if stall > 0 {
            self.tx_stall.set(stall - 1);
            false
        } else {
            true
        }
    }

    pub fn push_rx(&self, data: u8) {
        self.rx.borrow_mut().push_back((data, false));
    }

    pub fn push_rx_framing(&self, data: u8) {
        self.rx.borrow_mut().push_back((data, true));
    }

    pub fn set_overrun(&self) {
        self.overrun.set(true);
    }

    pub fn receiver_toggles(&self) -> Vec<bool> {
        self.receiver.borrow().clone()
    }
}

impl Outputs for MockHal {
    fn set_output(&self, pin: Output, level: bool) {
        let mask = 1 << pin as u8;
        let outputs = self.outputs.get() & !mask;
        self.outputs.set(if level { outputs | mask } else { outputs });
    }

    fn read_output(&self, pin: Output) -> bool {
        self.outputs.get() & (1 << pin as u8) != 0
    }
}

impl Analog for MockHal {
    fn start_conversion(&self) {
        self.conversions.set(self.conversions.get() + 1);
    }

    fn read_conversion(&self) -> u16 {
        self.samples.borrow_mut().pop_front().unwrap_or(0)
    }
}

impl SerialPort for MockHal {
    fn transmit_ready(&self) -> bool {
        let ready = self.poll_tx();
        if ready {
            let preempt = self.tx_preempt.take();
            if let Some(f) = preempt {
                f(self);
            }
        }
        ready
    }

    fn transmit_byte(&self, data: u8) {
        assert_eq!(self.tx_stall.get(), 0, "Transmit while busy");
        self.tx.borrow_mut().push(data);
        self.tx_stall.set(self.tx_hold.get());
    }

    fn try_transmit(&self, data: u8) -> bool {
        // A pending preemption can only run before the critical section.
        let preempt = self.tx_preempt.take();
        if let Some(f) = preempt {
            f(self);
        }
        if self.poll_tx() {
            self.transmit_byte(data);
            true
        } else {
            false
        }
    }

    fn receive_byte(&self) -> u8 {
        self.rx.borrow_mut().pop_front().map(|(data, _)| data).unwrap_or(0)
    }

    fn overrun_error(&self) -> bool {
        self.overrun.get()
    }

    fn framing_error(&self) -> bool {
        self.rx.borrow().front().is_some_and(|(_, framing)| *framing)
    }

    fn set_receiver_enabled(&self, enabled: bool) {
        if !enabled {
            self.overrun.set(false);
        }
        self.receiver.borrow_mut().push(enabled);
    }
}

impl Timers for MockHal {
    fn set_reload(&self, timer: Timer, reload: Reload) {
        self.reloads.borrow_mut().push((timer, reload));
    }

    fn set_duty(&self, output: PwmOutput, duty: PwmDuty) {
        self.duties.borrow_mut().push((output, duty));
    }
}

impl Irq for MockHal {
    fn pending(&self, source: IrqSource) -> bool {
        self.pending.get() & source.mask() != 0
    }

    fn clear_pending(&self, source: IrqSource) {
        self.pending.set(self.pending.get() & !source.mask());
    }
}

impl Delay for MockHal {
    fn delay_ms(&self, ms: u16) {
        self.delays.borrow_mut().push(ms);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::serial::send_bytes;

    #[test]
    fn test_tx_polls() {
        let hal = MockHal::new();
        hal.stall_tx(5);
        send_bytes(&hal, b"ok");
        assert_eq!(hal.take_tx(), "ok");
        assert!(hal.transmit_ready());
    }

    #[test]
    fn test_tx_preempted_by_high_level() {
        let hal = MockHal::new();
        hal.hold_tx(2);
        hal.preempt_tx(|hal| send_bytes(hal, b"Button1\r\n"));
        send_bytes(&hal, b"ab");
        assert_eq!(hal.take_tx(), "Button1\r\nab");
    }

    #[test]
    #[should_panic(expected = "Transmit while busy")]
    fn test_tx_split_poll_and_load() {
        let hal = MockHal::new();
        hal.hold_tx(2);
        hal.preempt_tx(|hal| send_bytes(hal, b"Button1\r\n"));
        if hal.transmit_ready() {
            hal.transmit_byte(b'a');
        }
    }
}

// vim: ts=4 sw=4 expandtab
