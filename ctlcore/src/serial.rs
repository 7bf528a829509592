// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serial line engine.
//!
//! Assembles received bytes into an edited line and hands completed
//! lines to a callback. Replies are formatted into a small fixed buffer.

use crate::{
    ctx::{LowCell, LowCtx, LowRefCell},
    debug::Debug,
    hal::SerialPort,
};
use core::convert::Infallible;
use ufmt::uWrite;

/// Line buffer size. One byte is reserved, so at most 63 bytes are stored.
pub const LINE_CAPACITY: usize = 64;

/// Size of a formatted reply.
pub const TX_LINE_SIZE: usize = 48;

const DEL: u8 = 0x7F;
const CR: u8 = b'\r';
const LF: u8 = b'\n';
const IGNORE: u8 = 0xFF;

pub struct LineBuffer {
    buf: [u8; LINE_CAPACITY],
    len: u8,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_CAPACITY],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    fn push(&mut self, data: u8) -> bool {
        if self.len() < LINE_CAPACITY - 1 {
            self.buf[self.len()] = data;
            self.len += 1;
            true
        } else {
            false
        }
    }

    fn pop(&mut self) -> bool {
        if self.is_empty() {
            false
        } else {
            self.len -= 1;
            true
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for the transmitter and send one byte.
pub fn send_byte(hal: &impl SerialPort, data: u8) {
    while !hal.try_transmit(data) {}
}

pub fn send_bytes(hal: &impl SerialPort, data: &[u8]) {
    for b in data {
        send_byte(hal, *b);
    }
}

/// Fixed size reply buffer. Text beyond the buffer size is truncated.
pub struct TxLine {
    buf: [u8; TX_LINE_SIZE],
    len: usize,
}

impl TxLine {
    pub const fn new() -> Self {
        Self {
            buf: [0; TX_LINE_SIZE],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn send(&self, hal: &impl SerialPort) {
        send_bytes(hal, self.as_bytes());
    }
}

impl Default for TxLine {
    fn default() -> Self {
        Self::new()
    }
}

impl uWrite for TxLine {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        let count = s.len().min(TX_LINE_SIZE - self.len);
        self.buf[self.len..self.len + count].copy_from_slice(&s.as_bytes()[..count]);
        self.len += count;
        Ok(())
    }
}

/// Format a line and transmit it.
pub fn reply(hal: &impl SerialPort, f: impl FnOnce(&mut TxLine) -> Result<(), Infallible>) {
    let mut line = TxLine::new();
    let Ok(()) = f(&mut line);
    line.send(hal);
}

/// Receive side line editor. Owned by the low priority context.
pub struct LineEngine {
    line: LowRefCell<LineBuffer>,
    /// The last received byte, including discarded ones.
    last: LowCell<u8>,
}

impl LineEngine {
    pub const fn new() -> Self {
        Self {
            line: LowRefCell::new(LineBuffer::new()),
            last: LowCell::new(0),
        }
    }

    /// Handle one byte received notification.
    ///
    /// `on_line` is called with the line contents when a line completes.
    pub fn receive(&self, c: &LowCtx<'_>, hal: &impl SerialPort, on_line: impl FnOnce(&[u8])) {
        if hal.overrun_error() {
            Debug::RxOverrun.inc();
            hal.set_receiver_enabled(false);
            hal.set_receiver_enabled(true);
        }
        let framing = hal.framing_error();
        let data = hal.receive_byte();

        if framing {
            Debug::RxFraming.inc();
        } else {
            let last = self.last.get(c);
            Self::process(&mut self.line.borrow_mut(c), hal, data, last, on_line);
        }
        self.last.set(c, data);
    }

    fn process(
        line: &mut LineBuffer,
        hal: &impl SerialPort,
        data: u8,
        last: u8,
        on_line: impl FnOnce(&[u8]),
    ) {
        match data {
            DEL => {
                if line.pop() {
                    send_bytes(hal, b"\x08 \x08");
                }
            }
            CR | LF => {
                // Second half of CR LF.
                if data == LF && line.is_empty() && last == CR {
                    return;
                }
                send_byte(hal, b'\n');
                on_line(line.as_bytes());
                line.clear();
            }
            IGNORE => (),
            _ => {
                if line.push(data) {
                    send_byte(hal, data);
                } else {
                    Debug::RxDropped.inc();
                }
            }
        }
    }
}

impl Default for LineEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::MockHal;
    use std::{string::String, vec::Vec};

    fn pending_len(engine: &LineEngine, c: &LowCtx<'_>) -> usize {
        engine.line.borrow_mut(c).len()
    }

    fn feed(engine: &LineEngine, hal: &MockHal, bytes: &[u8]) -> Vec<String> {
        // SAFETY: Test owns the engine.
        let c = unsafe { LowCtx::new() };
        let mut lines = Vec::new();
        for b in bytes {
            hal.push_rx(*b);
            engine.receive(&c, hal, |l| lines.push(String::from_utf8_lossy(l).into_owned()));
        }
        lines
    }

    #[test]
    fn test_line() {
        let hal = MockHal::new();
        let e = LineEngine::new();
        let lines = feed(&e, &hal, b"90\n");
        assert_eq!(lines, ["90"]);
        assert_eq!(hal.take_tx(), "90\n");
    }

    #[test]
    fn test_backspace() {
        // SAFETY: Test owns the engine.
        let c = unsafe { LowCtx::new() };
        let hal = MockHal::new();
        let e = LineEngine::new();
        feed(&e, &hal, b"abc\x7f");
        assert_eq!(pending_len(&e, &c), 2);
        assert_eq!(hal.take_tx(), "abc\x08 \x08");
        feed(&e, &hal, b"\x7f\x7f\x7f");
        assert_eq!(pending_len(&e, &c), 0);
        assert_eq!(hal.take_tx(), "\x08 \x08\x08 \x08");
        let lines = feed(&e, &hal, b"x\r");
        assert_eq!(lines, ["x"]);
    }

    #[test]
    fn test_crlf() {
        let hal = MockHal::new();
        let e = LineEngine::new();
        let lines = feed(&e, &hal, b"\r\n");
        assert_eq!(lines, [""]);
        assert_eq!(hal.take_tx(), "\n");

        let lines = feed(&e, &hal, b"\r");
        assert_eq!(lines, [""]);
        let lines = feed(&e, &hal, b"ab\n");
        assert_eq!(lines, ["ab"]);

        let lines = feed(&e, &hal, b"\n\n");
        assert_eq!(lines, ["", ""]);
    }

    #[test]
    fn test_full_buffer() {
        let hal = MockHal::new();
        let e = LineEngine::new();
        let input = [b'7'; 70];
        feed(&e, &hal, &input);
        assert_eq!(hal.take_tx().len(), LINE_CAPACITY - 1);
        let lines = feed(&e, &hal, b"\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), LINE_CAPACITY - 1);
    }

    #[test]
    fn test_rx_errors() {
        // SAFETY: Test owns the engine.
        let c = unsafe { LowCtx::new() };
        let hal = MockHal::new();
        let e = LineEngine::new();

        hal.push_rx_framing(b'x');
        e.receive(&c, &hal, |_| panic!());
        assert_eq!(pending_len(&e, &c), 0);
        assert_eq!(hal.take_tx(), "");

        hal.push_rx(0xFF);
        e.receive(&c, &hal, |_| panic!());
        assert_eq!(pending_len(&e, &c), 0);

        hal.set_overrun();
        hal.push_rx(b'5');
        e.receive(&c, &hal, |_| panic!());
        assert_eq!(hal.receiver_toggles(), [false, true]);
        assert_eq!(pending_len(&e, &c), 1);
        assert_eq!(hal.take_tx(), "5");
    }

    #[test]
    fn test_framing_records_last() {
        // SAFETY: Test owns the engine.
        let c = unsafe { LowCtx::new() };
        let hal = MockHal::new();
        let e = LineEngine::new();

        feed(&e, &hal, b"\r");
        // A garbled byte breaks the CR LF pair.
        hal.push_rx_framing(b'?');
        e.receive(&c, &hal, |_| ());
        let lines = feed(&e, &hal, b"\n");
        assert_eq!(lines, [""]);
    }

    #[test]
    fn test_tx_line_truncates() {
        let hal = MockHal::new();
        reply(&hal, |t| {
            for _ in 0..10 {
                t.write_str("0123456789")?;
            }
            Ok(())
        });
        assert_eq!(hal.take_tx().len(), TX_LINE_SIZE);

        reply(&hal, |t| ufmt::uwrite!(t, "Servo Angle:{}\n", 180_u8));
        assert_eq!(hal.take_tx(), "Servo Angle:180\n");
    }
}

// vim: ts=4 sw=4 expandtab
