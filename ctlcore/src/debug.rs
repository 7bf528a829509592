// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostic value table.

use crate::{hal::SerialPort, serial::reply};
use core::cell::Cell;
use critical_section::Mutex;

#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Debug {
    RawSample,
    Smoothed,
    ButtonCount,
    ServoAngle,
    RxOverrun,
    RxFraming,
    RxDropped,
}
const NRVALUES: usize = 7;

impl Debug {
    pub const ALL: [Debug; NRVALUES] = [
        Debug::RawSample,
        Debug::Smoothed,
        Debug::ButtonCount,
        Debug::ServoAngle,
        Debug::RxOverrun,
        Debug::RxFraming,
        Debug::RxDropped,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Debug::RawSample => "raw",
            Debug::Smoothed => "smoothed",
            Debug::ButtonCount => "clicks",
            Debug::ServoAngle => "angle",
            Debug::RxOverrun => "rx_overrun",
            Debug::RxFraming => "rx_framing",
            Debug::RxDropped => "rx_dropped",
        }
    }

    #[inline(always)]
    pub fn log_u16(&self, value: u16) {
        #[cfg(feature = "debug")]
        TABLE.set(*self, value);
        #[cfg(not(feature = "debug"))]
        let _ = value;
    }

    #[inline(always)]
    pub fn log_u8(&self, value: u8) {
        self.log_u16(value.into())
    }

    /// Increment a counter value.
    #[inline(always)]
    pub fn inc(&self) {
        #[cfg(feature = "debug")]
        TABLE.inc(*self);
    }
}

pub struct DebugTable {
    values: Mutex<[Cell<u16>; NRVALUES]>,
}

impl DebugTable {
    pub const fn new() -> Self {
        Self {
            values: Mutex::new([const { Cell::new(0) }; NRVALUES]),
        }
    }

    pub fn set(&self, id: Debug, value: u16) {
        critical_section::with(|cs| {
            self.values.borrow(cs)[id as usize].set(value);
        });
    }

    pub fn get(&self, id: Debug) -> u16 {
        critical_section::with(|cs| self.values.borrow(cs)[id as usize].get())
    }

    pub fn inc(&self, id: Debug) {
        critical_section::with(|cs| {
            let value = &self.values.borrow(cs)[id as usize];
            value.set(value.get().wrapping_add(1));
        });
    }

    /// Print all values as `name:value` lines.
    pub fn dump(&self, hal: &impl SerialPort) {
        for id in Debug::ALL {
            let value = self.get(id);
            reply(hal, |t| ufmt::uwrite!(t, "{}:{}\n", id.name(), value));
        }
    }
}

impl Default for DebugTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "debug")]
static TABLE: DebugTable = DebugTable::new();

#[cfg(feature = "debug")]
pub fn debug_dump(hal: &impl SerialPort) {
    TABLE.dump(hal);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::MockHal;

    #[test]
    fn test_table() {
        let t = DebugTable::new();
        t.set(Debug::Smoothed, 512);
        t.inc(Debug::RxOverrun);
        t.inc(Debug::RxOverrun);
        assert_eq!(t.get(Debug::Smoothed), 512);
        assert_eq!(t.get(Debug::RxOverrun), 2);
        assert_eq!(t.get(Debug::RawSample), 0);
    }

    #[test]
    fn test_dump() {
        let hal = MockHal::new();
        let t = DebugTable::new();
        t.set(Debug::ServoAngle, 90);
        t.dump(&hal);
        let out = hal.take_tx();
        assert!(out.starts_with("raw:0\nsmoothed:0\n"));
        assert!(out.contains("angle:90\n"));
        assert!(out.ends_with("rx_dropped:0\n"));
        assert_eq!(out.lines().count(), NRVALUES);
    }

    #[test]
    fn test_ids() {
        for (i, id) in Debug::ALL.iter().enumerate() {
            assert_eq!(*id as usize, i);
        }
    }
}

// vim: ts=4 sw=4 expandtab
