// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::ctx::{HighCell, HighCtx};

/// Maximum raw conversion value.
pub const SAMPLE_MAX: u16 = 1023;

/// One filtered conversion.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Sample {
    pub raw: u16,
    pub prev_raw: u16,
    pub smoothed: u16,
}

/// Two-tap averaging filter over successive conversions.
pub struct SampleFilter {
    last_raw: HighCell<u16>,
}

impl SampleFilter {
    pub const fn new() -> Self {
        Self {
            last_raw: HighCell::new(0),
        }
    }

    #[inline(never)]
    pub fn run(&self, c: &HighCtx<'_>, raw: u16) -> Sample {
        let raw = raw.min(SAMPLE_MAX);
        let prev_raw = self.last_raw.get(c);
        self.last_raw.set(c, raw);
        Sample {
            raw,
            prev_raw,
            smoothed: (prev_raw + raw) / 2,
        }
    }
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self::new()
    }
}


// vim: ts=4 sw=4 expandtab
