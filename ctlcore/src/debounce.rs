// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    ctx::{HighCell, HighCtx},
    timing::Micros,
};

/// Button edge debouncer.
///
/// The first edge while idle is a press and arms the hold-off.
/// Every further edge while armed is swallowed and re-arms the hold-off.
/// The hold-off is counted down by [EdgeDebounce::tick].
pub struct EdgeDebounce<const HOLDOFF_US: u32> {
    remaining: HighCell<Micros>,
}

impl<const HOLDOFF_US: u32> EdgeDebounce<HOLDOFF_US> {
    pub const fn new() -> Self {
        Self {
            remaining: HighCell::new(Micros(0)),
        }
    }

    /// Feed a raw edge. Returns true, if this edge is a press.
    pub fn edge(&self, c: &HighCtx<'_>) -> bool {
        let press = !self.is_armed(c);
        self.remaining.set(c, Micros(HOLDOFF_US));
        press
    }

    /// Count the hold-off down by the elapsed time.
    pub fn tick(&self, c: &HighCtx<'_>, elapsed: Micros) {
        self.remaining
            .set(c, self.remaining.get(c).saturating_sub(elapsed));
    }

    pub fn is_armed(&self, c: &HighCtx<'_>) -> bool {
        !self.remaining.get(c).is_zero()
    }
}

impl<const HOLDOFF_US: u32> Default for EdgeDebounce<HOLDOFF_US> {
    fn default() -> Self {
        Self::new()
    }
}


// vim: ts=4 sw=4 expandtab
