// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interrupt driven control core.
//!
//! Converts timer periods and servo angles into register values,
//! dispatches the button, timer, conversion and serial events
//! and drives the LED bank and the two PWM outputs.
//! All peripheral access goes through the [hal] traits.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod config;
pub mod ctx;
pub mod debounce;
pub mod debug;
pub mod filter;
pub mod hal;
pub mod leds;
pub mod policy;
pub mod pwm;
pub mod serial;
pub mod sweep;
pub mod system;
pub mod timing;

#[cfg(test)]
mod mock;

// vim: ts=4 sw=4 expandtab
