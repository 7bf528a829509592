// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line command interpreter.

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Command {
    /// `r`: Reset the button driven state.
    Reset,
    /// A decimal number.
    Number(i32),
    /// `d`: Dump the diagnostic values.
    #[cfg(feature = "debug")]
    DebugDump,
    Unknown,
}

impl Command {
    pub fn parse(line: &[u8]) -> Self {
        match line {
            b"r" => Command::Reset,
            #[cfg(feature = "debug")]
            b"d" => Command::DebugDump,
            _ => match atoi(line) {
                Some(n) => Command::Number(n),
                None => Command::Unknown,
            },
        }
    }
}

/// Parse a leading decimal number.
///
/// Leading blanks and trailing garbage are skipped.
/// Returns None, if there is no digit. Saturates on overflow.
pub fn atoi(line: &[u8]) -> Option<i32> {
    let mut it = line
        .iter()
        .skip_while(|b| **b == b' ' || **b == b'\t')
        .peekable();

    let negative = match it.peek() {
        Some(b'-') => {
            it.next();
            true
        }
        Some(b'+') => {
            it.next();
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    let mut digits = 0;
    for b in it.take_while(|b| b.is_ascii_digit()) {
        let d = (*b - b'0') as i32;
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
        digits += 1;
    }

    if digits == 0 { None } else { Some(value) }
}

/// Servo angle for a number received on the line.
pub fn line_angle(input: i32) -> u8 {
    let mut angle = input.saturating_add(90) % 181;
    if angle < 0 {
        angle += 180;
    }
    angle as u8
}

/// Binary display value for a number received on the line.
pub fn line_binary(input: i32) -> u8 {
    input.clamp(0, 15) as u8
}


// vim: ts=4 sw=4 expandtab
