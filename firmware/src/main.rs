// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod config;
mod hw;
mod ports;

use crate::{
    config::CONFIG,
    hw::{HW, Hw, interrupt, mcu, unwrap_option},
    ports::Ports,
};
use ctlcore::{
    ctx::{MainCtx, MainInitCtx},
    system::Controller,
};

static CONTROLLER: Controller = Controller::new(CONFIG);

fn wdt_init() {
    // SAFETY: The asm code only accesses the WDT registers
    //         which are not accessed from anywhere else in the program.
    unsafe {
        // Enable WDT with timeout 2 s
        core::arch::asm!(
            "wdr",
            "ldi {tmp}, 0x18", // WDCE=1, WDE=1
            "sts {WDTCSR}, {tmp}",
            "ldi {tmp}, 0x0F", // WDE=1, WDP2=1, WDP1=1, WDP0=1
            "sts {WDTCSR}, {tmp}",
            tmp = out(reg_upper) _,
            WDTCSR = const 0x60,
            options(nostack, preserves_flags)
        );
    }
}

fn wdt_poke(_wp: &mcu::WDT) {
    avr_device::asm::wdr();
}

#[avr_device::entry]
fn main() -> ! {
    wdt_init();

    let dp = unwrap_option(mcu::Peripherals::take());

    let init_static_vars = |ctx: &MainInitCtx| {
        let ports = Ports {
            PORTA: &dp.PORTA,
            PORTB: &dp.PORTB,
            PORTD: &dp.PORTD,
        };
        ports.setup(ctx);

        HW.init(
            ctx,
            Hw {
                PORTA: dp.PORTA,
                TC0: dp.TC0,
                TC1: dp.TC1,
                TC3: dp.TC3,
                ADC: dp.ADC,
                USART0: dp.USART0,
                EXINT: dp.EXINT,
            },
        );
        HW.get().setup(ctx);
    };

    // # SAFETY
    //
    // This is the context handle for the main() function.
    // Holding a reference to this object proves that the holder
    // is running in main() context.
    let m = unsafe { MainCtx::new_with_init(init_static_vars) };

    let hw = HW.get();
    CONTROLLER.init(&m, hw);

    // SAFETY: This must be after construction of MainCtx
    //         and after initialization of static MainInit variables.
    unsafe { interrupt::enable() };

    loop {
        CONTROLLER.run(&m, hw);
        wdt_poke(&dp.WDT);
    }
}

// vim: ts=4 sw=4 expandtab
