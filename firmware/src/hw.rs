// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(unused_unsafe)]

pub use avr_device::atmega2560 as mcu;
pub use avr_device::interrupt;

use crate::{
    CONTROLLER,
    config::{CPU_HZ, DEBOUNCE_PRESCALE, PERIODIC_PRESCALE, PWM_PRESCALE, UBRR},
};
use ctlcore::{
    ctx::{HighCtx, LazyInit, LowCtx, MainInitCtx, Shared},
    hal::{Analog, Delay, Irq, IrqSource, Output, Outputs, PwmOutput, SerialPort, Timer, Timers},
    pwm::PwmDuty,
    timing::Reload,
};

// UCSR0A
const UDRE0: u8 = 1 << 5;
const FE0: u8 = 1 << 4;
const DOR0: u8 = 1 << 3;
// UCSR0B
const RXCIE0: u8 = 1 << 7;
const RXEN0: u8 = 1 << 4;
const TXEN0: u8 = 1 << 3;
// UCSR0C: 8N1
const UCSZ_8BIT: u8 = 0b11 << 1;
// ADMUX: AVcc reference, channel 0
const REFS0: u8 = 1 << 6;
// ADCSRA
const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;
const ADIE: u8 = 1 << 3;
const ADPS_128: u8 = 0b111;
// TCCR1A/TCCR1B: 10 bit fast PWM, non-inverting OC1A and OC1B
const COM1A1: u8 = 1 << 7;
const COM1B1: u8 = 1 << 5;
const WGM1_10BIT_A: u8 = 0b11;
const WGM12: u8 = 1 << 3;
const TOIE: u8 = 1 << 0;
// EICRA: INT0 on the falling edge
const ISC01: u8 = 1 << 1;
const INT0_BIT: u8 = 1 << 0;

/// Clock select bits for a timer prescaler.
const fn clock_select(prescale: u16) -> u8 {
    match prescale {
        1 => 0b001,
        8 => 0b010,
        64 => 0b011,
        256 => 0b100,
        1024 => 0b101,
        _ => panic!("Unsupported timer prescaler"),
    }
}

/// Soft pending flags, latched by the interrupt vectors.
static PENDING: Shared<u8> = Shared::new(0);

#[allow(non_snake_case)]
pub struct Hw {
    pub PORTA: mcu::PORTA,
    pub TC0: mcu::TC0,
    pub TC1: mcu::TC1,
    pub TC3: mcu::TC3,
    pub ADC: mcu::ADC,
    pub USART0: mcu::USART0,
    pub EXINT: mcu::EXINT,
}

// SAFETY: The peripherals are shared between main and interrupt context.
//         Read-modify-write sequences and 16 bit register accesses
//         (shared TEMP register) run with interrupts disabled.
//         UCSR0B is only modified from the low priority level.
unsafe impl Sync for Hw {}

// SAFETY: Is initialized when constructing the MainCtx.
pub static HW: LazyInit<Hw> = unsafe { LazyInit::uninit() };

impl Hw {
    #[rustfmt::skip]
    pub fn setup(&self, _: &MainInitCtx) {
        // SAFETY: Called with interrupts disabled. Ensured by &MainInitCtx.
        unsafe {
            // Timer 1: servo and LED PWM.
            self.TC1.tccr1a().write(|w| w.bits(COM1A1 | COM1B1 | WGM1_10BIT_A));
            self.TC1.ocr1a().write(|w| w.bits(0));
            self.TC1.ocr1b().write(|w| w.bits(0));
            self.TC1.tccr1b().write(|w| w.bits(WGM12 | clock_select(PWM_PRESCALE)));

            // Timer 3: periodic tick.
            self.TC3.tccr3a().write(|w| w.bits(0));
            self.TC3.tccr3b().write(|w| w.bits(clock_select(PERIODIC_PRESCALE)));
            self.TC3.timsk3().write(|w| w.bits(TOIE));

            // Timer 0: button hold-off tick.
            self.TC0.tccr0a().write(|w| w.bits(0));
            self.TC0.tccr0b().write(|w| w.bits(clock_select(DEBOUNCE_PRESCALE)));
            self.TC0.timsk0().write(|w| w.bits(TOIE));

            // Button.
            self.EXINT.eicra().write(|w| w.bits(ISC01));
            self.EXINT.eifr().write(|w| w.bits(INT0_BIT));
            self.EXINT.eimsk().write(|w| w.bits(INT0_BIT));

            // Potentiometer.
            self.ADC.admux().write(|w| w.bits(REFS0));
            self.ADC.didr0().write(|w| w.bits(1 << 0));
            self.ADC.adcsra().write(|w| w.bits(ADEN | ADIE | ADPS_128));

            // Serial line.
            self.USART0.ubrr0().write(|w| w.bits(UBRR));
            self.USART0.ucsr0c().write(|w| w.bits(UCSZ_8BIT));
            self.USART0.ucsr0b().write(|w| w.bits(RXCIE0 | RXEN0 | TXEN0));
        }
    }

    fn modify_ucsr0b(&self, mask: u8, set: bool) {
        // SAFETY: UCSR0B is only written from the low priority level and from setup.
        self.USART0.ucsr0b().modify(|r, w| unsafe {
            w.bits(if set { r.bits() | mask } else { r.bits() & !mask })
        });
    }

    fn set_rx_irq_enabled(&self, enabled: bool) {
        self.modify_ucsr0b(RXCIE0, enabled);
    }
}

impl Outputs for Hw {
    fn set_output(&self, pin: Output, level: bool) {
        let mask = 1 << pin as u8;
        interrupt::free(|_| {
            // SAFETY: All bit patterns are valid port values.
            self.PORTA.porta().modify(|r, w| unsafe {
                w.bits(if level { r.bits() | mask } else { r.bits() & !mask })
            });
        });
    }

    fn read_output(&self, pin: Output) -> bool {
        self.PORTA.porta().read().bits() & (1 << pin as u8) != 0
    }
}

impl Analog for Hw {
    fn start_conversion(&self) {
        interrupt::free(|_| {
            // SAFETY: Setting ADSC starts a conversion.
            self.ADC.adcsra().modify(|r, w| unsafe { w.bits(r.bits() | ADSC) });
        });
    }

    fn read_conversion(&self) -> u16 {
        self.ADC.adc().read().bits()
    }
}

impl SerialPort for Hw {
    fn transmit_ready(&self) -> bool {
        self.USART0.ucsr0a().read().bits() & UDRE0 != 0
    }

    fn transmit_byte(&self, data: u8) {
        // SAFETY: Any byte can be transmitted.
        self.USART0.udr0().write(|w| unsafe { w.bits(data) });
    }

    fn receive_byte(&self) -> u8 {
        self.USART0.udr0().read().bits()
    }

    fn overrun_error(&self) -> bool {
        self.USART0.ucsr0a().read().bits() & DOR0 != 0
    }

    fn framing_error(&self) -> bool {
        self.USART0.ucsr0a().read().bits() & FE0 != 0
    }

    fn set_receiver_enabled(&self, enabled: bool) {
        self.modify_ucsr0b(RXEN0, enabled);
    }
}

impl Timers for Hw {
    fn set_reload(&self, timer: Timer, reload: Reload) {
        interrupt::free(|_| match timer {
            Timer::Periodic => {
                // SAFETY: Any count is a valid counter value.
                self.TC3.tcnt3().write(|w| unsafe { w.bits(reload.value()) });
            }
            Timer::DebounceTick => {
                // SAFETY: The reload was computed for the 8 bit counter.
                self.TC0.tcnt0().write(|w| unsafe { w.bits(reload.value() as u8) });
            }
        });
    }

    fn set_duty(&self, output: PwmOutput, duty: PwmDuty) {
        interrupt::free(|_| match output {
            PwmOutput::Servo => {
                // SAFETY: The duty is limited to the 10 bit PWM resolution.
                self.TC1.ocr1a().write(|w| unsafe { w.bits(duty.value()) });
            }
            PwmOutput::Led => {
                // SAFETY: The duty is limited to the 10 bit PWM resolution.
                self.TC1.ocr1b().write(|w| unsafe { w.bits(duty.value()) });
            }
        });
    }
}

impl Irq for Hw {
    fn pending(&self, source: IrqSource) -> bool {
        PENDING.load() & source.mask() != 0
    }

    fn clear_pending(&self, source: IrqSource) {
        PENDING.update(|p| *p &= !source.mask());
    }
}

impl Delay for Hw {
    fn delay_ms(&self, ms: u16) {
        for _ in 0..ms {
            avr_device::asm::delay_cycles(CPU_HZ / 1000);
        }
    }
}

macro_rules! define_high_isr {
    ($name:ident, $source:expr) => {
        #[avr_device::interrupt(atmega2560)]
        fn $name() {
            PENDING.update(|p| *p |= $source.mask());
            // SAFETY: We are inside of a high priority interrupt handler.
            // Interrupts are disabled. Therefore, it is safe to construct a `HighCtx`.
            let c = unsafe { HighCtx::new() };
            CONTROLLER.irq_high(&c, HW.get());
        }
    };
}

define_high_isr!(INT0, IrqSource::ButtonEdge);
define_high_isr!(TIMER3_OVF, IrqSource::Periodic);
define_high_isr!(TIMER0_OVF, IrqSource::DebounceTick);
define_high_isr!(ADC, IrqSource::Conversion);

/// The low priority level.
///
/// Masks its own source and runs with interrupts enabled,
/// so that the high priority vectors can preempt it.
#[avr_device::interrupt(atmega2560)]
fn USART0_RX() {
    let hw = HW.get();
    PENDING.update(|p| *p |= IrqSource::SerialRx.mask());
    hw.set_rx_irq_enabled(false);
    // SAFETY: The receive interrupt is masked. This level cannot be re-entered.
    unsafe { interrupt::enable() };
    {
        // SAFETY: We are inside of the low priority interrupt handler.
        let c = unsafe { LowCtx::new() };
        CONTROLLER.irq_low(&c, hw);
    }
    interrupt::disable();
    // A byte still waiting in the receiver triggers the vector again.
    hw.set_rx_irq_enabled(true);
}

/// Cheaper Option::unwrap() alternative.
///
/// This is cheaper, because it doesn't call into the panic unwind path.
#[inline(always)]
pub fn unwrap_option<T>(value: Option<T>) -> T {
    match value {
        Some(value) => value,
        None => reset_system(),
    }
}

/// Reset the system.
#[inline(always)]
#[allow(clippy::empty_loop)]
pub fn reset_system() -> ! {
    loop {
        // Wait for the watchdog timer to trigger and reset the system.
        // No interrupt will reset the watchdog timer.
    }
}

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    reset_system();
}

// vim: ts=4 sw=4 expandtab
