// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The controller: interrupt dispatch, event handlers and the main loop.

use crate::{
    command::{Command, line_angle, line_binary},
    config::{LedMode, Modes, PwmLedMode, ServoMode},
    ctx::{HighCell, HighCtx, LowCtx, MainCtx, Shared},
    debounce::EdgeDebounce,
    debug::Debug,
    filter::SampleFilter,
    hal::{Hal, IrqSource, PwmOutput, Timer},
    leds::{show_one_hot, show4},
    policy::{
        BlinkState, SeqLed, binary_level, date_digit, marquee_pattern, parity_display, quantize,
        sample_to_angle, sample_to_pulse, single_marquee_pattern, update_direction,
    },
    pwm::PwmTimebase,
    serial::{LineEngine, reply},
    sweep::{next_range, sweep_steps},
    timing::{Clock, CounterWidth, Micros, Reload, reload_const},
};
use ufmt::{uWrite, uwrite};

/// Button hold-off after a press.
pub const BUTTON_HOLDOFF_US: u32 = 200_000;

/// Wait between starting a conversion and the next main loop step.
const CONVERSION_SETTLE_MS: u16 = 5;

/// Angle increments of the button step mode.
const SERVO_STEPS: [u16; 3] = [45, 90, 180];

const TEN_STATES: u8 = 10;

/// An overflow timer running with a fixed period.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TickTimer {
    pub period: Micros,
    pub reload: Reload,
}

impl TickTimer {
    /// Panics (fails const evaluation), if the period is not representable.
    pub const fn new(clock: Clock, period: Micros, prescale: u16, width: CounterWidth) -> Self {
        Self {
            period,
            reload: reload_const(clock, period, prescale, width),
        }
    }
}

/// Static controller configuration.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Config {
    pub modes: Modes,
    /// The 250 ms sequence timer.
    pub periodic: TickTimer,
    /// The button hold-off timer.
    pub debounce_tick: TickTimer,
    pub servo: PwmTimebase,
    pub led_pwm: PwmTimebase,
}

/// Button and line driven state.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Counters {
    pub clicks: u16,
    pub range: u8,
    pub servo_step: u8,
    pub servo_angle: u8,
    pub seq: SeqLed,
}

impl Counters {
    pub const fn new() -> Self {
        Self {
            clicks: 0,
            range: 1,
            servo_step: 0,
            servo_angle: 0,
            seq: SeqLed::new(),
        }
    }

    /// Reset everything but the current servo angle.
    pub fn reset(&mut self) {
        *self = Self {
            servo_angle: self.servo_angle,
            ..Self::new()
        };
    }

    /// Advance the button step mode.
    /// Returns the new angle.
    fn step_servo(&mut self) -> u8 {
        let angle = self.servo_angle as u16 + SERVO_STEPS[self.servo_step as usize % SERVO_STEPS.len()];
        self.servo_angle = (angle % 180) as u8;
        self.servo_step = (self.servo_step + 1) % SERVO_STEPS.len() as u8;
        self.servo_angle
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Controller {
    config: Config,
    counters: Shared<Counters>,
    debounce: EdgeDebounce<BUTTON_HOLDOFF_US>,
    filter: SampleFilter,
    increasing: HighCell<bool>,
    blink: HighCell<BlinkState>,
    line: LineEngine,
}

impl Controller {
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            counters: Shared::new(Counters::new()),
            debounce: EdgeDebounce::new(),
            filter: SampleFilter::new(),
            increasing: HighCell::new(true),
            blink: HighCell::new(BlinkState::new()),
            line: LineEngine::new(),
        }
    }

    pub fn counters(&self) -> Counters {
        self.counters.load()
    }

    fn modes(&self) -> Modes {
        self.config.modes
    }

    fn set_servo(&self, hal: &impl Hal, angle: u8) {
        hal.set_duty(PwmOutput::Servo, self.config.servo.duty_for_angle(angle));
        Debug::ServoAngle.log_u8(angle);
    }

    /// Bring the outputs into their initial state and load the timers.
    /// Must run before interrupts are enabled.
    pub fn init(&self, _m: &MainCtx<'_>, hal: &impl Hal) {
        show4(hal, 0);
        self.set_servo(hal, 0);
        hal.set_duty(PwmOutput::Led, self.config.led_pwm.off());
        hal.set_reload(Timer::Periodic, self.config.periodic.reload);
        hal.set_reload(Timer::DebounceTick, self.config.debounce_tick.reload);
        reply(hal, |t| t.write_str("Ready!\n"));
    }

    /// One main loop iteration.
    pub fn run(&self, _m: &MainCtx<'_>, hal: &impl Hal) {
        hal.start_conversion();
        hal.delay_ms(CONVERSION_SETTLE_MS);

        if self.modes().servo() == ServoMode::ButtonRangeSweep {
            let range = self.counters.load().range;
            for step in sweep_steps(range) {
                self.set_servo(hal, step.angle);
                hal.delay_ms(step.dwell_ms);
            }
        }
    }

    /// High priority interrupt level.
    pub fn irq_high(&self, c: &HighCtx<'_>, hal: &impl Hal) {
        if hal.pending(IrqSource::ButtonEdge) {
            if self.debounce.edge(c) {
                self.on_press(c, hal);
            }
            hal.clear_pending(IrqSource::ButtonEdge);
        }
        if hal.pending(IrqSource::Periodic) {
            self.on_periodic(c, hal);
            hal.clear_pending(IrqSource::Periodic);
        }
        if hal.pending(IrqSource::DebounceTick) {
            self.on_debounce_tick(c, hal);
            hal.clear_pending(IrqSource::DebounceTick);
        }
        if hal.pending(IrqSource::Conversion) {
            self.on_conversion(c, hal);
            hal.clear_pending(IrqSource::Conversion);
        }
    }

    /// Low priority interrupt level.
    pub fn irq_low(&self, c: &LowCtx<'_>, hal: &impl Hal) {
        if hal.pending(IrqSource::SerialRx) {
            self.line.receive(c, hal, |line| self.on_line(hal, line));
            hal.clear_pending(IrqSource::SerialRx);
        }
    }

    fn on_press(&self, _c: &HighCtx<'_>, hal: &impl Hal) {
        let modes = self.modes();

        let clicks = self.counters.update(|cnt| {
            let clicks = cnt.clicks;
            cnt.clicks = clicks.wrapping_add(1);
            clicks
        });
        Debug::ButtonCount.log_u16(clicks.wrapping_add(1));
        reply(hal, |t| uwrite!(t, "Button{}\n", clicks));

        if modes.leds() == LedMode::ButtonCount {
            show4(hal, clicks.wrapping_add(1) as u8);
        }

        match modes.servo() {
            ServoMode::ButtonRangeSweep => {
                let range = self.counters.update(|cnt| {
                    cnt.range = next_range(cnt.range);
                    cnt.range
                });
                reply(hal, |t| uwrite!(t, "Servo Range State:{}\n", range));
            }
            ServoMode::ButtonStep => {
                let angle = self.counters.update(|cnt| cnt.step_servo());
                self.set_servo(hal, angle);
            }
            _ => (),
        }

        if let Some(n) = modes.sequence_len() {
            let speed = self.counters.update(|cnt| cnt.seq.press(n));
            if n == 3 {
                reply(hal, |t| uwrite!(t, "SeqLED State:{}\n", speed));
            } else {
                reply(hal, |t| uwrite!(t, "SeqLED{} State:{}\n", n, speed));
            }
        }
    }

    fn on_periodic(&self, _c: &HighCtx<'_>, hal: &impl Hal) {
        hal.set_reload(Timer::Periodic, self.config.periodic.reload);

        if let Some(n) = self.modes().sequence_len()
            && let Some(position) = self.counters.update(|cnt| cnt.seq.tick(n))
        {
            show_one_hot(hal, position, n);
        }
    }

    fn on_debounce_tick(&self, c: &HighCtx<'_>, hal: &impl Hal) {
        hal.set_reload(Timer::DebounceTick, self.config.debounce_tick.reload);
        self.debounce.tick(c, self.config.debounce_tick.period);
    }

    fn on_conversion(&self, c: &HighCtx<'_>, hal: &impl Hal) {
        let modes = self.modes();
        let sample = self.filter.run(c, hal.read_conversion());
        let smoothed = sample.smoothed;
        Debug::RawSample.log_u16(sample.raw);
        Debug::Smoothed.log_u16(smoothed);

        if modes.servo() == ServoMode::SampleAngle {
            self.set_servo(hal, sample_to_angle(smoothed));
        }

        match modes.pwm_led() {
            PwmLedMode::SampleBrightness => {
                let duty = self.config.led_pwm.duty_for_us(sample_to_pulse(smoothed));
                hal.set_duty(PwmOutput::Led, duty);
            }
            PwmLedMode::SampleBlinkZones => {
                let mut blink = self.blink.get(c);
                if let Some(on) = blink.step(smoothed) {
                    let duty = if on {
                        self.config.led_pwm.full()
                    } else {
                        self.config.led_pwm.off()
                    };
                    hal.set_duty(PwmOutput::Led, duty);
                }
                self.blink.set(c, blink);
            }
            PwmLedMode::Off => (),
        }

        match modes.leds() {
            LedMode::SampleBinary => show4(hal, binary_level(smoothed)),
            LedMode::SampleMarquee => show4(hal, marquee_pattern(smoothed)),
            LedMode::SampleSingleMarquee => show4(hal, single_marquee_pattern(smoothed)),
            LedMode::SampleTenState => show4(hal, quantize(smoothed, TEN_STATES)),
            LedMode::SampleDate => show4(hal, date_digit(smoothed)),
            LedMode::SampleDirectionParity => {
                let increasing = update_direction(self.increasing.get(c), sample.raw, sample.prev_raw);
                self.increasing.set(c, increasing);
                show4(hal, parity_display(smoothed, increasing));
            }
            LedMode::Off
            | LedMode::ButtonCount
            | LedMode::ButtonSequence3
            | LedMode::ButtonSequence4
            | LedMode::LineBinary => (),
        }
    }

    fn on_line(&self, hal: &impl Hal, line: &[u8]) {
        let modes = self.modes();

        match Command::parse(line) {
            Command::Reset => {
                self.counters.update(|cnt| cnt.reset());
                if modes.leds() == LedMode::ButtonCount {
                    show4(hal, 0);
                }
                reply(hal, |t| t.write_str("Reset OK\n"));
            }
            Command::Number(input) => {
                if modes.servo() == ServoMode::LineAngle {
                    let angle = line_angle(input);
                    self.counters.update(|cnt| cnt.servo_angle = angle);
                    reply(hal, |t| uwrite!(t, "Servo Angle:{}\n", angle));
                    self.set_servo(hal, angle);
                }
                if modes.leds() == LedMode::LineBinary {
                    let value = line_binary(input);
                    show4(hal, value);
                    reply(hal, |t| {
                        uwrite!(
                            t,
                            "Binary:{} -> {}{}{}{}\n",
                            value,
                            (value >> 3) & 1,
                            (value >> 2) & 1,
                            (value >> 1) & 1,
                            value & 1
                        )
                    });
                }
            }
            #[cfg(feature = "debug")]
            Command::DebugDump => crate::debug::debug_dump(hal),
            Command::Unknown => (),
        }
    }
}


// vim: ts=4 sw=4 expandtab
