//! Discrete indicator LEDs (shock, inbound message).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO configured by hw_init.
//! On host/test: hw_init records the level in a bitmask.

use crate::drivers::hw_init;

pub struct IndicatorLed {
    gpio: i32,
    on: bool,
}

impl IndicatorLed {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        self.on = on;
    }

    /// Light for `duration_ms`, then turn off. Blocks the caller.
    pub fn pulse(&mut self, duration_ms: u32, delay: &mut impl FnMut(u32)) {
        self.set(true);
        delay(duration_ms);
        self.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}
