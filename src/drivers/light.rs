//! Light relay driver.
//!
//! The relay output is the physical mirror of `DeviceState.light_enabled`.
//! Writes are unconditional so a re-affirmed value still drives the pin.

use log::info;

use crate::drivers::hw_init;

pub struct LightRelay {
    gpio: i32,
    enabled: bool,
}

impl LightRelay {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            enabled: false,
        }
    }

    pub fn set(&mut self, enabled: bool) {
        hw_init::gpio_write(self.gpio, enabled);
        if enabled != self.enabled {
            info!("light relay {}", if enabled { "ON" } else { "OFF" });
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
