//! Vibration switch on [`SHOCK_GPIO`](crate::pins::SHOCK_GPIO).
//!
//! No debounce: every read reflects the raw level at the time of the call.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `gpio_get_level` on the pin configured by `hw_init`.
//! On host/test: reads from a static `AtomicBool` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_SHOCK: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_shock(active: bool) {
    SIM_SHOCK.store(active, Ordering::Relaxed);
}

pub struct ShockSensor {
    gpio: i32,
    active_high: bool,
}

impl ShockSensor {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            active_high: true,
        }
    }

    /// For modules that pull the output low on vibration.
    pub fn active_low(gpio: i32) -> Self {
        Self {
            gpio,
            active_high: false,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// `true` while the switch reports vibration.
    pub fn is_active(&self) -> bool {
        self.read_level() == self.active_high
    }

    #[cfg(target_os = "espidf")]
    fn read_level(&self) -> bool {
        // SAFETY: the pin was configured as an input by hw_init.
        unsafe { esp_idf_svc::sys::gpio_get_level(self.gpio) != 0 }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_level(&self) -> bool {
        SIM_SHOCK.load(Ordering::Relaxed)
    }
}
