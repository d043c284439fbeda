//! One-shot hardware peripheral initialization.
//!
//! Configures the shock input and the LED / relay outputs using raw
//! ESP-IDF sys calls, and pulses the OLED reset line. Called once from
//! `main()` before any driver is constructed. The DHT22 line and the OLED
//! I²C bus are owned through `esp-idf-hal` drivers instead.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU64, Ordering};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

/// Output pins driven low at boot.
pub const OUTPUT_PINS: [i32; 3] = [
    pins::SHOCK_LED_GPIO,
    pins::MESSAGE_LED_GPIO,
    pins::LIGHT_RELAY_GPIO,
];

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop starts; single-threaded.
    unsafe {
        init_gpio_inputs()?;
        init_gpio_outputs()?;
        reset_oled()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    for pin in OUTPUT_PINS {
        gpio_write(pin, false);
    }
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // Pull-down holds the line inactive if the module is unplugged.
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::SHOCK_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: shock input on GPIO{}", pins::SHOCK_GPIO);
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for pin in OUTPUT_PINS.into_iter().chain([pins::OLED_RST_GPIO]) {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

/// Hold the panel in reset for 20 ms, then release it.
#[cfg(target_os = "espidf")]
unsafe fn reset_oled() -> Result<(), HwInitError> {
    let ret = unsafe { gpio_set_level(pins::OLED_RST_GPIO, 0) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    esp_idf_hal::delay::FreeRtos::delay_ms(20);
    let ret = unsafe { gpio_set_level(pins::OLED_RST_GPIO, 1) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was configured in init_gpio_outputs(). Main-loop only.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

// ── Host simulation ───────────────────────────────────────────

/// Bit `n` = level last written to GPIO `n`.
#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: AtomicU64 = AtomicU64::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    let bit = 1u64 << pin;
    if high {
        SIM_LEVELS.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_LEVELS.fetch_and(!bit, Ordering::Relaxed);
    }
}

/// Level last written to `pin` (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    SIM_LEVELS.load(Ordering::Relaxed) & (1u64 << pin) != 0
}
