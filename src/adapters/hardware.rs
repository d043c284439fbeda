//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`]. On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, ClimateSample, Indicator, SensorPort};
use crate::drivers::indicator::IndicatorLed;
use crate::drivers::light::LightRelay;
use crate::error::SensorError;
use crate::sensors::SensorHub;
use crate::sensors::climate::ClimateProbe;

/// Blocking delay used for indicator pulses.
pub type DelayFn = fn(u32);

#[cfg(target_os = "espidf")]
fn platform_delay(ms: u32) {
    esp_idf_hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
fn platform_delay(ms: u32) {
    std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<C: ClimateProbe> {
    sensor_hub: SensorHub<C>,
    shock_led: IndicatorLed,
    message_led: IndicatorLed,
    light: LightRelay,
    delay: DelayFn,
}

impl<C: ClimateProbe> HardwareAdapter<C> {
    pub fn new(
        sensor_hub: SensorHub<C>,
        shock_led: IndicatorLed,
        message_led: IndicatorLed,
        light: LightRelay,
    ) -> Self {
        Self {
            sensor_hub,
            shock_led,
            message_led,
            light,
            delay: platform_delay,
        }
    }

    /// Replace the pulse delay (host tests skip the real sleep).
    pub fn with_delay(mut self, delay: DelayFn) -> Self {
        self.delay = delay;
        self
    }

    pub fn sensors(&self) -> &SensorHub<C> {
        &self.sensor_hub
    }

    pub fn is_light_on(&self) -> bool {
        self.light.is_enabled()
    }

    fn led(&mut self, indicator: Indicator) -> &mut IndicatorLed {
        match indicator {
            Indicator::Shock => &mut self.shock_led,
            Indicator::Message => &mut self.message_led,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<C: ClimateProbe> SensorPort for HardwareAdapter<C> {
    fn read_shock(&mut self) -> bool {
        self.sensor_hub.read_shock()
    }

    fn read_climate(&mut self) -> Result<ClimateSample, SensorError> {
        self.sensor_hub.read_climate()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<C: ClimateProbe> ActuatorPort for HardwareAdapter<C> {
    fn set_light(&mut self, enabled: bool) {
        self.light.set(enabled);
    }

    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        self.led(indicator).set(on);
    }

    fn pulse_indicator(&mut self, indicator: Indicator, duration_ms: u32) {
        let mut delay = self.delay;
        self.led(indicator).pulse(duration_ms, &mut delay);
    }
}
