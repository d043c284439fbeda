//! DHT22 temperature / humidity probe.
//!
//! Architecture-agnostic single-wire driver over `embedded-hal` 1.0. The
//! protocol is bit-banged with blocking delays:
//!
//! ```text
//!  MCU: ▔▔╲____18ms____╱▔40µs▔
//!  DHT:                       ╲_80µs_╱▔80µs▔╲ 40 bits (hum16, temp16, sum8)
//! ```
//!
//! Each bit is a ~50 µs low followed by a high whose length encodes the
//! value (~27 µs = 0, ~70 µs = 1); sampling 35 µs after the rising edge
//! tells them apart.
//!
//! The probe reports Celsius; [`ClimateProbe::sample`] hands the core
//! Fahrenheit.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::app::ports::ClimateSample;
use crate::error::SensorError;

const START_SIGNAL_LOW_MS: u32 = 18;
const START_SIGNAL_HIGH_US: u32 = 40;
const BIT_SAMPLE_DELAY_US: u32 = 35;
const POLL_DELAY_US: u32 = 1;
/// Polling iterations before an edge wait gives up.
const MAX_ATTEMPTS: usize = 100;

/// DHT22 datasheet operating range.
const TEMP_MIN_C: f32 = -40.0;
const TEMP_MAX_C: f32 = 80.0;
const HUMIDITY_MAX: f32 = 100.0;

/// `F = C * 9/5 + 32`.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// One raw probe measurement, in the probe's native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub humidity: f32,
    pub celsius: f32,
}

impl Measurement {
    pub fn into_sample(self) -> ClimateSample {
        ClimateSample {
            temperature_f: celsius_to_fahrenheit(self.celsius),
            humidity_pct: self.humidity,
        }
    }

    fn validate(self) -> Result<Self, SensorError> {
        if !(TEMP_MIN_C..=TEMP_MAX_C).contains(&self.celsius)
            || !(0.0..=HUMIDITY_MAX).contains(&self.humidity)
        {
            return Err(SensorError::OutOfRange);
        }
        Ok(self)
    }
}

/// Anything that can produce a [`ClimateSample`].
pub trait ClimateProbe {
    fn sample(&mut self) -> Result<ClimateSample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// DHT22 driver
// ───────────────────────────────────────────────────────────────

pub struct Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Run one full transaction: start signal, handshake, 40 data bits.
    pub fn read(&mut self) -> Result<Measurement, SensorError> {
        self.send_start_signal()?;
        self.wait_for_sensor_response()?;

        let mut frame = [0u8; 5];
        for byte in &mut frame {
            *byte = self.read_byte()?;
        }
        let [hh, hl, th, tl, checksum] = frame;
        validate_checksum(hh, hl, th, tl, checksum)?;

        Measurement {
            humidity: decode_humidity(hh, hl),
            celsius: decode_temperature(th, tl),
        }
        .validate()
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn send_start_signal(&mut self) -> Result<(), SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_ms(START_SIGNAL_LOW_MS);
        self.pin.set_high().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(START_SIGNAL_HIGH_US);
        Ok(())
    }

    fn wait_for_sensor_response(&mut self) -> Result<(), SensorError> {
        self.wait_until_state(PinState::Low)?;
        self.wait_until_state(PinState::High)
    }

    fn wait_until_state(&mut self, state: PinState) -> Result<(), SensorError> {
        for _ in 0..MAX_ATTEMPTS {
            let reached = match state {
                PinState::High => self.pin.is_high(),
                PinState::Low => self.pin.is_low(),
            }
            .map_err(|_| SensorError::GpioFailed)?;
            if reached {
                return Ok(());
            }
            self.delay.delay_us(POLL_DELAY_US);
        }
        Err(SensorError::Timeout)
    }

    /// MSB first.
    fn read_byte(&mut self) -> Result<u8, SensorError> {
        let mut byte = 0;
        for i in 0..8 {
            self.wait_until_state(PinState::Low)?;
            self.wait_until_state(PinState::High)?;
            self.delay.delay_us(BIT_SAMPLE_DELAY_US);
            if self.pin.is_high().map_err(|_| SensorError::GpioFailed)? {
                byte |= 1 << (7 - i);
            }
        }
        Ok(byte)
    }
}

impl<P, D> ClimateProbe for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn sample(&mut self) -> Result<ClimateSample, SensorError> {
        self.read().map(Measurement::into_sample)
    }
}

/// Low 8 bits of the sum of the four data bytes.
fn validate_checksum(hh: u8, hl: u8, th: u8, tl: u8, checksum: u8) -> Result<(), SensorError> {
    let sum = hh.wrapping_add(hl).wrapping_add(th).wrapping_add(tl);
    if sum == checksum {
        Ok(())
    } else {
        Err(SensorError::ChecksumMismatch)
    }
}

/// Tenths of a percent.
fn decode_humidity(high: u8, low: u8) -> f32 {
    f32::from(u16::from_be_bytes([high, low])) / 10.0
}

/// Tenths of a degree, sign-magnitude (bit 15 = negative).
fn decode_temperature(high: u8, low: u8) -> f32 {
    let t = f32::from(u16::from_be_bytes([high & 0x7F, low])) / 10.0;
    if high & 0x80 != 0 { -t } else { t }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use super::{ClimateProbe, Measurement};
    use crate::app::ports::ClimateSample;
    use crate::error::SensorError;

    static SIM_CELSIUS: AtomicU32 = AtomicU32::new(0x41B0_0000); // 22.0
    static SIM_HUMIDITY: AtomicU32 = AtomicU32::new(0x4234_0000); // 45.0
    static SIM_FAIL: AtomicBool = AtomicBool::new(false);

    pub fn sim_set_climate(celsius: f32, humidity: f32) {
        SIM_CELSIUS.store(celsius.to_bits(), Ordering::Relaxed);
        SIM_HUMIDITY.store(humidity.to_bits(), Ordering::Relaxed);
    }

    pub fn sim_set_climate_failure(fail: bool) {
        SIM_FAIL.store(fail, Ordering::Relaxed);
    }

    /// Reads the injected values instead of a GPIO line.
    #[derive(Debug, Default)]
    pub struct SimClimateProbe;

    impl ClimateProbe for SimClimateProbe {
        fn sample(&mut self) -> Result<ClimateSample, SensorError> {
            if SIM_FAIL.load(Ordering::Relaxed) {
                return Err(SensorError::Timeout);
            }
            Measurement {
                celsius: f32::from_bits(SIM_CELSIUS.load(Ordering::Relaxed)),
                humidity: f32::from_bits(SIM_HUMIDITY.load(Ordering::Relaxed)),
            }
            .validate()
            .map(Measurement::into_sample)
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::{sim_set_climate, sim_set_climate_failure, SimClimateProbe};
