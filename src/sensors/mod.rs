//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the shock switch and the climate probe. It performs no
//! caching: a failed climate read is returned as an error and the sync core
//! keeps its previous values.

pub mod climate;
pub mod shock;

use log::debug;

use crate::app::ports::ClimateSample;
use crate::error::SensorError;
use climate::ClimateProbe;
use shock::ShockSensor;

/// Aggregates all sensor drivers.
pub struct SensorHub<C: ClimateProbe> {
    pub shock: ShockSensor,
    pub climate: C,
    climate_failures: u32,
}

impl<C: ClimateProbe> SensorHub<C> {
    /// Construct a new hub. Drivers are built in main where peripheral
    /// ownership is established.
    pub fn new(shock: ShockSensor, climate: C) -> Self {
        Self {
            shock,
            climate,
            climate_failures: 0,
        }
    }

    pub fn read_shock(&self) -> bool {
        self.shock.is_active()
    }

    pub fn read_climate(&mut self) -> Result<ClimateSample, SensorError> {
        self.climate.sample().inspect_err(|e| {
            self.climate_failures = self.climate_failures.wrapping_add(1);
            debug!("climate probe failure #{}: {}", self.climate_failures, e);
        })
    }

    /// Failed climate reads since boot.
    pub fn climate_failures(&self) -> u32 {
        self.climate_failures
    }
}
