//! JSON documents on the wire.
//!
//! Outbound documents serialise with the exact field names the backend
//! rules expect (`shockSensor`, `tempFahrenheit`, `lightEnabled`). Inbound
//! documents tolerate unknown fields so the broker's `metadata`/`timestamp`
//! envelope passes through untouched.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// `{"time": <ms>, "shockSensor": 0|1}` on the shock-alert topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShockAlert {
    pub time: u64,
    #[serde(rename = "shockSensor")]
    pub shock_sensor: u8,
}

/// `{"state":{"reported":{...}}}` on the shadow-update topic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowReport {
    pub state: ReportedSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedSection {
    pub reported: ReportedState,
}

/// Full-state snapshot. Sensor fields are omitted until the first good
/// sample so the backend keeps whatever it last stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedState {
    pub time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f32>,
    #[serde(
        rename = "tempFahrenheit",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub temp_fahrenheit: Option<f32>,
    #[serde(rename = "lightEnabled")]
    pub light_enabled: bool,
}

impl ShadowReport {
    pub fn new(reported: ReportedState) -> Self {
        Self {
            state: ReportedSection { reported },
        }
    }
}

/// Inbound delta: `{"version": n, "state": {"lightEnabled": bool}, ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ShadowDelta {
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub state: Option<DeltaState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeltaState {
    #[serde(rename = "lightEnabled", default)]
    pub light_enabled: Option<bool>,
}

impl ShadowDelta {
    /// The requested `lightEnabled`, if the delta names one.
    pub fn light_enabled(&self) -> Option<bool> {
        self.state.and_then(|s| s.light_enabled)
    }
}

/// Inbound alert: `{"msg": "<string>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertMessage {
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Codec helpers ─────────────────────────────────────────────

pub fn encode<T: Serialize>(doc: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(doc).map_err(|_| CodecError::Encode)
}

pub fn decode<'a, T: Deserialize<'a>>(payload: &'a [u8]) -> Result<T, CodecError> {
    let text = core::str::from_utf8(payload).map_err(|_| CodecError::InvalidUtf8)?;
    serde_json::from_str(text).map_err(|_| CodecError::Malformed)
}
