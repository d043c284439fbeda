//! System configuration parameters
//!
//! All tunable parameters for the ShockShadow device. Identity and
//! credentials are baked in at build time from environment variables;
//! everything else carries a sensible default.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum AWS IoT thing-name length.
pub const THING_NAME_MAX: usize = 64;
/// Maximum broker hostname length.
pub const ENDPOINT_MAX: usize = 128;
/// Maximum topic length handled by the firmware.
pub const TOPIC_MAX: usize = 128;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// AWS IoT thing name; also the MQTT client id. Empty = derive from MAC.
    pub thing_name: heapless::String<THING_NAME_MAX>,
    /// Broker hostname (`<prefix>-ats.iot.<region>.amazonaws.com`).
    pub endpoint: heapless::String<ENDPOINT_MAX>,
    /// Broker TLS port.
    pub port: u16,

    // --- WiFi ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,

    // --- Topics ---
    /// Outbound shock alerts.
    pub shock_alert_topic: heapless::String<TOPIC_MAX>,
    /// Inbound free-text alert messages.
    pub alert_topic: heapless::String<TOPIC_MAX>,

    // --- Timing ---
    /// Minimum spacing between periodic shadow reports (milliseconds).
    pub shadow_report_interval_ms: u32,
    /// How long the shock LED is held before the alert publish (milliseconds).
    pub shock_indicator_hold_ms: u32,
    /// Alert suppression window after a published shock alert. 0 = disabled.
    pub shock_holdoff_ms: u32,
    /// Message LED pulse length on alert receipt (milliseconds).
    pub message_indicator_pulse_ms: u32,
    /// Fixed delay between connection attempts (milliseconds).
    pub connect_retry_delay_ms: u32,
    /// Idle delay at the end of each main-loop pass (milliseconds).
    pub loop_interval_ms: u32,

    // --- Transport ---
    /// MQTT packet buffer; outbound documents larger than this are dropped.
    pub mqtt_buffer_size: usize,
    /// MQTT keep-alive (seconds).
    pub keep_alive_secs: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            thing_name: heapless::String::new(),
            endpoint: heapless::String::new(),
            port: 8883,

            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),

            shock_alert_topic: bounded("esp32/shockAlert"),
            alert_topic: bounded("esp32/sub"),

            shadow_report_interval_ms: 30_000,
            shock_indicator_hold_ms: 500,
            shock_holdoff_ms: 0,
            message_indicator_pulse_ms: 200,
            connect_retry_delay_ms: 500,
            loop_interval_ms: 10,

            mqtt_buffer_size: 256,
            keep_alive_secs: 60,
        }
    }
}

impl SystemConfig {
    /// Defaults overlaid with the identity and credentials captured at build
    /// time (`SHOCKSHADOW_*` environment variables).
    pub fn from_build_env() -> Self {
        let mut cfg = Self::default();
        if let Some(v) = option_env!("SHOCKSHADOW_THING_NAME") {
            cfg.thing_name = bounded(v);
        }
        if let Some(v) = option_env!("SHOCKSHADOW_ENDPOINT") {
            cfg.endpoint = bounded(v);
        }
        if let Some(v) = option_env!("SHOCKSHADOW_WIFI_SSID") {
            cfg.wifi_ssid = bounded(v);
        }
        if let Some(v) = option_env!("SHOCKSHADOW_WIFI_PASSWORD") {
            cfg.wifi_password = bounded(v);
        }
        cfg
    }

    /// Reject values the main loop cannot operate with.
    ///
    /// Invalid ranges are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::ValidationFailed("endpoint must be set"));
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationFailed("port must be non-zero"));
        }
        if self.shadow_report_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "shadow_report_interval_ms must be > 0",
            ));
        }
        if self.connect_retry_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "connect_retry_delay_ms must be > 0",
            ));
        }
        if !(64..=16_384).contains(&self.mqtt_buffer_size) {
            return Err(ConfigError::ValidationFailed(
                "mqtt_buffer_size must be 64–16384",
            ));
        }
        if self.shock_alert_topic.is_empty() || self.alert_topic.is_empty() {
            return Err(ConfigError::ValidationFailed("topics must be non-empty"));
        }
        if self.shock_alert_topic.contains(&['+', '#'][..]) {
            return Err(ConfigError::ValidationFailed(
                "publish topic must not contain wildcards",
            ));
        }
        Ok(())
    }
}

/// Copy `s` into a bounded string, truncating at a char boundary.
pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
