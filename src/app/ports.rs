//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ShadowSync / Dispatcher (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, broker, display, clock, event sinks)
//! implement these traits. The sync core consumes them via generics, so it
//! never touches hardware directly.
//!
//! All ports are called from the single main-loop thread; none of them need
//! to be `Send` or `Sync`.

use crate::error::{ConnectivityError, SensorError, TransportError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One temperature/humidity measurement, already in device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_f: f32,
    pub humidity_pct: f32,
}

/// Read-side port: pure reads, no state.
pub trait SensorPort {
    /// Current level of the shock input (`true` = vibration detected).
    fn read_shock(&mut self) -> bool;

    /// Sample the climate probe. Errors leave the caller's cache untouched.
    fn read_climate(&mut self) -> Result<ClimateSample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Transient visual indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Lit while a shock alert is being raised.
    Shock,
    /// Pulsed when an inbound alert message arrives.
    Message,
}

/// Write-side port. Digital writes cannot fail in this model.
pub trait ActuatorPort {
    /// Drive the light relay.
    fn set_light(&mut self, enabled: bool);

    /// Drive an indicator LED.
    fn set_indicator(&mut self, indicator: Indicator, on: bool);

    /// Light an indicator for `duration_ms`, then turn it off (blocking).
    fn pulse_indicator(&mut self, indicator: Indicator, duration_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain → network link)
// ───────────────────────────────────────────────────────────────

/// Station-mode network link underneath the broker session.
pub trait ConnectivityPort {
    /// Join the configured network. Blocks until associated and addressed
    /// or the attempt fails.
    fn connect(&mut self) -> Result<(), ConnectivityError>;

    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ broker)
// ───────────────────────────────────────────────────────────────

/// MQTT quality-of-service class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
}

/// Publish/subscribe client.
///
/// Inbound messages are only ever delivered from inside [`service`]:
/// the handler runs to completion for one message before the next one is
/// drained, and `service` returns only after the inbox is empty.
///
/// [`service`]: MqttTransport::service
pub trait MqttTransport {
    /// Open (or re-check) the broker session using `client_id`.
    fn connect(&mut self, client_id: &str) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError>;

    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), TransportError>;

    /// Pump I/O and hand every pending inbound message to `on_message`.
    fn service(&mut self, on_message: &mut dyn FnMut(&str, &[u8]));
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Single-line status panel. Each call clears and redraws; there is no
/// scrollback, so the panel is a last-write-wins indicator.
pub trait DisplayPort {
    fn show_line(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the calling (only) thread.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
