//! Mock adapters for integration tests.
//!
//! Each mock records every call so tests can assert on the full command
//! history without touching real GPIO, WiFi or a broker.

use std::collections::VecDeque;

use shockshadow::app::events::AppEvent;
use shockshadow::app::ports::{
    ActuatorPort, ClimateSample, ClockPort, ConnectivityPort, DisplayPort, EventSink, Indicator,
    MqttTransport, QoS, SensorPort,
};
use shockshadow::config::SystemConfig;
use shockshadow::error::{ConnectivityError, SensorError, TransportError};

/// Defaults with a reachable endpoint and no idle delay between passes.
#[allow(dead_code)]
pub fn test_config() -> SystemConfig {
    let mut cfg = SystemConfig::default();
    cfg.endpoint = heapless::String::try_from("example-ats.iot.us-east-1.amazonaws.com")
        .expect("endpoint fits");
    cfg.loop_interval_ms = 0;
    cfg
}

pub const THING: &str = "porch-sensor";
#[allow(dead_code)]
pub const DELTA_TOPIC: &str = "$aws/things/porch-sensor/shadow/update/delta";
#[allow(dead_code)]
pub const UPDATE_TOPIC: &str = "$aws/things/porch-sensor/shadow/update";

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetLight(bool),
    SetIndicator(Indicator, bool),
    Pulse(Indicator, u32),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub shock: bool,
    pub climate: Result<ClimateSample, SensorError>,
    pub climate_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            shock: false,
            climate: Ok(ClimateSample {
                temperature_f: 72.5,
                humidity_pct: 41.0,
            }),
            climate_reads: 0,
        }
    }

    /// Relay level after the most recent write, if any.
    pub fn light(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::SetLight(on) => Some(*on),
            _ => None,
        })
    }

    pub fn light_writes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::SetLight(_)))
            .count()
    }

    pub fn pulses(&self, indicator: Indicator) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::Pulse(i, _) if *i == indicator))
            .count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_shock(&mut self) -> bool {
        self.shock
    }

    fn read_climate(&mut self) -> Result<ClimateSample, SensorError> {
        self.climate_reads += 1;
        self.climate
    }
}

impl ActuatorPort for MockHardware {
    fn set_light(&mut self, enabled: bool) {
        self.calls.push(ActuatorCall::SetLight(enabled));
    }

    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        self.calls.push(ActuatorCall::SetIndicator(indicator, on));
    }

    fn pulse_indicator(&mut self, indicator: Indicator, duration_ms: u32) {
        self.calls.push(ActuatorCall::Pulse(indicator, duration_ms));
    }
}

// ── MockBroker ────────────────────────────────────────────────

pub struct MockBroker {
    pub connected: bool,
    pub connect_attempts: u32,
    /// Connect attempts that fail before one succeeds.
    pub connect_failures: u32,
    pub fail_publish: bool,
    pub client_ids: Vec<String>,
    pub subscriptions: Vec<String>,
    pub outbox: Vec<(String, Vec<u8>)>,
    pub inbound: VecDeque<(String, Vec<u8>)>,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn new() -> Self {
        Self {
            connected: false,
            connect_attempts: 0,
            connect_failures: 0,
            fail_publish: false,
            client_ids: Vec::new(),
            subscriptions: Vec::new(),
            outbox: Vec::new(),
            inbound: VecDeque::new(),
        }
    }

    pub fn online() -> Self {
        let mut b = Self::new();
        b.connected = true;
        b
    }

    pub fn inject(&mut self, topic: &str, payload: &str) {
        self.inbound
            .push_back((topic.to_owned(), payload.as_bytes().to_vec()));
    }

    pub fn published_on(&self, topic: &str) -> Vec<serde_json::Value> {
        self.outbox
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| serde_json::from_slice(p).expect("outbound payload is JSON"))
            .collect()
    }
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MqttTransport for MockBroker {
    fn connect(&mut self, client_id: &str) -> Result<(), TransportError> {
        self.connect_attempts += 1;
        self.client_ids.push(client_id.to_owned());
        if self.connect_failures > 0 {
            self.connect_failures -= 1;
            return Err(TransportError::Tls);
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn subscribe(&mut self, topic: &str, _qos: QoS) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.subscriptions.push(topic.to_owned());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], _qos: QoS) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if self.fail_publish {
            return Err(TransportError::PublishFailed);
        }
        self.outbox.push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    fn service(&mut self, on_message: &mut dyn FnMut(&str, &[u8])) {
        while let Some((topic, payload)) = self.inbound.pop_front() {
            on_message(&topic, &payload);
        }
    }
}

// ── MockLink ──────────────────────────────────────────────────

pub struct MockLink {
    pub up: bool,
    pub attempts: u32,
    pub failures: u32,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            up: false,
            attempts: 0,
            failures: 0,
        }
    }
}

impl ConnectivityPort for MockLink {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        self.attempts += 1;
        if self.failures > 0 {
            self.failures -= 1;
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.up = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.up
    }
}

// ── MockPanel ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPanel {
    pub lines: Vec<String>,
}

#[allow(dead_code)]
impl MockPanel {
    pub fn current(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

impl DisplayPort for MockPanel {
    fn show_line(&mut self, text: &str) {
        self.lines.push(text.to_owned());
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Manual clock: only `delay_ms` and `advance` move time.
#[derive(Default)]
pub struct MockClock {
    pub now: u64,
    pub slept: u64,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(now: u64) -> Self {
        Self { now, slept: 0 }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now += u64::from(ms);
        self.slept += u64::from(ms);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
