//! MQTT-over-TLS adapter for the AWS IoT broker.
//!
//! Implements [`MqttTransport`]. The ESP-IDF client runs its own task and
//! delivers events through a callback; the callback only copies received
//! messages into [`INBOX`] and tracks the session flag. The main loop then
//! drains the inbox inside [`MqttTransport::service`], so every message is
//! handled on the main-loop thread, one at a time, in arrival order.
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌──────────────┐
//! │  esp-mqtt    │─────────────────▶│  Main loop   │
//! │  task (cb)   │      INBOX       │  service()   │
//! └──────────────┘                  └──────────────┘
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` with mutual TLS (X.509).
//! - **all other targets**: in-memory outbox; tests feed [`INBOX`] with
//!   [`sim_inject`].

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};

use crate::app::ports::{MqttTransport, QoS};
use crate::config::{SystemConfig, TOPIC_MAX};
use crate::error::TransportError;

#[cfg(target_os = "espidf")]
use super::cert_store::CertBundle;

/// Largest inbound payload kept; longer messages are dropped in the callback.
pub const INBOUND_PAYLOAD_MAX: usize = 512;

/// MQTT PUBLISH overhead beyond topic and payload: fixed header, topic
/// length prefix and packet id.
const PUBLISH_HEADER_MAX: usize = 16;

/// Client receive buffer. Any message that fits [`InboundMessage`] arrives
/// in one piece; larger ones are split by the client and dropped here.
pub const RX_BUFFER_SIZE: usize = INBOUND_PAYLOAD_MAX + TOPIC_MAX + PUBLISH_HEADER_MAX;

/// Inbox depth. Messages arriving while the inbox is full are dropped.
const INBOX_DEPTH: usize = 8;

/// One received message, copied out of the client's buffer.
pub struct InboundMessage {
    pub topic: heapless::String<TOPIC_MAX>,
    pub payload: heapless::Vec<u8, INBOUND_PAYLOAD_MAX>,
}

impl InboundMessage {
    /// `None` if the topic or payload exceed the fixed buffers.
    pub fn copy_from(topic: &str, payload: &[u8]) -> Option<Self> {
        Some(Self {
            topic: heapless::String::try_from(topic).ok()?,
            payload: heapless::Vec::from_slice(payload).ok()?,
        })
    }
}

/// Client task → main loop.
pub static INBOX: Channel<CriticalSectionRawMutex, InboundMessage, INBOX_DEPTH> = Channel::new();

/// Broker session state, written by the client task.
static SESSION_UP: AtomicBool = AtomicBool::new(false);

/// Messages lost to oversize or a full inbox.
static INBOX_DROPS: AtomicU32 = AtomicU32::new(0);

fn enqueue(topic: &str, payload: &[u8]) {
    let Some(msg) = InboundMessage::copy_from(topic, payload) else {
        INBOX_DROPS.fetch_add(1, Ordering::Relaxed);
        warn!("MQTT: dropping oversized message on '{}' ({}B)", topic, payload.len());
        return;
    };
    if INBOX.try_send(msg).is_err() {
        INBOX_DROPS.fetch_add(1, Ordering::Relaxed);
        warn!("MQTT: inbox full, dropping message on '{}'", topic);
    }
}

/// Entry point for a `Received` client event.
///
/// `complete` is false when the client split the message across several
/// events. Only the first piece carries the topic; the message is counted
/// once as dropped there and the remaining pieces are ignored.
pub fn on_received(topic: Option<&str>, data: &[u8], complete: bool) {
    match (topic, complete) {
        (Some(topic), true) => enqueue(topic, data),
        (Some(topic), false) => {
            INBOX_DROPS.fetch_add(1, Ordering::Relaxed);
            warn!("MQTT: dropping fragmented message on '{}'", topic);
        }
        (None, _) => {}
    }
}

/// Messages dropped before reaching the main loop since boot.
pub fn inbox_drops() -> u32 {
    INBOX_DROPS.load(Ordering::Relaxed)
}

/// Simulation: deliver a message as if the broker had sent it.
#[cfg(not(target_os = "espidf"))]
pub fn sim_inject(topic: &str, payload: &[u8]) {
    enqueue(topic, payload);
}

/// Simulation: flip the broker session flag.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_session(up: bool) {
    SESSION_UP.store(up, Ordering::Release);
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

/// Connection parameters lifted from [`SystemConfig`].
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub endpoint: heapless::String<{ crate::config::ENDPOINT_MAX }>,
    pub port: u16,
    /// Outbound packet limit.
    pub buffer_size: usize,
    pub rx_buffer_size: usize,
    pub keep_alive_secs: u16,
}

impl From<&SystemConfig> for BrokerSettings {
    fn from(config: &SystemConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            port: config.port,
            buffer_size: config.mqtt_buffer_size,
            rx_buffer_size: RX_BUFFER_SIZE,
            keep_alive_secs: config.keep_alive_secs,
        }
    }
}

pub struct MqttAdapter {
    settings: BrokerSettings,
    #[cfg(target_os = "espidf")]
    certs: Option<&'static CertBundle>,
    #[cfg(target_os = "espidf")]
    client: Option<esp_idf_svc::mqtt::client::EspMqttClient<'static>>,
    /// Simulation: every accepted publish, in order.
    #[cfg(not(target_os = "espidf"))]
    outbox: Vec<(String, Vec<u8>)>,
    /// Simulation: subscriptions accepted since the last connect.
    #[cfg(not(target_os = "espidf"))]
    subscriptions: Vec<String>,
    published: u32,
}

impl MqttAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(settings: BrokerSettings, certs: Option<&'static CertBundle>) -> Self {
        Self {
            settings,
            certs,
            client: None,
            published: 0,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(settings: BrokerSettings) -> Self {
        Self {
            settings,
            outbox: Vec::new(),
            subscriptions: Vec::new(),
            published: 0,
        }
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    /// Publishes accepted by the client since boot.
    pub fn published(&self) -> u32 {
        self.published
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn outbox(&self) -> &[(String, Vec<u8>)] {
        &self.outbox
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, client_id: &str) -> Result<(), TransportError> {
        use core::time::Duration;
        use esp_idf_svc::mqtt::client::{
            Details, EspMqttClient, EventPayload, MqttClientConfiguration, MqttProtocolVersion,
        };
        use esp_idf_svc::tls::X509;

        if self.client.is_none() {
            let certs = self.certs.ok_or(TransportError::Tls)?;
            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                protocol_version: Some(MqttProtocolVersion::V3_1_1),
                keep_alive_interval: Some(Duration::from_secs(u64::from(
                    self.settings.keep_alive_secs,
                ))),
                buffer_size: self.settings.rx_buffer_size,
                out_buffer_size: self.settings.buffer_size,
                server_certificate: Some(X509::pem_until_nul(&certs.ca_cert)),
                client_certificate: Some(X509::pem_until_nul(&certs.device_cert)),
                private_key: Some(X509::pem_until_nul(&certs.private_key)),
                ..Default::default()
            };

            let mut url: heapless::String<192> = heapless::String::new();
            let _ = core::fmt::Write::write_fmt(
                &mut url,
                format_args!("mqtts://{}:{}", self.settings.endpoint, self.settings.port),
            );

            let client = EspMqttClient::new_cb(&url, &conf, |event| match event.payload() {
                EventPayload::Connected(_) => {
                    SESSION_UP.store(true, Ordering::Release);
                    info!("MQTT: session up");
                }
                EventPayload::Disconnected => {
                    SESSION_UP.store(false, Ordering::Release);
                    warn!("MQTT: session down");
                }
                EventPayload::Received {
                    topic,
                    data,
                    details,
                    ..
                } => on_received(topic, data, matches!(details, Details::Complete)),
                EventPayload::Error(e) => debug!("MQTT: client error {:?}", e),
                _ => {}
            })
            .map_err(|e| {
                warn!("MQTT: client init failed ({:?})", e);
                TransportError::Tls
            })?;
            self.client = Some(client);
        }

        // The client connects on its own task; give it a moment.
        for _ in 0..CONNECT_WAIT_STEPS {
            if SESSION_UP.load(Ordering::Acquire) {
                return Ok(());
            }
            esp_idf_hal::delay::FreeRtos::delay_ms(CONNECT_WAIT_STEP_MS);
        }
        Err(TransportError::NotConnected)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, client_id: &str) -> Result<(), TransportError> {
        if self.settings.endpoint.is_empty() {
            return Err(TransportError::NotConnected);
        }
        self.subscriptions.clear();
        SESSION_UP.store(true, Ordering::Release);
        info!("MQTT(sim): '{}' connected to {}", client_id, self.settings.endpoint);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError> {
        let client = self.client.as_mut().ok_or(TransportError::NotConnected)?;
        client
            .subscribe(topic, to_esp_qos(qos))
            .map(|_| ())
            .map_err(|_| TransportError::SubscribeFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self, topic: &str, _qos: QoS) -> Result<(), TransportError> {
        self.subscriptions.push(topic.to_string());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), TransportError> {
        let client = self.client.as_mut().ok_or(TransportError::NotConnected)?;
        client
            .publish(topic, to_esp_qos(qos), false, payload)
            .map(|_| ())
            .map_err(|_| TransportError::PublishFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8], _qos: QoS) -> Result<(), TransportError> {
        self.outbox.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
const CONNECT_WAIT_STEPS: u32 = 20;
#[cfg(target_os = "espidf")]
const CONNECT_WAIT_STEP_MS: u32 = 250;

#[cfg(target_os = "espidf")]
fn to_esp_qos(qos: QoS) -> esp_idf_svc::mqtt::client::QoS {
    match qos {
        QoS::AtMostOnce => esp_idf_svc::mqtt::client::QoS::AtMostOnce,
    }
}

// ───────────────────────────────────────────────────────────────
// MqttTransport
// ───────────────────────────────────────────────────────────────

impl MqttTransport for MqttAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), TransportError> {
        info!("MQTT: connecting as '{}' to {}:{}", client_id, self.settings.endpoint, self.settings.port);
        self.platform_connect(client_id)
    }

    fn is_connected(&self) -> bool {
        SESSION_UP.load(Ordering::Acquire)
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.platform_subscribe(topic, qos)?;
        info!("MQTT: subscribed to '{}'", topic);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        if payload.len() > self.settings.buffer_size {
            return Err(TransportError::PayloadTooLarge);
        }
        self.platform_publish(topic, payload, qos)?;
        self.published = self.published.wrapping_add(1);
        debug!("MQTT: published {}B to '{}'", payload.len(), topic);
        Ok(())
    }

    fn service(&mut self, on_message: &mut dyn FnMut(&str, &[u8])) {
        while let Ok(msg) = INBOX.try_receive() {
            on_message(&msg.topic, &msg.payload);
        }
    }
}
