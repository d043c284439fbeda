//! Link and session bring-up.
//!
//! Both the WiFi join and the broker session retry on a fixed delay until
//! they succeed. While waiting, the display cycles a one-to-four dot
//! progress animation after the phase's status line.
//!
//! ```text
//!   "Connecting to wifi"  ─ retry ─▶ "Wifi connected"
//!   "Connecting to AWS MQTT..."
//!   "Connecting to IoT" ─ retry ─▶ subscribe all ─▶ "Connected to AWS IoT!"
//! ```

use core::fmt::{Display, Write};

use log::{info, warn};

use crate::error::{ConnectivityError, TransportError};
use crate::shadow::topics::Topics;

use super::ports::{ClockPort, ConnectivityPort, DisplayPort, MqttTransport, QoS};

pub const STATUS_WIFI_CONNECTING: &str = "Connecting to wifi";
pub const STATUS_WIFI_CONNECTED: &str = "Wifi connected";
pub const STATUS_MQTT_CONNECTING: &str = "Connecting to AWS MQTT...";
pub const STATUS_IOT_CONNECTING: &str = "Connecting to IoT";
pub const STATUS_IOT_CONNECTED: &str = "Connected to AWS IoT!";

/// Subscriptions use the same class as publishes.
const SUBSCRIBE_QOS: QoS = QoS::AtMostOnce;

const MAX_DOTS: u32 = 4;

/// Fixed-delay retry policy. `max_attempts: None` retries forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay_ms: u32,
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub const fn forever(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            max_attempts: None,
        }
    }

    pub const fn limited(delay_ms: u32, max_attempts: u32) -> Self {
        Self {
            delay_ms,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Run `attempt` until it succeeds or the policy gives up.
///
/// On success returns the number of attempts made. On failure, returns the
/// last error. After each failed attempt the display shows `prefix`
/// followed by the current dot count, then the clock sleeps for the retry
/// delay.
pub fn retry_until<T, E: Display>(
    display: &mut impl DisplayPort,
    clock: &mut impl ClockPort,
    prefix: &str,
    policy: RetryPolicy,
    mut attempt: impl FnMut() -> Result<T, E>,
) -> Result<(T, u32), E> {
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match attempt() {
            Ok(v) => return Ok((v, attempts)),
            Err(e) => {
                if policy.max_attempts.is_some_and(|max| attempts >= max) {
                    warn!("{}: giving up after {} attempts ({})", prefix, attempts, e);
                    return Err(e);
                }
                log::debug!("{}: attempt {} failed ({})", prefix, attempts, e);
                display.show_line(&progress_line(prefix, attempts));
                clock.delay_ms(policy.delay_ms);
            }
        }
    }
}

/// `prefix` plus `1..=4` dots, cycling with the attempt number.
pub fn progress_line(prefix: &str, attempt: u32) -> heapless::String<64> {
    let dots = (attempt.saturating_sub(1) % MAX_DOTS) + 1;
    let mut line = heapless::String::new();
    let _ = write!(line, "{} ", prefix);
    for _ in 0..dots {
        let _ = line.push('.');
    }
    line
}

/// Join the network, showing progress.
pub fn join_network(
    wifi: &mut impl ConnectivityPort,
    display: &mut impl DisplayPort,
    clock: &mut impl ClockPort,
    policy: RetryPolicy,
) -> Result<u32, ConnectivityError> {
    display.show_line(STATUS_WIFI_CONNECTING);
    let ((), attempts) = retry_until(display, clock, STATUS_WIFI_CONNECTING, policy, || {
        wifi.connect()
    })?;
    display.show_line(STATUS_WIFI_CONNECTED);
    info!("WiFi up after {} attempt(s)", attempts);
    Ok(attempts)
}

/// Open the broker session and subscribe to every inbound topic.
///
/// A subscribe failure counts as a failed attempt; the whole session is
/// retried so the device never runs with a partial subscription set.
pub fn open_session(
    transport: &mut impl MqttTransport,
    topics: &Topics,
    client_id: &str,
    display: &mut impl DisplayPort,
    clock: &mut impl ClockPort,
    policy: RetryPolicy,
) -> Result<u32, TransportError> {
    display.show_line(STATUS_IOT_CONNECTING);
    let ((), attempts) = retry_until(display, clock, STATUS_IOT_CONNECTING, policy, || {
        transport.connect(client_id)?;
        for topic in topics.subscriptions() {
            transport.subscribe(topic, SUBSCRIBE_QOS)?;
        }
        Ok::<(), TransportError>(())
    })?;
    display.show_line(STATUS_IOT_CONNECTED);
    info!("MQTT session '{}' up after {} attempt(s)", client_id, attempts);
    Ok(attempts)
}
