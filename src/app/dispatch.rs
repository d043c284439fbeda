//! Inbound message routing.
//!
//! Every broker message is classified by exact topic match, decoded, and
//! turned into an [`AppCommand`] for [`ShadowSync`]. Nothing here touches
//! hardware; anything that cannot be routed or decoded is dropped with a
//! debug trace and a [`DropReason`].
//!
//! | Topic                                   | Payload                 | Command            |
//! |-----------------------------------------|-------------------------|--------------------|
//! | alert topic (`esp32/sub`)               | `{"msg": "<text>"}`     | `ShowAlert`        |
//! | `$aws/things/<thing>/shadow/update/delta` | `{"state": {"lightEnabled": b}}` | `ApplyLightDelta` |

use log::debug;

use crate::shadow::document::{self, AlertMessage, ShadowDelta};
use crate::shadow::topics::{InboundTopic, Topics};

use super::commands::{AppCommand, ALERT_TEXT_MAX};
use super::events::{AppEvent, DropReason};
use super::ports::{ActuatorPort, DisplayPort, EventSink};
use super::sync::ShadowSync;

pub struct Dispatcher {
    topics: Topics,
    handled: u32,
    dropped: u32,
}

impl Dispatcher {
    pub fn new(topics: Topics) -> Self {
        Self {
            topics,
            handled: 0,
            dropped: 0,
        }
    }

    /// Decode one message without acting on it.
    pub fn route(&self, topic: &str, payload: &[u8]) -> Result<AppCommand, DropReason> {
        match self.topics.classify(topic) {
            Some(InboundTopic::Alert) => decode_alert(payload),
            Some(InboundTopic::ShadowDelta) => decode_delta(payload),
            None => Err(DropReason::UnknownTopic),
        }
    }

    /// Route one message and hand the resulting command to `sync`.
    /// Returns `true` if a command was executed.
    pub fn on_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        sync: &mut ShadowSync,
        hw: &mut impl ActuatorPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> bool {
        match self.route(topic, payload) {
            Ok(cmd) => {
                self.handled += 1;
                sync.handle_command(cmd, hw, display, sink);
                true
            }
            Err(reason) => {
                self.dropped += 1;
                debug!("dropped message on '{}' ({} bytes): {:?}", topic, payload.len(), reason);
                sink.emit(&AppEvent::MessageDropped(reason));
                false
            }
        }
    }

    pub fn handled(&self) -> u32 {
        self.handled
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

fn decode_alert(payload: &[u8]) -> Result<AppCommand, DropReason> {
    let alert: AlertMessage = document::decode(payload).map_err(DropReason::Malformed)?;
    let msg = alert.msg.ok_or(DropReason::MissingField("msg"))?;
    Ok(AppCommand::ShowAlert(truncate(&msg)))
}

fn decode_delta(payload: &[u8]) -> Result<AppCommand, DropReason> {
    let delta: ShadowDelta = document::decode(payload).map_err(DropReason::Malformed)?;
    Ok(AppCommand::ApplyLightDelta {
        light_enabled: delta.light_enabled(),
        version: delta.version,
    })
}

/// Keep the longest prefix that fits, cut on a char boundary.
fn truncate(text: &str) -> heapless::String<ALERT_TEXT_MAX> {
    let mut out = heapless::String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
