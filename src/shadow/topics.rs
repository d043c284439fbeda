//! MQTT topic set.
//!
//! | Topic                                     | Direction | Variant         |
//! |-------------------------------------------|-----------|-----------------|
//! | `esp32/shockAlert`                        | publish   | `ShockAlert`    |
//! | `$aws/things/{thing}/shadow/update`       | publish   | `ShadowUpdate`  |
//! | `$aws/things/{thing}/shadow/update/delta` | subscribe | `ShadowDelta`   |
//! | `esp32/sub`                               | subscribe | `Alert`         |

use core::fmt::Write;

use crate::config::{SystemConfig, TOPIC_MAX};

pub type TopicString = heapless::String<TOPIC_MAX>;

/// Topics the device subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTopic {
    /// Free-text alert for the display.
    Alert,
    /// Shadow delta (desired ≠ reported).
    ShadowDelta,
}

/// Topics the device publishes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundTopic {
    ShockAlert,
    ShadowUpdate,
}

/// Resolved topic strings for one device.
#[derive(Debug, Clone)]
pub struct Topics {
    shock_alert: TopicString,
    shadow_update: TopicString,
    shadow_delta: TopicString,
    alert: TopicString,
}

impl Topics {
    /// Build the topic set for `thing_name`.
    ///
    /// Shadow topic strings that would overflow [`TOPIC_MAX`] are truncated;
    /// `SystemConfig` bounds the thing name well below that.
    pub fn new(config: &SystemConfig, thing_name: &str) -> Self {
        let mut shadow_update = TopicString::new();
        let _ = write!(shadow_update, "$aws/things/{}/shadow/update", thing_name);
        let mut shadow_delta = TopicString::new();
        let _ = write!(shadow_delta, "{}/delta", shadow_update);

        Self {
            shock_alert: config.shock_alert_topic.clone(),
            shadow_update,
            shadow_delta,
            alert: config.alert_topic.clone(),
        }
    }

    /// Exact-match a received topic against the subscription set.
    pub fn classify(&self, topic: &str) -> Option<InboundTopic> {
        if topic == self.alert.as_str() {
            Some(InboundTopic::Alert)
        } else if topic == self.shadow_delta.as_str() {
            Some(InboundTopic::ShadowDelta)
        } else {
            None
        }
    }

    pub fn inbound(&self, topic: InboundTopic) -> &str {
        match topic {
            InboundTopic::Alert => &self.alert,
            InboundTopic::ShadowDelta => &self.shadow_delta,
        }
    }

    pub fn outbound(&self, topic: OutboundTopic) -> &str {
        match topic {
            OutboundTopic::ShockAlert => &self.shock_alert,
            OutboundTopic::ShadowUpdate => &self.shadow_update,
        }
    }

    /// Every inbound topic, in subscription order.
    pub fn subscriptions(&self) -> [&str; 2] {
        [
            self.inbound(InboundTopic::Alert),
            self.inbound(InboundTopic::ShadowDelta),
        ]
    }
}
