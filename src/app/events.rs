//! Outbound application events.
//!
//! [`ShadowSync`](super::sync::ShadowSync) and the
//! [`Dispatcher`](super::dispatch::Dispatcher) emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them (serial log, counters, test recorders).

use crate::error::{CodecError, Error, SensorError};
use crate::shadow::topics::OutboundTopic;

use super::state::DeviceState;

/// Why an inbound message was discarded without a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Topic is not in the subscription set.
    UnknownTopic,
    /// Payload did not decode.
    Malformed(CodecError),
    /// Payload decoded but the field the handler needs is absent.
    MissingField(&'static str),
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The sync core is live (carries the initial state).
    Started(DeviceState),

    /// A shock alert was handed to the transport.
    ShockAlertPublished { time: u64 },

    /// A shock edge fell inside the holdoff window and was not published.
    ShockSuppressed { time: u64 },

    /// A periodic full-state report was handed to the transport.
    ShadowReported(DeviceState),

    /// A remote delta changed (or re-affirmed) `lightEnabled`.
    DeltaApplied {
        light_enabled: bool,
        version: Option<u64>,
    },

    /// An inbound alert message was shown on the display.
    AlertShown,

    /// An inbound message was discarded.
    MessageDropped(DropReason),

    /// An outbound document was not handed to the transport; not retried.
    PublishFailed {
        topic: OutboundTopic,
        /// `Codec` if encoding failed, `Comms` if the transport refused.
        error: Error,
    },

    /// The climate probe failed; cached values retained.
    SensorReadFailed(SensorError),
}
