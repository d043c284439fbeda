//! Inbound commands to the sync core.
//!
//! The [`Dispatcher`](super::dispatch::Dispatcher) decodes broker messages
//! into these; [`ShadowSync`](super::sync::ShadowSync) interprets and acts
//! upon them.

/// Longest alert text kept from an inbound message.
pub const ALERT_TEXT_MAX: usize = 64;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Show a free-text alert and pulse the message indicator.
    ShowAlert(heapless::String<ALERT_TEXT_MAX>),

    /// Apply a remote shadow delta. `None` = the delta did not name
    /// `lightEnabled`, which is a no-op.
    ApplyLightDelta {
        light_enabled: Option<bool>,
        version: Option<u64>,
    },
}
