//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production). Drops are only
//! worth a debug line; failures are warnings.

use log::{debug, info, warn};

use crate::app::events::{AppEvent, DropReason};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events seen since boot.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted = self.emitted.wrapping_add(1);
        match event {
            AppEvent::Started(s) => {
                info!("START | lightEnabled={}", s.light_enabled);
            }
            AppEvent::ShockAlertPublished { time } => {
                info!("SHOCK | alert published t={}ms", time);
            }
            AppEvent::ShockSuppressed { time } => {
                debug!("SHOCK | suppressed t={}ms (holdoff)", time);
            }
            AppEvent::ShadowReported(s) => {
                info!(
                    "SHADOW | reported T={}\u{00b0}F RH={}% light={}",
                    fmt_opt(s.temperature_f),
                    fmt_opt(s.humidity),
                    if s.light_enabled { "ON" } else { "OFF" },
                );
            }
            AppEvent::DeltaApplied {
                light_enabled,
                version,
            } => {
                info!("DELTA | lightEnabled={} version={:?}", light_enabled, version);
            }
            AppEvent::AlertShown => {
                info!("ALERT | shown");
            }
            AppEvent::MessageDropped(reason) => match reason {
                DropReason::UnknownTopic => debug!("DROP | unknown topic"),
                DropReason::Malformed(e) => debug!("DROP | {}", e),
                DropReason::MissingField(field) => debug!("DROP | missing '{}'", field),
            },
            AppEvent::PublishFailed { topic, error } => {
                warn!("PUBLISH | {:?} failed: {}", topic, error);
            }
            AppEvent::SensorReadFailed(e) => {
                warn!("SENSOR | climate read failed: {}", e);
            }
        }
    }
}

/// One decimal, or `-` before the first sample.
fn fmt_opt(v: Option<f32>) -> heapless::String<16> {
    use core::fmt::Write;
    let mut s = heapless::String::new();
    match v {
        Some(v) => {
            let _ = write!(s, "{:.1}", v);
        }
        None => {
            let _ = s.push('-');
        }
    }
    s
}
