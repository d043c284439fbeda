//! Device state — the single source of truth held by the firmware.
//!
//! Exactly one instance exists, owned by [`ShadowSync`](super::sync::ShadowSync)
//! and mutated only from the main loop.

/// Locally observed and remotely actuated device state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceState {
    /// True only while the shock input reads active. Not latched.
    pub shock_detected: bool,
    /// Last good humidity sample (% RH). `None` until the first sample.
    pub humidity: Option<f32>,
    /// Last good temperature sample (°F). `None` until the first sample.
    pub temperature_f: Option<f32>,
    /// Authoritative light state; the physical relay always mirrors it.
    pub light_enabled: bool,
}

impl DeviceState {
    pub const fn new() -> Self {
        Self {
            shock_detected: false,
            humidity: None,
            temperature_f: None,
            light_enabled: false,
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the sync state machine is within the current loop pass.
///
/// `ShockActive` and `ReportDue` are single-step pulses: both return to
/// `Idle` as soon as their publish has been handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    ShockActive,
    ReportDue,
}

/// Periodic-report cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSchedule {
    pub last_report_at_ms: u64,
    pub interval_ms: u32,
}

impl ReportSchedule {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            last_report_at_ms: 0,
            interval_ms,
        }
    }

    /// Strictly more than one interval since the last report.
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_report_at_ms) > u64::from(self.interval_ms)
    }

    pub fn mark_reported(&mut self, now_ms: u64) {
        self.last_report_at_ms = now_ms;
    }
}
