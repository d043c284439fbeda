//! Shadow synchronisation: the hexagonal core.
//!
//! [`ShadowSync`] owns the [`DeviceState`] and decides when to publish:
//!
//! ```text
//!            read_shock() == true            alert published
//!   Idle ───────────────────────▶ ShockActive ───────────────▶ Idle
//!   Idle ───────────────────────▶ ReportDue   ───────────────▶ Idle
//!        now - last_report > interval         report published,
//!                                             last_report = now
//! ```
//!
//! The two triggers are independent: one loop pass can raise a shock alert
//! and a shadow report. Remote deltas are applied to the state (and the
//! relay) immediately; the next report carries the new value back to the
//! backend, which is the only acknowledgement the protocol has.
//!
//! Behaviour worth knowing:
//! - no debounce: every poll that reads the shock input active publishes
//!   one alert (unless `shock_holdoff_ms` is configured);
//! - no delta version check: the last delta received wins.

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::SystemConfig;
use crate::error::TransportError;
use crate::shadow::document::{self, ReportedState, ShadowReport, ShockAlert};
use crate::shadow::topics::{OutboundTopic, Topics};

use super::commands::AppCommand;
use super::events::{AppEvent, DropReason};
use super::ports::{
    ActuatorPort, ClockPort, DisplayPort, EventSink, Indicator, MqttTransport, QoS, SensorPort,
};
use super::state::{DeviceState, ReportSchedule, SyncPhase};

/// Status line while the shock input is active.
pub const STATUS_SHOCK: &str = "Disturbance in force!";
/// Status line once the shock input releases.
pub const STATUS_CALM: &str = "No motion...";

/// Publish QoS for both outbound topics.
const PUBLISH_QOS: QoS = QoS::AtMostOnce;

/// Running counters, reported in the log alongside each shadow report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub shock_alerts: u32,
    pub shocks_suppressed: u32,
    pub reports: u32,
    pub deltas_applied: u32,
    pub publish_failures: u32,
}

// ───────────────────────────────────────────────────────────────
// ShadowSync
// ───────────────────────────────────────────────────────────────

pub struct ShadowSync {
    state: DeviceState,
    phase: SyncPhase,
    schedule: ReportSchedule,
    topics: Topics,
    shock_hold_ms: u32,
    shock_holdoff_ms: u32,
    message_pulse_ms: u32,
    max_payload: usize,
    last_alert_at_ms: Option<u64>,
    stats: SyncStats,
}

impl ShadowSync {
    pub fn new(config: &SystemConfig, topics: Topics) -> Self {
        Self {
            state: DeviceState::new(),
            phase: SyncPhase::Idle,
            schedule: ReportSchedule::new(config.shadow_report_interval_ms),
            topics,
            shock_hold_ms: config.shock_indicator_hold_ms,
            shock_holdoff_ms: config.shock_holdoff_ms,
            message_pulse_ms: config.message_indicator_pulse_ms,
            max_payload: config.mqtt_buffer_size,
            last_alert_at_ms: None,
            stats: SyncStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the outputs in line with the initial state.
    ///
    /// The report cadence starts from `now`, so the first periodic report
    /// goes out one interval after the main loop starts.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        hw.set_light(self.state.light_enabled);
        hw.set_indicator(Indicator::Shock, false);
        hw.set_indicator(Indicator::Message, false);
        self.schedule.mark_reported(clock.now_ms());
        sink.emit(&AppEvent::Started(self.state));
        info!("ShadowSync started (report every {}ms)", self.schedule.interval_ms);
    }

    // ── Shock path ────────────────────────────────────────────

    /// Poll the shock input once. Returns `true` if an alert was published.
    pub fn poll_shock(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        transport: &mut impl MqttTransport,
        display: &mut impl DisplayPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if hw.read_shock() {
            return self.on_shock_edge(hw, transport, display, clock, sink);
        }
        if self.state.shock_detected {
            self.state.shock_detected = false;
            display.show_line(STATUS_CALM);
        }
        false
    }

    /// Raise one shock alert: indicator on, publish, indicator off.
    pub fn on_shock_edge(
        &mut self,
        hw: &mut impl ActuatorPort,
        transport: &mut impl MqttTransport,
        display: &mut impl DisplayPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> bool {
        self.phase = SyncPhase::ShockActive;
        let was_detected = self.state.shock_detected;
        self.state.shock_detected = true;

        hw.set_indicator(Indicator::Shock, true);
        if !was_detected {
            display.show_line(STATUS_SHOCK);
        }
        if self.shock_hold_ms > 0 {
            clock.delay_ms(self.shock_hold_ms);
        }

        let now = clock.now_ms();
        let published = if self.in_holdoff(now) {
            self.stats.shocks_suppressed += 1;
            debug!("shock at {}ms inside holdoff window, not published", now);
            sink.emit(&AppEvent::ShockSuppressed { time: now });
            false
        } else {
            self.last_alert_at_ms = Some(now);
            let alert = ShockAlert {
                time: now,
                shock_sensor: 1,
            };
            let ok = self.publish(transport, OutboundTopic::ShockAlert, &alert, sink);
            if ok {
                self.stats.shock_alerts += 1;
                sink.emit(&AppEvent::ShockAlertPublished { time: now });
            }
            ok
        };

        hw.set_indicator(Indicator::Shock, false);
        self.phase = SyncPhase::Idle;
        published
    }

    fn in_holdoff(&self, now_ms: u64) -> bool {
        match (self.shock_holdoff_ms, self.last_alert_at_ms) {
            (0, _) | (_, None) => false,
            (window, Some(last)) => now_ms.saturating_sub(last) < u64::from(window),
        }
    }

    // ── Report path ───────────────────────────────────────────

    /// Publish a shadow report if the interval has elapsed.
    /// Returns `true` if a report was attempted.
    pub fn report_if_due(
        &mut self,
        hw: &mut impl SensorPort,
        transport: &mut impl MqttTransport,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if !self.schedule.is_due(clock.now_ms()) {
            return false;
        }
        self.phase = SyncPhase::ReportDue;
        self.report_shadow(hw, transport, clock, sink);
        true
    }

    /// Sample the climate probe and publish a full reported-state snapshot.
    ///
    /// The cadence restarts from `now` whether or not the publish succeeded;
    /// a lost report is covered by the next interval.
    pub fn report_shadow(
        &mut self,
        hw: &mut impl SensorPort,
        transport: &mut impl MqttTransport,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> bool {
        self.sample_climate(hw, sink);

        let now = clock.now_ms();
        let doc = self.reported_document(now);
        let ok = self.publish(transport, OutboundTopic::ShadowUpdate, &doc, sink);
        if ok {
            self.stats.reports += 1;
            sink.emit(&AppEvent::ShadowReported(self.state));
            debug!("shadow report #{} at {}ms ({:?})", self.stats.reports, now, self.stats);
        }

        self.schedule.mark_reported(now);
        self.phase = SyncPhase::Idle;
        ok
    }

    /// Stale-value-on-error: a failed read keeps the previous sample.
    fn sample_climate(&mut self, hw: &mut impl SensorPort, sink: &mut impl EventSink) {
        match hw.read_climate() {
            Ok(sample) => {
                self.state.temperature_f = Some(sample.temperature_f);
                self.state.humidity = Some(sample.humidity_pct);
            }
            Err(e) => {
                warn!("climate read failed ({}), reporting cached values", e);
                sink.emit(&AppEvent::SensorReadFailed(e));
            }
        }
    }

    /// The document [`report_shadow`](Self::report_shadow) would publish at `now_ms`.
    pub fn reported_document(&self, now_ms: u64) -> ShadowReport {
        ShadowReport::new(ReportedState {
            time: now_ms,
            humidity: self.state.humidity,
            temp_fahrenheit: self.state.temperature_f,
            light_enabled: self.state.light_enabled,
        })
    }

    // ── Inbound path ──────────────────────────────────────────

    /// Execute a decoded inbound command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::ShowAlert(text) => self.show_alert(&text, hw, display, sink),
            AppCommand::ApplyLightDelta {
                light_enabled,
                version,
            } => self.apply_delta(light_enabled, version, hw, sink),
        }
    }

    /// Apply a remote `lightEnabled` request. The field and the relay are
    /// written in the same step; an absent field changes nothing.
    pub fn apply_delta(
        &mut self,
        requested: Option<bool>,
        version: Option<u64>,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let Some(enabled) = requested else {
            debug!("delta (version {:?}) without lightEnabled ignored", version);
            sink.emit(&AppEvent::MessageDropped(DropReason::MissingField(
                "lightEnabled",
            )));
            return;
        };

        self.state.light_enabled = enabled;
        hw.set_light(enabled);
        self.stats.deltas_applied += 1;

        info!("delta applied: lightEnabled={} (version {:?})", enabled, version);
        sink.emit(&AppEvent::DeltaApplied {
            light_enabled: enabled,
            version,
        });
    }

    /// Show an alert message and blink the message indicator.
    pub fn show_alert(
        &mut self,
        text: &str,
        hw: &mut impl ActuatorPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        display.show_line(text);
        hw.pulse_indicator(Indicator::Message, self.message_pulse_ms);
        sink.emit(&AppEvent::AlertShown);
    }

    // ── Publishing ────────────────────────────────────────────

    /// Fire-and-forget publish. Failures are logged and counted, never retried.
    fn publish<T: Serialize>(
        &mut self,
        transport: &mut impl MqttTransport,
        topic: OutboundTopic,
        doc: &T,
        sink: &mut impl EventSink,
    ) -> bool {
        let payload = match document::encode(doc) {
            Ok(p) => p,
            Err(e) => {
                warn!("{:?}: {}", topic, e);
                self.stats.publish_failures += 1;
                sink.emit(&AppEvent::PublishFailed {
                    topic,
                    error: e.into(),
                });
                return false;
            }
        };

        let result = if payload.len() > self.max_payload {
            Err(TransportError::PayloadTooLarge)
        } else {
            transport.publish(self.topics.outbound(topic), &payload, PUBLISH_QOS)
        };

        match result {
            Ok(()) => true,
            Err(error) => {
                warn!("publish to {:?} failed: {}", topic, error);
                self.stats.publish_failures += 1;
                sink.emit(&AppEvent::PublishFailed {
                    topic,
                    error: error.into(),
                });
                false
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn last_report_at_ms(&self) -> u64 {
        self.schedule.last_report_at_ms
    }
}
