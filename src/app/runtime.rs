//! The cooperative main loop.
//!
//! One [`Runtime::run_once`] pass, in order:
//!
//! 1. re-establish the link and broker session if either dropped (blocking);
//! 2. service the transport, dispatching every drained message synchronously;
//! 3. poll the shock input;
//! 4. publish a shadow report if the interval elapsed;
//! 5. idle for `loop_interval_ms`.
//!
//! Nothing in a pass is fatal. Every failure degrades to a log line and a
//! retry on the next pass.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::Error;
use crate::shadow::topics::Topics;

use super::connect::{self, RetryPolicy, STATUS_MQTT_CONNECTING};
use super::dispatch::Dispatcher;
use super::ports::{
    ActuatorPort, ClockPort, ConnectivityPort, DisplayPort, EventSink, MqttTransport, SensorPort,
};
use super::sync::ShadowSync;

/// Longest MQTT client id accepted.
pub const CLIENT_ID_MAX: usize = 64;

/// What one loop pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    pub reconnected: bool,
    pub messages_handled: u32,
    pub shock_published: bool,
    pub report_attempted: bool,
}

pub struct Runtime {
    sync: ShadowSync,
    dispatcher: Dispatcher,
    client_id: heapless::String<CLIENT_ID_MAX>,
    retry: RetryPolicy,
    loop_interval_ms: u32,
    passes: u64,
}

impl Runtime {
    pub fn new(config: &SystemConfig, client_id: &str) -> Self {
        let topics = Topics::new(config, client_id);
        Self {
            sync: ShadowSync::new(config, topics.clone()),
            dispatcher: Dispatcher::new(topics),
            client_id: crate::config::bounded(client_id),
            retry: RetryPolicy::forever(config.connect_retry_delay_ms),
            loop_interval_ms: config.loop_interval_ms,
            passes: 0,
        }
    }

    /// Override the connection retry policy (tests bound it).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Boot sequence: join WiFi, open the broker session, start the sync core.
    ///
    /// Blocks until both links are up under the default retry policy.
    #[allow(clippy::too_many_arguments)]
    pub fn bring_up(
        &mut self,
        wifi: &mut impl ConnectivityPort,
        transport: &mut impl MqttTransport,
        hw: &mut impl ActuatorPort,
        display: &mut impl DisplayPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        connect::join_network(wifi, display, clock, self.retry)?;
        display.show_line(STATUS_MQTT_CONNECTING);
        connect::open_session(
            transport,
            self.sync.topics(),
            &self.client_id,
            display,
            clock,
            self.retry,
        )?;
        self.sync.start(hw, &*clock, sink);
        info!("device '{}' online", self.client_id);
        Ok(())
    }

    /// Run one cooperative pass of the main loop.
    #[allow(clippy::too_many_arguments)]
    pub fn run_once(
        &mut self,
        wifi: &mut impl ConnectivityPort,
        transport: &mut impl MqttTransport,
        hw: &mut (impl SensorPort + ActuatorPort),
        display: &mut impl DisplayPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<PassOutcome, Error> {
        self.passes += 1;
        let mut outcome = PassOutcome::default();

        // ── 1. Links ──────────────────────────────────────────
        if !transport.is_connected() {
            warn!("broker session lost (pass {}), reconnecting", self.passes);
            if !wifi.is_connected() {
                connect::join_network(wifi, display, clock, self.retry)?;
            }
            connect::open_session(
                transport,
                self.sync.topics(),
                &self.client_id,
                display,
                clock,
                self.retry,
            )?;
            outcome.reconnected = true;
        }

        // ── 2. Inbound ────────────────────────────────────────
        let sync = &mut self.sync;
        let dispatcher = &mut self.dispatcher;
        let mut handled = 0u32;
        transport.service(&mut |topic: &str, payload: &[u8]| {
            if dispatcher.on_message(topic, payload, sync, hw, display, sink) {
                handled += 1;
            }
        });
        outcome.messages_handled = handled;

        // ── 3. Shock ──────────────────────────────────────────
        outcome.shock_published = self.sync.poll_shock(hw, transport, display, clock, sink);

        // ── 4. Report ─────────────────────────────────────────
        outcome.report_attempted = self.sync.report_if_due(hw, transport, &*clock, sink);

        // ── 5. Idle ───────────────────────────────────────────
        if self.loop_interval_ms > 0 {
            clock.delay_ms(self.loop_interval_ms);
        }
        Ok(outcome)
    }

    pub fn sync(&self) -> &ShadowSync {
        &self.sync
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }
}
