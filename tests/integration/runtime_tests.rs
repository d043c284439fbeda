//! Full main-loop passes: bring-up, inbound drain, shock, report, reconnect.

use crate::mock_hw::*;

use shockshadow::app::connect::{
    RetryPolicy, STATUS_IOT_CONNECTED, STATUS_IOT_CONNECTING, STATUS_MQTT_CONNECTING,
    STATUS_WIFI_CONNECTED, STATUS_WIFI_CONNECTING,
};
use shockshadow::app::runtime::{PassOutcome, Runtime};
use shockshadow::error::{ConnectivityError, Error, TransportError};

struct Rig {
    runtime: Runtime,
    link: MockLink,
    broker: MockBroker,
    hw: MockHardware,
    panel: MockPanel,
    clock: MockClock,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self {
            runtime: Runtime::new(&test_config(), THING),
            link: MockLink::new(),
            broker: MockBroker::new(),
            hw: MockHardware::new(),
            panel: MockPanel::default(),
            clock: MockClock::default(),
            sink: RecordingSink::default(),
        }
    }

    fn bring_up(&mut self) -> Result<(), Error> {
        self.runtime.bring_up(
            &mut self.link,
            &mut self.broker,
            &mut self.hw,
            &mut self.panel,
            &mut self.clock,
            &mut self.sink,
        )
    }

    fn pass(&mut self) -> Result<PassOutcome, Error> {
        self.runtime.run_once(
            &mut self.link,
            &mut self.broker,
            &mut self.hw,
            &mut self.panel,
            &mut self.clock,
            &mut self.sink,
        )
    }

    fn online() -> Self {
        let mut rig = Self::new();
        rig.bring_up().expect("bring-up");
        rig
    }
}

fn report_interval() -> u64 {
    u64::from(test_config().shadow_report_interval_ms)
}

// ── Bring-up ──────────────────────────────────────────────────

#[test]
fn bring_up_retries_and_shows_progress() {
    let mut rig = Rig::new();
    rig.link.failures = 2;
    rig.broker.connect_failures = 1;

    rig.bring_up().expect("bring-up");

    assert_eq!(
        rig.panel.lines,
        vec![
            STATUS_WIFI_CONNECTING.to_string(),
            format!("{STATUS_WIFI_CONNECTING} ."),
            format!("{STATUS_WIFI_CONNECTING} .."),
            STATUS_WIFI_CONNECTED.to_string(),
            STATUS_MQTT_CONNECTING.to_string(),
            STATUS_IOT_CONNECTING.to_string(),
            format!("{STATUS_IOT_CONNECTING} ."),
            STATUS_IOT_CONNECTED.to_string(),
        ]
    );
    assert_eq!(rig.panel.lines[6], "Connecting to IoT .");
    assert_eq!(rig.link.attempts, 3);
    assert_eq!(rig.broker.connect_attempts, 2);
    let retry = u64::from(test_config().connect_retry_delay_ms);
    assert_eq!(rig.clock.slept, 3 * retry);
}

#[test]
fn bring_up_subscribes_with_thing_name() {
    let rig = Rig::online();
    assert_eq!(rig.broker.client_ids, vec![THING.to_string()]);
    assert_eq!(
        rig.broker.subscriptions,
        vec!["esp32/sub".to_string(), DELTA_TOPIC.to_string()]
    );
    // The relay is driven to the initial state before the loop starts.
    assert_eq!(rig.hw.light(), Some(false));
}

#[test]
fn bring_up_gives_up_under_limited_policy() {
    let mut rig = Rig::new();
    rig.runtime = Runtime::new(&test_config(), THING).with_retry(RetryPolicy::limited(100, 3));
    rig.link.failures = 10;

    let err = rig.bring_up().expect_err("network never comes up");
    assert_eq!(err, Error::Network(ConnectivityError::ConnectionFailed));
    assert_eq!(rig.link.attempts, 3);
    assert_eq!(rig.broker.connect_attempts, 0);
    assert_eq!(rig.hw.light(), None);
}

// ── Loop passes ───────────────────────────────────────────────

#[test]
fn quiet_pass_does_nothing() {
    let mut rig = Rig::online();
    let outcome = rig.pass().expect("pass");
    assert_eq!(outcome, PassOutcome::default());
    assert!(rig.broker.outbox.is_empty());
    assert_eq!(rig.runtime.passes(), 1);
}

#[test]
fn delta_is_applied_before_the_report_in_the_same_pass() {
    let mut rig = Rig::online();
    rig.clock.advance(report_interval() + 1);
    rig.broker
        .inject(DELTA_TOPIC, r#"{"version":9,"state":{"lightEnabled":true}}"#);

    let outcome = rig.pass().expect("pass");
    assert_eq!(outcome.messages_handled, 1);
    assert!(outcome.report_attempted);

    let reports = rig.broker.published_on(UPDATE_TOPIC);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["state"]["reported"]["lightEnabled"], true);
    assert_eq!(rig.hw.light(), Some(true));
}

#[test]
fn report_waits_for_full_interval() {
    let mut rig = Rig::online();
    rig.clock.advance(report_interval());
    assert!(!rig.pass().expect("pass").report_attempted);

    rig.clock.advance(1);
    assert!(rig.pass().expect("pass").report_attempted);
    assert!(!rig.pass().expect("pass").report_attempted);
    assert_eq!(rig.broker.published_on(UPDATE_TOPIC).len(), 1);
}

#[test]
fn shock_pass_publishes_alert() {
    let mut rig = Rig::online();
    rig.hw.shock = true;
    let outcome = rig.pass().expect("pass");
    assert!(outcome.shock_published);
    assert_eq!(rig.broker.published_on("esp32/shockAlert").len(), 1);
}

#[test]
fn inbound_messages_drain_in_arrival_order() {
    let mut rig = Rig::online();
    rig.broker.inject("esp32/sub", r#"{"msg":"one"}"#);
    rig.broker.inject("esp32/sub", "garbage");
    rig.broker.inject("esp32/sub", r#"{"msg":"two"}"#);

    let outcome = rig.pass().expect("pass");
    assert_eq!(outcome.messages_handled, 2);
    assert_eq!(rig.panel.current(), Some("two"));
    assert!(rig.broker.inbound.is_empty());
    assert_eq!(rig.runtime.dispatcher().dropped(), 1);
}

// ── Reconnect ─────────────────────────────────────────────────

#[test]
fn dropped_session_reconnects_before_servicing() {
    let mut rig = Rig::online();
    rig.broker.connected = false;
    rig.broker.inject("esp32/sub", r#"{"msg":"after reconnect"}"#);

    let outcome = rig.pass().expect("pass");
    assert!(outcome.reconnected);
    assert_eq!(outcome.messages_handled, 1);
    assert_eq!(rig.broker.connect_attempts, 2);
    assert_eq!(rig.broker.subscriptions.len(), 4);
    // WiFi was still up, so only the broker session was rebuilt.
    assert_eq!(rig.link.attempts, 1);
}

#[test]
fn dropped_link_rejoins_network_first() {
    let mut rig = Rig::online();
    rig.link.up = false;
    rig.broker.connected = false;

    assert!(rig.pass().expect("pass").reconnected);
    assert_eq!(rig.link.attempts, 2);
    assert_eq!(rig.broker.connect_attempts, 2);
}

#[test]
fn failed_reconnect_surfaces_transport_error() {
    let mut rig = Rig::online();
    rig.runtime = Runtime::new(&test_config(), THING).with_retry(RetryPolicy::limited(10, 2));
    rig.broker.connected = false;
    rig.broker.connect_failures = 5;
    rig.hw.shock = true;

    let err = rig.pass().expect_err("broker stays down");
    assert_eq!(err, Error::Comms(TransportError::Tls));
    assert!(rig.broker.outbox.is_empty());
}
