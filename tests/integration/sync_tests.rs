//! ShadowSync + Dispatcher behaviour against mock adapters.

use crate::mock_hw::*;

use shockshadow::app::dispatch::Dispatcher;
use shockshadow::app::events::{AppEvent, DropReason};
use shockshadow::app::ports::Indicator;
use shockshadow::app::sync::{ShadowSync, STATUS_CALM, STATUS_SHOCK};
use shockshadow::error::SensorError;
use shockshadow::sensors::climate::Measurement;
use shockshadow::shadow::topics::Topics;

struct Bench {
    sync: ShadowSync,
    dispatcher: Dispatcher,
    hw: MockHardware,
    broker: MockBroker,
    panel: MockPanel,
    clock: MockClock,
    sink: RecordingSink,
}

impl Bench {
    fn new() -> Self {
        let cfg = test_config();
        let topics = Topics::new(&cfg, THING);
        let mut bench = Self {
            sync: ShadowSync::new(&cfg, topics.clone()),
            dispatcher: Dispatcher::new(topics),
            hw: MockHardware::new(),
            broker: MockBroker::online(),
            panel: MockPanel::default(),
            clock: MockClock::at(0),
            sink: RecordingSink::default(),
        };
        bench.sync.start(&mut bench.hw, &bench.clock, &mut bench.sink);
        bench
    }

    fn deliver(&mut self, topic: &str, payload: &str) -> bool {
        self.dispatcher.on_message(
            topic,
            payload.as_bytes(),
            &mut self.sync,
            &mut self.hw,
            &mut self.panel,
            &mut self.sink,
        )
    }

    fn poll(&mut self) -> bool {
        self.sync.poll_shock(
            &mut self.hw,
            &mut self.broker,
            &mut self.panel,
            &mut self.clock,
            &mut self.sink,
        )
    }

    fn report(&mut self) -> bool {
        self.sync
            .report_shadow(&mut self.hw, &mut self.broker, &self.clock, &mut self.sink)
    }

    fn reports(&self) -> Vec<serde_json::Value> {
        self.broker
            .published_on(UPDATE_TOPIC)
            .into_iter()
            .map(|doc| doc["state"]["reported"].clone())
            .collect()
    }
}

fn delta(light: bool, version: u64) -> String {
    format!(
        r#"{{"version":{},"timestamp":1700000000,"state":{{"lightEnabled":{}}},"metadata":{{}}}}"#,
        version, light
    )
}

// ── Reports ───────────────────────────────────────────────────

#[test]
fn repeated_reports_differ_only_in_time() {
    let mut b = Bench::new();
    b.clock.advance(100);
    assert!(b.report());
    b.clock.advance(100);
    assert!(b.report());

    let mut docs = b.reports();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["time"], 100);
    assert_eq!(docs[1]["time"], 200);

    for doc in &mut docs {
        doc.as_object_mut().expect("object").remove("time");
    }
    assert_eq!(docs[0], docs[1]);
}

#[test]
fn report_carries_fahrenheit_and_humidity() {
    let mut b = Bench::new();
    b.hw.climate = Ok(Measurement {
        humidity: 55.0,
        celsius: 25.0,
    }
    .into_sample());
    b.report();

    let doc = &b.reports()[0];
    let f = doc["tempFahrenheit"].as_f64().expect("number");
    assert!((f - 77.0).abs() < 0.01, "got {f}");
    assert_eq!(doc["humidity"].as_f64(), Some(55.0));
    assert_eq!(doc["lightEnabled"], false);
}

#[test]
fn failed_probe_reports_cached_values() {
    let mut b = Bench::new();
    b.report();
    b.hw.climate = Err(SensorError::ChecksumMismatch);
    b.clock.advance(50);
    assert!(b.report(), "a probe failure does not block the report");

    let docs = b.reports();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1]["tempFahrenheit"], docs[0]["tempFahrenheit"]);
    assert_eq!(docs[1]["humidity"], docs[0]["humidity"]);
    assert_eq!(
        b.sink
            .count(|e| matches!(e, AppEvent::SensorReadFailed(SensorError::ChecksumMismatch))),
        1
    );
}

#[test]
fn no_sample_yet_omits_sensor_fields() {
    let mut b = Bench::new();
    b.hw.climate = Err(SensorError::Timeout);
    b.report();

    let doc = &b.reports()[0];
    assert!(doc.get("tempFahrenheit").is_none());
    assert!(doc.get("humidity").is_none());
    assert_eq!(doc["lightEnabled"], false);
}

// ── Deltas ────────────────────────────────────────────────────

#[test]
fn delta_drives_relay_and_next_report() {
    let mut b = Bench::new();
    for (version, light) in [(1, true), (2, false), (3, true)] {
        assert!(b.deliver(DELTA_TOPIC, &delta(light, version)));
        assert_eq!(b.hw.light(), Some(light));
        assert_eq!(b.sync.state().light_enabled, light);

        b.clock.advance(10);
        b.report();
        let last = b.reports().pop().expect("report");
        assert_eq!(last["lightEnabled"], light);
    }
    assert_eq!(b.sync.stats().deltas_applied, 3);
}

#[test]
fn delta_without_light_field_changes_nothing() {
    let mut b = Bench::new();
    b.deliver(DELTA_TOPIC, &delta(true, 4));
    let writes = b.hw.light_writes();

    // Both decode; the sync core refuses to act on them.
    b.deliver(DELTA_TOPIC, r#"{"version":5,"state":{"color":"red"}}"#);
    b.deliver(DELTA_TOPIC, r#"{"version":6}"#);

    assert_eq!(b.hw.light_writes(), writes);
    assert!(b.sync.state().light_enabled);
    assert_eq!(
        b.sink.count(|e| matches!(
            e,
            AppEvent::MessageDropped(DropReason::MissingField("lightEnabled"))
        )),
        2
    );
}

#[test]
fn delta_for_another_thing_is_ignored() {
    let mut b = Bench::new();
    let before = *b.sync.state();
    let calls = b.hw.calls.len();

    assert!(!b.deliver(
        "$aws/things/garage-sensor/shadow/update/delta",
        &delta(true, 1)
    ));
    assert!(!b.deliver("esp32/other", r#"{"msg":"hello"}"#));

    assert_eq!(*b.sync.state(), before);
    assert_eq!(b.hw.calls.len(), calls);
    assert!(b.panel.lines.is_empty());
    assert!(b.broker.outbox.is_empty());
    assert_eq!(b.dispatcher.dropped(), 2);
}

// ── Alerts ────────────────────────────────────────────────────

#[test]
fn alert_shows_text_and_pulses_message_led() {
    let mut b = Bench::new();
    assert!(b.deliver("esp32/sub", r#"{"msg":"Door open"}"#));
    assert_eq!(b.panel.current(), Some("Door open"));
    assert_eq!(b.hw.pulses(Indicator::Message), 1);
}

#[test]
fn malformed_alert_leaves_display_untouched() {
    let mut b = Bench::new();
    b.deliver("esp32/sub", r#"{"msg":"first"}"#);

    for payload in ["{not json", "", r#"{"message":"wrong key"}"#, "[1,2,3]"] {
        assert!(!b.deliver("esp32/sub", payload), "accepted {payload:?}");
    }

    assert_eq!(b.panel.lines, vec!["first".to_string()]);
    assert_eq!(b.hw.pulses(Indicator::Message), 1);
    assert_eq!(b.dispatcher.handled(), 1);
    assert_eq!(b.dispatcher.dropped(), 4);
}

// ── Shock ─────────────────────────────────────────────────────

#[test]
fn every_active_poll_publishes_one_alert() {
    let mut b = Bench::new();
    b.hw.shock = true;
    for _ in 0..5 {
        assert!(b.poll());
    }

    let alerts = b.broker.published_on("esp32/shockAlert");
    assert_eq!(alerts.len(), 5);
    for alert in &alerts {
        assert_eq!(alert["shockSensor"], 1);
    }
    assert_eq!(b.panel.lines, vec![STATUS_SHOCK.to_string()]);

    b.hw.shock = false;
    assert!(!b.poll());
    assert!(!b.poll());
    assert_eq!(
        b.panel.lines,
        vec![STATUS_SHOCK.to_string(), STATUS_CALM.to_string()]
    );
    assert_eq!(b.broker.published_on("esp32/shockAlert").len(), 5);
}

#[test]
fn shock_alert_time_follows_indicator_hold() {
    let mut b = Bench::new();
    b.clock.advance(1_000);
    b.hw.shock = true;
    b.poll();

    let hold = u64::from(test_config().shock_indicator_hold_ms);
    let alert = &b.broker.published_on("esp32/shockAlert")[0];
    assert_eq!(alert["time"], 1_000 + hold);
    assert!(b.sync.state().shock_detected);
}

#[test]
fn alert_text_survives_quiet_polls() {
    let mut b = Bench::new();
    b.deliver("esp32/sub", r#"{"msg":"Package delivered"}"#);
    for _ in 0..3 {
        b.poll();
    }
    assert_eq!(b.panel.current(), Some("Package delivered"));
}

#[test]
fn climate_failure_alone_publishes_nothing() {
    let mut b = Bench::new();
    b.hw.climate = Err(SensorError::Timeout);
    b.poll();
    assert!(b.broker.outbox.is_empty());
    assert_eq!(b.hw.climate_reads, 0);
}
