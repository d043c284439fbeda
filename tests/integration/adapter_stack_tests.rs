//! The runtime driven through the host builds of the real adapters.
//!
//! The sim adapters share process-wide statics (shock level, climate
//! values, broker inbox, GPIO levels), so everything lives in one test.

use crate::mock_hw::{test_config, RecordingSink, DELTA_TOPIC, THING, UPDATE_TOPIC};

use shockshadow::adapters::display::SimDisplay;
use shockshadow::adapters::hardware::HardwareAdapter;
use shockshadow::adapters::mqtt::{self, BrokerSettings, MqttAdapter};
use shockshadow::adapters::time::Esp32TimeAdapter;
use shockshadow::adapters::wifi::WifiAdapter;
use shockshadow::app::connect::STATUS_IOT_CONNECTED;
use shockshadow::app::runtime::Runtime;
use shockshadow::app::sync::STATUS_SHOCK;
use shockshadow::drivers::hw_init::sim_gpio_level;
use shockshadow::drivers::indicator::IndicatorLed;
use shockshadow::drivers::light::LightRelay;
use shockshadow::pins;
use shockshadow::sensors::climate::{sim_set_climate, SimClimateProbe};
use shockshadow::sensors::shock::{sim_set_shock, ShockSensor};
use shockshadow::sensors::SensorHub;

fn json(payload: &[u8]) -> serde_json::Value {
    serde_json::from_slice(payload).expect("outbound payload is JSON")
}

#[test]
fn sim_adapters_run_a_full_session() {
    let mut cfg = test_config();
    cfg.shock_indicator_hold_ms = 1;
    cfg.shadow_report_interval_ms = 1;
    cfg.connect_retry_delay_ms = 1;
    cfg.wifi_ssid = heapless::String::try_from("lab-net").expect("ssid fits");
    cfg.wifi_password = heapless::String::try_from("correct horse").expect("password fits");

    let mut wifi = WifiAdapter::new();
    wifi.set_credentials(&cfg.wifi_ssid, &cfg.wifi_password)
        .expect("credentials");
    wifi.sim_fail_next(1);

    let mut hw = HardwareAdapter::new(
        SensorHub::new(ShockSensor::new(pins::SHOCK_GPIO), SimClimateProbe),
        IndicatorLed::new(pins::SHOCK_LED_GPIO),
        IndicatorLed::new(pins::MESSAGE_LED_GPIO),
        LightRelay::new(pins::LIGHT_RELAY_GPIO),
    )
    .with_delay(|_| {});
    let mut transport = MqttAdapter::new(BrokerSettings::from(&cfg));
    let mut display = SimDisplay::new();
    let mut clock = Esp32TimeAdapter::new();
    let mut sink = RecordingSink::default();

    let mut runtime = Runtime::new(&cfg, THING);
    runtime
        .bring_up(&mut wifi, &mut transport, &mut hw, &mut display, &mut clock, &mut sink)
        .expect("bring-up");
    assert_eq!(display.current(), STATUS_IOT_CONNECTED);
    assert_eq!(transport.subscriptions().len(), 2);
    assert!(!sim_gpio_level(pins::LIGHT_RELAY_GPIO));

    // Remote turns the light on; the relay pin follows within one pass.
    mqtt::sim_inject(DELTA_TOPIC, br#"{"version":2,"state":{"lightEnabled":true}}"#);
    sim_set_climate(20.0, 50.0);
    std::thread::sleep(std::time::Duration::from_millis(2));
    let outcome = runtime
        .run_once(&mut wifi, &mut transport, &mut hw, &mut display, &mut clock, &mut sink)
        .expect("pass");
    assert_eq!(outcome.messages_handled, 1);
    assert!(outcome.report_attempted);
    assert!(sim_gpio_level(pins::LIGHT_RELAY_GPIO));
    assert!(hw.is_light_on());

    let (topic, payload) = transport.outbox().last().expect("report");
    assert_eq!(topic, UPDATE_TOPIC);
    let reported = &json(payload)["state"]["reported"];
    assert_eq!(reported["lightEnabled"], true);
    assert_eq!(reported["tempFahrenheit"].as_f64(), Some(68.0));
    assert_eq!(reported["humidity"].as_f64(), Some(50.0));

    // A shock publishes and lands on the panel.
    sim_set_shock(true);
    let outcome = runtime
        .run_once(&mut wifi, &mut transport, &mut hw, &mut display, &mut clock, &mut sink)
        .expect("pass");
    sim_set_shock(false);
    assert!(outcome.shock_published);
    assert_eq!(display.current(), STATUS_SHOCK);
    assert!(transport
        .outbox()
        .iter()
        .any(|(t, p)| t == "esp32/shockAlert" && json(p)["shockSensor"] == 1));

    // Session loss is repaired on the next pass.
    mqtt::sim_set_session(false);
    let outcome = runtime
        .run_once(&mut wifi, &mut transport, &mut hw, &mut display, &mut clock, &mut sink)
        .expect("pass");
    assert!(outcome.reconnected);
    assert_eq!(transport.subscriptions().len(), 2);
    assert_eq!(mqtt::inbox_drops(), 0);
}
