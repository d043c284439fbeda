//! ShockShadow Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative main loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   OledDisplay   Esp32Time      │
//! │  (Sensor+Actuator) (EventSink)    (Display)     (Clock)        │
//! │  WifiAdapter       MqttAdapter    CertStore                    │
//! │  (Connectivity)    (Transport)    (TLS material)               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Runtime (pure logic)                      │    │
//! │  │  ShadowSync · Dispatcher · connect/retry               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{anyhow, Result};
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::Ets;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::FromValueType;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use shockshadow::adapters::cert_store::CertStore;
use shockshadow::adapters::device_id;
use shockshadow::adapters::display::OledDisplay;
use shockshadow::adapters::hardware::HardwareAdapter;
use shockshadow::adapters::log_sink::LogEventSink;
use shockshadow::adapters::mqtt::{BrokerSettings, MqttAdapter};
use shockshadow::adapters::time::Esp32TimeAdapter;
use shockshadow::adapters::wifi::WifiAdapter;
use shockshadow::app::ports::ClockPort;
use shockshadow::app::runtime::Runtime;
use shockshadow::config::SystemConfig;
use shockshadow::drivers::{self, indicator::IndicatorLed, light::LightRelay};
use shockshadow::pins;
use shockshadow::sensors::{climate::Dht22, shock::ShockSensor, SensorHub};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ShockShadow v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Raw GPIO (shock input, LEDs, relay, OLED reset) ────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Nothing useful can run without the outputs; halt here.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Configuration ──────────────────────────────────────
    let config = SystemConfig::from_build_env();
    config
        .validate()
        .map_err(|e| anyhow!("config rejected: {}", e))?;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 4. Identity and TLS material ──────────────────────────
    let mac = device_id::read_mac();
    let client_id = device_id::client_id(&config.thing_name, &mac);
    info!("Client ID: {}", client_id);

    let certs = match CertStore::new(nvs.clone()).load_bundle() {
        // The MQTT client borrows the PEM buffers for its whole lifetime.
        Some(bundle) => {
            let leaked: &'static _ = Box::leak(Box::new(bundle));
            Some(leaked)
        }
        None => {
            warn!("No certificate bundle in NVS; broker will reject the session");
            None
        }
    };

    // ── 5. Construct adapters ─────────────────────────────────
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?);
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)
        .map_err(|e| anyhow!("wifi credentials: {}", e))?;

    let dht_pin = PinDriver::input_output_od(peripherals.pins.gpio27)?;
    let sensor_hub = SensorHub::new(
        ShockSensor::new(pins::SHOCK_GPIO),
        Dht22::new(dht_pin, Ets),
    );
    let mut hw = HardwareAdapter::new(
        sensor_hub,
        IndicatorLed::new(pins::SHOCK_LED_GPIO),
        IndicatorLed::new(pins::MESSAGE_LED_GPIO),
        LightRelay::new(pins::LIGHT_RELAY_GPIO),
    );

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio4,
        peripherals.pins.gpio15,
        &I2cConfig::new().baudrate(pins::OLED_I2C_HZ.Hz()),
    )?;
    let mut display = OledDisplay::new(i2c);
    info!(
        "Peripherals: DHT22 on GPIO{}, OLED on SDA={} SCL={}",
        pins::DHT_GPIO,
        pins::OLED_SDA_GPIO,
        pins::OLED_SCL_GPIO
    );

    let mut transport = MqttAdapter::new(BrokerSettings::from(&config), certs);
    let mut clock = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 6. Bring up links and start the sync core ─────────────
    let mut runtime = Runtime::new(&config, &client_id);
    runtime
        .bring_up(
            &mut wifi,
            &mut transport,
            &mut hw,
            &mut display,
            &mut clock,
            &mut log_sink,
        )
        .map_err(|e| anyhow!("bring-up failed: {}", e))?;

    info!("System ready. Entering main loop.");

    // ── 7. Main loop ──────────────────────────────────────────
    loop {
        match runtime.run_once(
            &mut wifi,
            &mut transport,
            &mut hw,
            &mut display,
            &mut clock,
            &mut log_sink,
        ) {
            Ok(outcome) if outcome.reconnected => {
                info!("Session restored after {} passes", runtime.passes());
            }
            Ok(_) => {}
            Err(e) => {
                error!("Main loop pass failed: {}", e);
                clock.delay_ms(config.connect_retry_delay_ms);
            }
        }
    }
}
