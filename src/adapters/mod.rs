//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `hardware`     | SensorPort         | ESP32 GPIO, DHT22           |
//! |                | ActuatorPort       | ESP32 GPIO (LEDs, relay)    |
//! | `mqtt`         | MqttTransport      | AWS IoT broker (MQTT/TLS)   |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA            |
//! | `display`      | DisplayPort        | SSD1306 OLED over I²C       |
//! | `time`         | ClockPort          | ESP32 system timer          |
//! | `log_sink`     | EventSink          | Serial log output           |
//! | `cert_store`   | —                  | X.509 material in NVS       |
//! | `device_id`    | —                  | eFuse MAC                   |

pub mod cert_store;
pub mod device_id;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
