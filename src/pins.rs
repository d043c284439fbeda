//! GPIO / peripheral pin assignments for the ShockShadow board
//! (ESP32 with on-board SSD1306 OLED).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Vibration switch module. Digital input, HIGH = shock.
pub const SHOCK_GPIO: i32 = 12;

/// DHT22 single-wire data line (open-drain, external 10 kΩ pull-up).
pub const DHT_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Shock indicator LED (100 Ω series resistor). Active HIGH.
pub const SHOCK_LED_GPIO: i32 = 13;

/// Inbound-message indicator LED. Active HIGH.
pub const MESSAGE_LED_GPIO: i32 = 25;

/// Light relay driver. HIGH = light on.
pub const LIGHT_RELAY_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// OLED (SSD1306, I²C)
// ---------------------------------------------------------------------------

pub const OLED_SDA_GPIO: i32 = 4;
pub const OLED_SCL_GPIO: i32 = 15;
/// Panel reset; must be pulsed low before the first I²C transaction.
pub const OLED_RST_GPIO: i32 = 16;
/// 7-bit I²C address.
pub const OLED_I2C_ADDR: u8 = 0x3C;
/// I²C bus clock.
pub const OLED_I2C_HZ: u32 = 400_000;
