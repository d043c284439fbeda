//! Device identity derived from the ESP32 factory MAC address.
//!
//! When no thing name is configured, the MQTT client id (and therefore the
//! shadow topic prefix) falls back to `shock-xxyyzz`, built from the last
//! 3 bytes of the factory-burned eFuse MAC. It is stable across reboots.

use core::fmt::Write;

use crate::app::runtime::CLIENT_ID_MAX;

/// Client id string.
pub type ClientId = heapless::String<CLIENT_ID_MAX>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: the buffer is exactly the 6 bytes the call writes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `shock-xxyyzz` (lowercase hex; thing names are case-sensitive).
pub fn fallback_client_id(mac: &MacAddress) -> ClientId {
    let mut id = ClientId::new();
    let _ = write!(id, "shock-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}

/// The configured thing name, or the MAC-derived fallback when empty.
pub fn client_id(thing_name: &str, mac: &MacAddress) -> ClientId {
    if thing_name.is_empty() {
        fallback_client_id(mac)
    } else {
        crate::config::bounded(thing_name)
    }
}
