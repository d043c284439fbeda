//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for the network
//! link underneath the broker session.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! None here. A failed [`connect`](ConnectivityPort::connect) returns at
//! once; the caller retries on a fixed delay.

use log::{error, info};

use crate::app::ports::ConnectivityPort;
use crate::error::ConnectivityError;

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Failed { attempts: u32 },
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    /// Simulation: remaining attempts that fail before one succeeds.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
    /// Simulation: link state as seen by `is_connected`.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            sim_failures_left: 0,
            sim_link_up: false,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Simulation: make the next `n` connect attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures_left = n;
    }

    /// Simulation: drop the link as if the AP went away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
        self.state = WifiState::Disconnected;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let fail = |e: esp_idf_svc::sys::EspError| {
            error!("WiFi: driver error {:?}", e);
            ConnectivityError::ConnectionFailed
        };
        self.wifi.set_configuration(&conf).map_err(fail)?;
        if !self.wifi.is_started().map_err(fail)? {
            self.wifi.start().map_err(fail)?;
        }
        self.wifi.connect().map_err(fail)?;
        self.wifi.wait_netif_up().map_err(fail)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_link_up = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.platform_is_connected() {
            self.state = WifiState::Connected;
            return Ok(());
        }

        let failed_before = match self.state {
            WifiState::Failed { attempts } => attempts,
            _ => 0,
        };
        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                let attempts = failed_before.saturating_add(1);
                error!("WiFi: connection failed ({}), attempt {}", e, attempts);
                self.state = WifiState::Failed { attempts };
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
