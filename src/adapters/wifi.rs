//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the boundary for network
//! connectivity.  The request interface is only reachable while this
//! adapter is connected; switching itself never depends on it.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` driver.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) between attempts.  [`ConnectivityPort::poll`]
//! is cheap to call often; it only retries once the backoff has elapsed.

use core::fmt;
use std::time::{Duration, Instant};

use log::{error, info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-64 bytes for WPA2, or empty for open)"
            ),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

pub trait ConnectivityPort {
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    fn poll(&mut self);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
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
    backoff_secs: u32,
    retry_at: Option<Instant>,
    #[cfg(target_os = "espidf")]
    driver: Option<BlockingWifi<EspWifi<'static>>>,
    /// Simulation: number of upcoming connect attempts that fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            retry_at: None,
            #[cfg(target_os = "espidf")]
            driver: None,
            #[cfg(not(target_os = "espidf"))]
            sim_failures: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_link_up: false,
        }
    }

    /// Hand over the ESP-IDF driver built in `main`.
    #[cfg(target_os = "espidf")]
    pub fn attach(&mut self, driver: BlockingWifi<EspWifi<'static>>) {
        self.driver = Some(driver);
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(u64::from(self.backoff_secs))
    }

    /// [`ConnectivityPort::poll`] against an explicit clock.
    pub fn poll_at(&mut self, now: Instant) {
        match self.state {
            WifiState::Reconnecting { attempt } => {
                if self.retry_at.is_some_and(|at| now < at) {
                    return;
                }
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt, self.backoff_secs);
                match self.platform_connect() {
                    Ok(()) => self.on_connected(),
                    Err(e) => {
                        warn!("WiFi: reconnect failed — {}", e);
                        self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                        self.retry_at = Some(now + self.backoff());
                        self.state = WifiState::Reconnecting {
                            attempt: attempt + 1,
                        };
                    }
                }
            }
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.state = WifiState::Reconnecting { attempt: 0 };
                    self.retry_at = Some(now + self.backoff());
                }
            }
            _ => {}
        }
    }

    fn on_connected(&mut self) {
        self.state = WifiState::Connected;
        self.backoff_secs = INITIAL_BACKOFF_SECS;
        self.retry_at = None;
        info!("WiFi: connected to '{}'", self.ssid);
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let Some(wifi) = self.driver.as_mut() else {
            return Err(ConnectivityError::ConnectionFailed);
        };
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
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

        let fail = |step: &str, e: esp_idf_svc::sys::EspError| {
            warn!("WiFi(espidf): {} failed: {}", step, e);
            ConnectivityError::ConnectionFailed
        };
        wifi.set_configuration(&config).map_err(|e| fail("configure", e))?;
        if !wifi.is_started().unwrap_or(false) {
            wifi.start().map_err(|e| fail("start", e))?;
        }
        wifi.connect().map_err(|e| fail("connect", e))?;
        wifi.wait_netif_up().map_err(|e| fail("netif up", e))?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_link_up = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Some(wifi) = self.driver.as_mut() {
            if let Err(e) = wifi.disconnect() {
                warn!("WiFi(espidf): disconnect failed: {}", e);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim_link_up = false;
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|wifi| wifi.is_connected().unwrap_or(false))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    /// Simulation: make the next `n` connect attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures = n;
    }

    /// Simulation: drop the link as an AP outage would.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
    }
}

impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
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
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.on_connected();
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed — {}", e);
                self.state = WifiState::Reconnecting { attempt: 0 };
                self.retry_at = Some(Instant::now() + self.backoff());
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        self.retry_at = None;
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
