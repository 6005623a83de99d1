//! WiFi station-mode adapter.
//!
//! Brings the station up once at boot with build-time credentials
//! (`WIFI_SSID` / `WIFI_PASS`) and then polls the link from a background
//! thread, reconnecting with backoff. The control loop never waits on it.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying.

use core::fmt;
use log::{error, info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        if ssid.is_empty() || !is_printable_ascii(ssid) {
            return Err(ConnectivityError::InvalidSsid);
        }
        if !password.is_empty() && password.len() < 8 {
            return Err(ConnectivityError::InvalidPassword);
        }
        let ssid = heapless::String::try_from(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        let password =
            heapless::String::try_from(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(Self { ssid, password })
    }

    /// Credentials baked in at build time.
    pub fn from_build_env() -> Result<Self, ConnectivityError> {
        match option_env!("WIFI_SSID") {
            Some(ssid) if !ssid.is_empty() => Self::new(ssid, option_env!("WIFI_PASS").unwrap_or("")),
            _ => Err(ConnectivityError::NoCredentials),
        }
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    creds: WifiCredentials,
    backoff_secs: u32,
    next_attempt_ms: u64,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: link state and failure injection.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        creds: WifiCredentials,
        modem: Modem,
        sysloop: EspSystemEventLoop,
    ) -> anyhow::Result<Self> {
        let wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), None)?, sysloop)?;
        Ok(Self {
            state: WifiState::Disconnected,
            creds,
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_attempt_ms: 0,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(creds: WifiCredentials) -> Self {
        Self {
            state: WifiState::Disconnected,
            creds,
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_attempt_ms: 0,
            sim_link_up: false,
            sim_failures_left: 0,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    /// Blocking connect. Used once at boot, before the control loop runs.
    pub fn connect(&mut self) -> Result<(), ConnectivityError> {
        info!("WiFi: connecting to '{}'", self.creds.ssid());
        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                self.backoff_secs = INITIAL_BACKOFF_SECS;
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.state = WifiState::Reconnecting { attempt: 0 };
                Err(e)
            }
        }
    }

    /// Check the link and retry when the backoff has elapsed.
    pub fn poll(&mut self, now_ms: u64) {
        match self.state {
            WifiState::Connected => {
                if !self.platform_link_up() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.state = WifiState::Reconnecting { attempt: 0 };
                    self.next_attempt_ms = now_ms;
                }
            }
            WifiState::Reconnecting { attempt } if now_ms >= self.next_attempt_ms => {
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt, self.backoff_secs);
                match self.platform_connect() {
                    Ok(()) => {
                        self.state = WifiState::Connected;
                        self.backoff_secs = INITIAL_BACKOFF_SECS;
                        info!("WiFi: reconnected");
                    }
                    Err(_) => {
                        self.next_attempt_ms = now_ms + u64::from(self.backoff_secs) * 1000;
                        self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                        self.state = WifiState::Reconnecting {
                            attempt: attempt + 1,
                        };
                    }
                }
            }
            _ => {}
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.creds.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self
                .creds
                .ssid()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .creds
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let res = (|| -> anyhow::Result<()> {
            if !self.wifi.is_started()? {
                self.wifi.set_configuration(&config)?;
                self.wifi.start()?;
            }
            self.wifi.connect()?;
            self.wifi.wait_netif_up()?;
            let ip = self.wifi.wifi().sta_netif().get_ip_info()?;
            info!("WiFi: IP address {}", ip.ip);
            Ok(())
        })();
        res.map_err(|e| {
            warn!("WiFi: {:?}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            warn!("WiFi(sim): simulated connect failure");
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_link_up = true;
        info!("WiFi(sim): connected to '{}'", self.creds.ssid());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        self.sim_link_up
    }

    /// Simulation: drop the link.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
    }

    /// Simulation: make the next `n` connect attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_connects(&mut self, n: u32) {
        self.sim_failures_left = n;
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
