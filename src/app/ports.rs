//! Port traits: the hexagonal boundary between the control core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (humidity probe, pump relay, clock, event sinks, storage)
//! implement these traits. The [`ControlLoop`](super::service::ControlLoop)
//! consumes them via generics, so the control core never touches hardware
//! directly and can be driven by synthetic clocks in tests.

use core::fmt::Write as _;

use crate::control::PumpState;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain a humidity reading.
pub trait SensorPort {
    /// Raw probe reading in `0..=sensor_max`.
    ///
    /// Read failures are not distinguished from implausible readings; the
    /// adapter returns whatever value it has and the PID clamp bounds the
    /// consequences.
    fn read_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to switch the pump relay.
pub trait ActuatorPort {
    /// Drive the pump relay. Plain digital write, no acknowledgement.
    fn set_pump(&mut self, state: PumpState);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: RTC / SNTP → domain)
// ───────────────────────────────────────────────────────────────

/// Time source for the control loop.
///
/// Control timing (sampling cadence, relay window) is measured against
/// [`now_ms`](Self::now_ms) only, so wall-clock adjustments from SNTP never
/// disturb it. The wall clock is used for the day/night schedule and display.
pub trait ClockPort {
    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Seconds since the Unix epoch, or `None` until the wall clock is set.
    fn epoch_secs(&self) -> Option<i64>;

    /// Local hour of day (0–23) shifted by a signed hour offset.
    fn hour_of_day(&self, offset_hours: i16) -> Option<u8> {
        let local = self.epoch_secs()? + i64::from(offset_hours) * 3600;
        Some(local.rem_euclid(86_400).div_euclid(3600) as u8)
    }

    /// Local time as `HH:MM:SS`, or `--:--:--` when the clock is not set.
    fn formatted_time(&self, offset_hours: i16) -> heapless::String<8> {
        let mut s = heapless::String::new();
        match self.epoch_secs() {
            Some(epoch) => {
                let t = (epoch + i64::from(offset_hours) * 3600).rem_euclid(86_400);
                let _ = write!(s, "{:02}:{:02}:{:02}", t / 3600, (t / 60) % 60, t % 60);
            }
            None => {
                let _ = s.push_str("--:--:--");
            }
        }
        s
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, tests).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value blob storage.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - A single `write` is one commit. The ESP-IDF NVS API makes a commit
///   atomic with respect to power loss; the in-memory simulation does so
///   trivially.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value and commit it.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// The commit of the encoded settings failed.
    StorageWrite(StorageError),
    /// The stored region could not be read.
    StorageRead(StorageError),
    /// The stored region is shorter than the settings layout.
    Truncated(usize),
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StorageWrite(e) => write!(f, "storage write failed: {e}"),
            Self::StorageRead(e) => write!(f, "storage read failed: {e}"),
            Self::Truncated(n) => write!(f, "settings region truncated ({n} bytes)"),
        }
    }
}
