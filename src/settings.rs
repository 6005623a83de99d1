//! Persisted user settings.
//!
//! Three 16-bit integers in a fixed 6-byte layout:
//!
//! | Offset | Field                   | Encoding              |
//! |--------|-------------------------|-----------------------|
//! | 0      | `high_threshold`        | i16, big-endian       |
//! | 2      | `low_threshold`         | i16, big-endian       |
//! | 4      | `timezone_offset_hours` | i16, big-endian       |
//!
//! There is no version tag or checksum. A corrupted region decodes to
//! arbitrary but bounded integers, and the PID output clamp bounds what the
//! loop does with them.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{SettingsError, StorageError, StoragePort};
use crate::error::Error;

/// Encoded size of [`ControlSettings`].
pub const SETTINGS_LEN: usize = 6;

const SETTINGS_NAMESPACE: &str = "humidistat";
const SETTINGS_KEY: &str = "settings";

/// User-adjustable control settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSettings {
    /// Daytime target in sensor units.
    pub high_threshold: i16,
    /// Night-time target in sensor units.
    pub low_threshold: i16,
    /// Signed hour offset applied to the wall clock.
    pub timezone_offset_hours: i16,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            high_threshold: 400,
            low_threshold: 200,
            timezone_offset_hours: 0,
        }
    }
}

impl ControlSettings {
    pub fn encode(&self) -> [u8; SETTINGS_LEN] {
        let mut buf = [0u8; SETTINGS_LEN];
        buf[0..2].copy_from_slice(&self.high_threshold.to_be_bytes());
        buf[2..4].copy_from_slice(&self.low_threshold.to_be_bytes());
        buf[4..6].copy_from_slice(&self.timezone_offset_hours.to_be_bytes());
        buf
    }

    /// Decode the fixed layout. Returns `None` if `bytes` is too short;
    /// trailing bytes are ignored.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let field = |at: usize| -> Option<i16> {
            let pair = bytes.get(at..at + 2)?;
            Some(i16::from_be_bytes([pair[0], pair[1]]))
        };
        Some(Self {
            high_threshold: field(0)?,
            low_threshold: field(2)?,
            timezone_offset_hours: field(4)?,
        })
    }
}

/// Read the persisted settings.
pub fn try_load(storage: &impl StoragePort) -> Result<ControlSettings, SettingsError> {
    let mut buf = [0u8; SETTINGS_LEN];
    let len = storage
        .read(SETTINGS_NAMESPACE, SETTINGS_KEY, &mut buf)
        .map_err(SettingsError::StorageRead)?;
    ControlSettings::decode(&buf[..len]).ok_or(SettingsError::Truncated(len))
}

/// Read the persisted settings, falling back to defaults.
pub fn load(storage: &impl StoragePort) -> ControlSettings {
    match try_load(storage) {
        Ok(s) => {
            info!(
                "Settings: loaded high={} low={} offset={}",
                s.high_threshold, s.low_threshold, s.timezone_offset_hours
            );
            s
        }
        Err(SettingsError::StorageRead(StorageError::NotFound)) => {
            info!("Settings: none stored, using defaults");
            ControlSettings::default()
        }
        Err(e) => {
            warn!("{}, using defaults", Error::from(e));
            ControlSettings::default()
        }
    }
}

/// Persist `settings` with a single storage commit.
pub fn save(storage: &mut impl StoragePort, settings: &ControlSettings) -> Result<(), SettingsError> {
    storage
        .write(SETTINGS_NAMESPACE, SETTINGS_KEY, &settings.encode())
        .map_err(SettingsError::StorageWrite)
}
