//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them (serial log, test recorder).

use crate::app::ports::SettingsError;
use crate::control::PumpState;
use crate::settings::ControlSettings;

/// Structured events emitted by the control core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The control loop has started with these settings.
    Started(ControlSettings),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The pump relay switched.
    PumpChanged(PumpState),

    /// New settings are in effect and were persisted.
    SettingsUpdated(ControlSettings),

    /// New settings are in effect but could not be persisted.
    SettingsSaveFailed(SettingsError),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub raw: u16,
    pub process_value: f32,
    pub setpoint: f32,
    pub output: f32,
    pub pump: PumpState,
    pub hour: Option<u8>,
    pub overrun_windows: u64,
}
