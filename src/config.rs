//! Controller configuration parameters
//!
//! All fixed tunables of the control loop: PID gains, relay window timing,
//! sampling cadence and the day/night schedule boundaries. These are
//! compile-time defaults rather than user settings; the three user settings
//! live in [`ControlSettings`](crate::settings::ControlSettings).

use serde::{Deserialize, Serialize};

/// What the relay window does when more than one whole window has elapsed
/// between two ticks (e.g. after a stalled loop iteration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrunPolicy {
    /// Advance the window start by exactly one window per tick. Long stalls
    /// are corrected over several ticks and the phase under-corrects until
    /// then.
    AdvanceOnce,
    /// Advance by every whole window that has elapsed. Keeps the window grid
    /// anchored to the first start; it never resynchronises to "now".
    CatchUp,
}

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- PID ---
    /// Proportional gain
    pub kp: f32,
    /// Integral gain (per second)
    pub ki: f32,
    /// Derivative gain (seconds)
    pub kd: f32,
    /// Minimum time between two PID evaluations (milliseconds)
    pub pid_sample_time_ms: u32,

    // --- Relay window ---
    /// Relay window period; also the PID output upper bound (milliseconds)
    pub window_size_ms: u32,
    /// Outputs at or below this are never switched on (milliseconds)
    pub min_pulse_ms: u32,
    /// Window phase correction after a stall
    pub overrun_policy: OverrunPolicy,

    // --- Sensor ---
    /// Sensor sampling interval (milliseconds)
    pub sample_interval_ms: u32,
    /// Full-scale raw reading; process value = sensor_max - raw
    pub sensor_max: u16,

    // --- Schedule ---
    /// Day period starts strictly after this hour
    pub day_start_hour: u8,
    /// Day period ends strictly before this hour
    pub day_end_hour: u8,

    // --- Housekeeping ---
    /// Telemetry report interval (milliseconds)
    pub telemetry_interval_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // PID
            kp: 1.0,
            ki: 10.0,
            kd: 2.0,
            pid_sample_time_ms: 100,

            // Relay window
            window_size_ms: 5000,
            min_pulse_ms: 1000,
            overrun_policy: OverrunPolicy::AdvanceOnce,

            // Sensor
            sample_interval_ms: 1000, // 1 Hz
            sensor_max: 1024,

            // Schedule: high setpoint for 10:00–20:59
            day_start_hour: 9,
            day_end_hour: 21,

            // Housekeeping
            telemetry_interval_ms: 60_000, // 1/min
            watchdog_timeout_ms: 5000,
        }
    }
}
