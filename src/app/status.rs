//! Read-only status snapshot for the settings UI.
//!
//! The control loop publishes one of these after every iteration; the HTTP
//! handlers only ever read the latest copy.

use serde::Serialize;

use crate::control::PumpState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    /// Process value of the latest sample (`sensor_max - raw`).
    pub humidity: f32,
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: heapless::String<8>,
    pub high_value: i16,
    pub low_value: i16,
    pub offset: i16,
    pub setpoint: f32,
    pub output: f32,
    pub pump: PumpState,
}

impl Default for StatusView {
    fn default() -> Self {
        let mut time = heapless::String::new();
        let _ = time.push_str("--:--:--");
        Self {
            humidity: 0.0,
            time,
            high_value: 0,
            low_value: 0,
            offset: 0,
            setpoint: 0.0,
            output: 0.0,
            pump: PumpState::Off,
        }
    }
}
