//! Day/night setpoint schedule.
//!
//! During the day the loop targets the high threshold, the rest of the time
//! the low one. Both boundary hours belong to the night period.

use crate::config::ControllerConfig;
use crate::settings::ControlSettings;

/// Which half of the schedule is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Night,
}

/// Day period bounds, both exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// The day starts after this hour (0-23).
    pub start_hour: u8,
    /// The day ends before this hour (0-24).
    pub end_hour: u8,
}

impl DayWindow {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            start_hour: config.day_start_hour,
            end_hour: config.day_end_hour,
        }
    }

    /// Classify an hour of day. An unknown hour (clock not set) is night.
    pub fn period(&self, hour: Option<u8>) -> Period {
        match hour {
            Some(h) if self.start_hour < h && h < self.end_hour => Period::Day,
            _ => Period::Night,
        }
    }
}

impl Default for DayWindow {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 21,
        }
    }
}

/// Pick the active setpoint for `hour` from the user settings.
pub fn select_setpoint(hour: Option<u8>, settings: &ControlSettings, day: DayWindow) -> f32 {
    match day.period(hour) {
        Period::Day => f32::from(settings.high_threshold),
        Period::Night => f32::from(settings.low_threshold),
    }
}
