//! Control core: PID law, time-proportioning relay window, day/night schedule.
//!
//! Everything in here is pure state + arithmetic. Time is passed in by the
//! caller, so each component can be driven by a synthetic clock.

pub mod pid;
pub mod relay_window;
pub mod schedule;

use serde::{Deserialize, Serialize};

/// Binary pump relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PumpState {
    On,
    #[default]
    Off,
}

impl PumpState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

impl From<bool> for PumpState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl core::fmt::Display for PumpState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::On => write!(f, "ON"),
            Self::Off => write!(f, "OFF"),
        }
    }
}
