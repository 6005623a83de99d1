//! Hardware adapter bridging real peripherals to domain port traits.
//!
//! Owns the humidity probe and the pump relay driver, exposing them
//! through [`SensorPort`] and [`ActuatorPort`]. This is the only module in
//! the system that touches actual hardware. On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::control::PumpState;
use crate::drivers::pump::PumpDriver;
use crate::error::Error;
use crate::sensors::humidity::HumiditySensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P: OutputPin> {
    humidity: HumiditySensor,
    pump: PumpDriver<P>,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(humidity: HumiditySensor, pump: PumpDriver<P>) -> Self {
        Self { humidity, pump }
    }

    pub fn pump(&self) -> &PumpDriver<P> {
        &self.pump
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: OutputPin> SensorPort for HardwareAdapter<P> {
    fn read_raw(&mut self) -> u16 {
        self.humidity.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: OutputPin> ActuatorPort for HardwareAdapter<P> {
    fn set_pump(&mut self, state: PumpState) {
        // The driver retries a failed write on the next tick
        if let Err(e) = self.pump.set(state) {
            warn!("{}, pump left {}", Error::from(e), self.pump.state());
        }
    }
}
