//! Pump relay driver.
//!
//! The pump is switched by a single active-HIGH relay line. The driver is
//! generic over any `embedded-hal` [`OutputPin`], so the board pin and test
//! doubles share one code path.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`RelayPin`] drives the GPIO via hw_init helpers.
//! On host/test: [`RelayPin`] mirrors the level into a static `AtomicBool`
//! for inspection.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{Error as _, ErrorType, OutputPin};
use log::{debug, info};

use crate::control::PumpState;
use crate::drivers::hw_init;
use crate::error::ActuatorError;

static SIM_RELAY_LEVEL: AtomicBool = AtomicBool::new(false);

/// Relay level last written by a host-side [`RelayPin`].
#[cfg(not(target_os = "espidf"))]
pub fn sim_relay_level() -> bool {
    SIM_RELAY_LEVEL.load(Ordering::Relaxed)
}

impl embedded_hal::digital::Error for ActuatorError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Raw GPIO output configured by [`hw_init::init_peripherals`].
pub struct RelayPin {
    gpio: i32,
}

impl RelayPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for RelayPin {
    type Error = ActuatorError;
}

impl OutputPin for RelayPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false)?;
        SIM_RELAY_LEVEL.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true)?;
        SIM_RELAY_LEVEL.store(true, Ordering::Relaxed);
        Ok(())
    }
}

pub struct PumpDriver<P: OutputPin> {
    pin: P,
    state: PumpState,
    /// The pin level is known to match `state`.
    synced: bool,
    write_failures: u32,
}

impl<P: OutputPin> PumpDriver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            state: PumpState::Off,
            synced: false,
            write_failures: 0,
        }
    }

    /// Switch the relay. Repeating the current state is a no-op; after a
    /// failed write the next call always hits the pin again.
    pub fn set(&mut self, state: PumpState) -> Result<(), ActuatorError> {
        if self.synced && self.state == state {
            return Ok(());
        }
        let res = match state {
            PumpState::On => self.pin.set_high(),
            PumpState::Off => self.pin.set_low(),
        };
        match res {
            Ok(()) => {
                info!("Pump: {}", state);
                self.state = state;
                self.synced = true;
                Ok(())
            }
            Err(e) => {
                self.synced = false;
                self.write_failures = self.write_failures.saturating_add(1);
                debug!("Pump: relay write failed ({:?})", e.kind());
                Err(ActuatorError::GpioWriteFailed)
            }
        }
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.set(PumpState::Off)
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_on()
    }

    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }
}

/// Pin that accepts every write; used where no relay is fitted.
pub struct NoRelay;

impl ErrorType for NoRelay {
    type Error = Infallible;
}

impl OutputPin for NoRelay {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
