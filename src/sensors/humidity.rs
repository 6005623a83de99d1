//! Resistive soil/air humidity probe driver.
//!
//! The probe module outputs an analog voltage that falls as humidity rises.
//! The driver rescales the 12-bit ADC reading to the probe's 0–1024 range;
//! the control loop applies the inversion to get a process value.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the humidity ADC1 channel via the oneshot API
//! (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

use log::warn;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::{Error, SensorError};
#[cfg(target_os = "espidf")]
use crate::pins;

static SIM_HUMIDITY_ADC: AtomicU16 = AtomicU16::new(0);

/// Inject the next raw ADC value (12-bit) seen by host builds.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_humidity_adc(raw: u16) {
    SIM_HUMIDITY_ADC.store(raw, Ordering::Relaxed);
}

/// Full-scale 12-bit ADC reading.
const ADC_FULL_SCALE: u32 = 4095;

pub struct HumiditySensor {
    sensor_max: u16,
    last_raw: u16,
    read_failures: u32,
}

impl HumiditySensor {
    pub fn new(sensor_max: u16) -> Self {
        Self {
            sensor_max,
            last_raw: 0,
            read_failures: 0,
        }
    }

    /// Raw reading in `0..=sensor_max`.
    ///
    /// A failed ADC read yields 0, which the control loop treats like any
    /// other reading.
    pub fn read(&mut self) -> u16 {
        let raw = match self.read_adc() {
            Ok(adc) => self.scale(adc),
            Err(e) => {
                self.read_failures = self.read_failures.saturating_add(1);
                if self.read_failures == 1 {
                    warn!("{}, reading 0", Error::from(e));
                }
                0
            }
        };
        self.last_raw = raw;
        raw
    }

    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    pub fn read_failures(&self) -> u32 {
        self.read_failures
    }

    fn scale(&self, adc: u16) -> u16 {
        let adc = u32::from(adc).min(ADC_FULL_SCALE);
        ((adc * u32::from(self.sensor_max) + ADC_FULL_SCALE / 2) / ADC_FULL_SCALE) as u16
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(pins::HUMIDITY_ADC_CHANNEL)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, SensorError> {
        Ok(SIM_HUMIDITY_ADC.load(Ordering::Relaxed))
    }
}
