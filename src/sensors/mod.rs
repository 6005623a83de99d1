//! Sensor drivers.
//!
//! The humidistat has a single analog humidity probe; drivers here only
//! produce raw readings and leave interpretation to the control loop.

pub mod humidity;
