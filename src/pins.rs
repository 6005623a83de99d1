//! GPIO / peripheral pin assignments for the Humidistat board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Humidity probe (resistive, analog output)
// ---------------------------------------------------------------------------

/// Analog humidity probe, ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const HUMIDITY_ADC_GPIO: i32 = 1;
/// ADC1 channel for the humidity probe.
pub const HUMIDITY_ADC_CHANNEL: u32 = 0;
/// Digital comparator output of the probe module. Read-only, unused by the
/// control loop but configured as input so the line does not float.
pub const HUMIDITY_DIGITAL_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Pump relay
// ---------------------------------------------------------------------------

/// Digital output driving the pump relay (active HIGH).
pub const PUMP_RELAY_GPIO: i32 = 6;
