//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the control loop orchestration for the humidistat:
//! setpoint scheduling, PID control and relay-window actuation.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod status;
