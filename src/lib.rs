//! Humidistat firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod settings;
pub mod ui;

pub mod pins;

// The driver/adapter layer compiles on every target; hardware access inside
// is swapped for simulation stubs off-target.
pub mod adapters;
pub mod drivers;
pub mod sensors;
