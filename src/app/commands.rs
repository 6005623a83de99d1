//! Inbound commands to the control loop.
//!
//! These represent actions requested by the outside world (settings form,
//! tests) that the [`ControlLoop`](super::service::ControlLoop) interprets
//! and acts upon.

use crate::settings::ControlSettings;

/// Commands that external adapters can send into the control core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Replace the whole settings value and persist it.
    UpdateSettings(ControlSettings),
}
