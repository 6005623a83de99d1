//! Time-proportioning relay window.
//!
//! Turns the continuous PID output (milliseconds of ON time per window) into
//! a binary pump state. Within each fixed-length window the pump is ON while
//! the elapsed time is below the output, so the duty cycle follows the
//! output. Outputs at or below the minimum pulse never switch the pump on,
//! which keeps very small duty cycles from chattering the relay.
//!
//! The window start is a phase accumulator: it advances by whole windows and
//! never resets to "now", so the long-run period stays exact even when ticks
//! arrive late.

use log::warn;

use crate::config::OverrunPolicy;

use super::PumpState;

pub struct RelayWindow {
    window_size_ms: u64,
    min_pulse_ms: u64,
    policy: OverrunPolicy,
    window_start_ms: u64,
    /// Whole windows still behind "now" after the last phase correction.
    backlog: u64,
}

impl RelayWindow {
    pub fn new(window_size_ms: u32, min_pulse_ms: u32, policy: OverrunPolicy) -> Self {
        Self {
            window_size_ms: u64::from(window_size_ms.max(1)),
            min_pulse_ms: u64::from(min_pulse_ms),
            policy,
            window_start_ms: 0,
            backlog: 0,
        }
    }

    /// Start the first window at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.window_start_ms = now_ms;
        self.backlog = 0;
    }

    /// Decide the pump state for `output` (ms of ON time) at `now_ms`.
    pub fn tick(&mut self, output: f32, now_ms: u64) -> PumpState {
        let since = now_ms.saturating_sub(self.window_start_ms);
        if since > self.window_size_ms {
            // Windows owed until `now - start <= window`
            let owed = (since - 1) / self.window_size_ms;
            let step = match self.policy {
                OverrunPolicy::AdvanceOnce => 1,
                OverrunPolicy::CatchUp => owed,
            };
            self.window_start_ms += step * self.window_size_ms;

            let backlog = owed - step;
            if backlog > 0 && self.backlog == 0 {
                warn!(
                    "RelayWindow: loop stalled, window phase {} window(s) behind",
                    backlog
                );
            }
            self.backlog = backlog;
        }

        let elapsed = now_ms.saturating_sub(self.window_start_ms) as f32;
        PumpState::from(output > elapsed && output > self.min_pulse_ms as f32)
    }

    /// Start of the current window (ms).
    pub fn window_start_ms(&self) -> u64 {
        self.window_start_ms
    }

    /// Whole windows the phase is still behind after the last tick.
    /// Always 0 under [`OverrunPolicy::CatchUp`].
    pub fn overrun_windows(&self) -> u64 {
        self.backlog
    }
}
