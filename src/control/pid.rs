//! PID controller for the humidity loop
//!
//! Proportional-integral-derivative law on the setpoint error, with the
//! output bounded to `[output_min, output_max]` (the relay window length).
//! The derivative is taken on the measurement, so a setpoint step moves
//! only the proportional and integral terms. With a constant setpoint this
//! equals `Kd * de/dt`.
//!
//! The controller is called every loop iteration but the process value only
//! changes once per sensor interval, so it gates itself on a sample time:
//! elapsed time is accumulated across calls and the law is only evaluated
//! once `sample_time` has passed. In between, the held output is returned.

/// PID controller
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    /// Integral contribution `Ki * ∫e dt`, kept inside the output range.
    i_term: f32,
    prev_input: Option<f32>,
    output_min: f32,
    output_max: f32,
    sample_time: f32,
    pending_dt: f32,
    output: Option<f32>,
}

impl PidController {
    /// `sample_time` is in seconds.
    pub fn new(kp: f32, ki: f32, kd: f32, sample_time: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            i_term: 0.0,
            prev_input: None,
            output_min: 0.0,
            output_max: 100.0,
            sample_time,
            pending_dt: 0.0,
            output: None,
        }
    }

    /// Set output limits. The integral term and the held output are pulled
    /// back inside the new range.
    pub fn set_limits(&mut self, min: f32, max: f32) {
        if min >= max {
            return;
        }
        self.output_min = min;
        self.output_max = max;
        self.i_term = self.i_term.clamp(min, max);
        if let Some(out) = self.output.as_mut() {
            *out = out.clamp(min, max);
        }
    }

    /// Compute the control output for `input` against `setpoint`.
    ///
    /// `dt` is the real elapsed time in seconds since the previous call.
    /// Non-positive or non-finite `dt` adds no time.
    pub fn compute(&mut self, input: f32, setpoint: f32, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            self.pending_dt += dt;
        }
        if let Some(held) = self.output {
            if self.pending_dt < self.sample_time {
                return held;
            }
        }
        let dt = self.pending_dt;
        self.pending_dt = 0.0;

        let error = setpoint - input;

        // Proportional
        let p = self.kp * error;

        if !error.is_finite() {
            // Keep integral/derivative memory clean; a NaN result maps to the floor.
            let out = self.bound(p);
            self.output = Some(out);
            return out;
        }

        // Integral (anti-windup: the contribution itself never leaves the output range)
        self.i_term = (self.i_term + self.ki * error * dt).clamp(self.output_min, self.output_max);

        // Derivative on the measurement: no kick when the setpoint steps
        let d = match self.prev_input {
            Some(prev) if dt > 0.0 => -self.kd * (input - prev) / dt,
            _ => 0.0,
        };
        self.prev_input = Some(input);

        let out = self.bound(p + self.i_term + d);
        self.output = Some(out);
        out
    }

    /// Last computed output (`output_min` before the first compute).
    pub fn output(&self) -> f32 {
        self.output.unwrap_or(self.output_min)
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.i_term = 0.0;
        self.prev_input = None;
        self.pending_dt = 0.0;
        self.output = None;
    }

    fn bound(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.output_min
        } else {
            value.clamp(self.output_min, self.output_max)
        }
    }
}
