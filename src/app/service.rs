//! Control loop orchestrator, the hexagonal core.
//!
//! [`ControlLoop`] owns the PID controller, the relay window and the current
//! settings. It exposes a hardware-agnostic API; all I/O flows through port
//! traits injected at call sites, making the whole loop testable with mock
//! adapters and a synthetic clock.
//!
//! ```text
//!    ClockPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!   SensorPort ──▶ │          ControlLoop          │
//! ActuatorPort ◀── │ Schedule · PID · RelayWindow  │ ◀─▶ StoragePort
//!                  └──────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::ControllerConfig;
use crate::control::PumpState;
use crate::control::pid::PidController;
use crate::control::relay_window::RelayWindow;
use crate::control::schedule::{DayWindow, select_setpoint};
use crate::settings::{self, ControlSettings};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, ClockPort, EventSink, SensorPort, StoragePort};
use super::status::StatusView;

/// One sensor reading and the process value derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub raw: u16,
    pub process_value: f32,
    pub taken_at_ms: u64,
}

impl SensorSample {
    /// Invert the raw reading: `process_value = sensor_max - raw`, floored at 0.
    pub fn new(raw: u16, sensor_max: u16, taken_at_ms: u64) -> Self {
        Self {
            raw,
            process_value: f32::from(sensor_max.saturating_sub(raw)),
            taken_at_ms,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    config: ControllerConfig,
    settings: ControlSettings,
    day: DayWindow,
    pid: PidController,
    relay: RelayWindow,
    sample: Option<SensorSample>,
    setpoint: f32,
    output: f32,
    hour: Option<u8>,
    /// Last state written to the actuator port.
    applied: Option<PumpState>,
    last_tick_ms: Option<u64>,
    last_telemetry_ms: Option<u64>,
    tick_count: u64,
}

impl ControlLoop {
    pub fn new(config: ControllerConfig, settings: ControlSettings) -> Self {
        let mut pid = PidController::new(
            config.kp,
            config.ki,
            config.kd,
            config.pid_sample_time_ms as f32 / 1000.0,
        );
        pid.set_limits(0.0, config.window_size_ms as f32);
        let relay = RelayWindow::new(
            config.window_size_ms,
            config.min_pulse_ms,
            config.overrun_policy,
        );

        Self {
            day: DayWindow::from_config(&config),
            config,
            settings,
            pid,
            relay,
            sample: None,
            setpoint: f32::from(settings.low_threshold),
            output: 0.0,
            hour: None,
            applied: None,
            last_tick_ms: None,
            last_telemetry_ms: None,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.settings));
        info!(
            "ControlLoop: started (window={}ms, min pulse={}ms, sample every {}ms)",
            self.config.window_size_ms, self.config.min_pulse_ms, self.config.sample_interval_ms
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: clock → setpoint → sample → PID → relay → pump.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> PumpState {
        self.tick_count += 1;
        let now = clock.now_ms();
        if self.last_tick_ms.is_none() {
            self.relay.start(now);
        }

        // 1. Setpoint from the day/night schedule
        self.hour = clock.hour_of_day(self.settings.timezone_offset_hours);
        self.setpoint = select_setpoint(self.hour, &self.settings, self.day);

        // 2. Sample the sensor on its own cadence
        let due = self.sample.is_none_or(|s| {
            now.saturating_sub(s.taken_at_ms) >= u64::from(self.config.sample_interval_ms)
        });
        if due {
            let raw = hw.read_raw();
            self.sample = Some(SensorSample::new(raw, self.config.sensor_max, now));
        }
        let input = self.sample.map_or(0.0, |s| s.process_value);

        // 3. PID every tick, with real elapsed time
        let dt = self
            .last_tick_ms
            .map_or(0.0, |prev| now.saturating_sub(prev) as f32 / 1000.0);
        self.last_tick_ms = Some(now);
        self.output = self.pid.compute(input, self.setpoint, dt);

        // 4. Relay window → pump, written every tick like a plain digital out
        let state = self.relay.tick(self.output, now);
        hw.set_pump(state);
        let prev = self.applied.replace(state);
        if prev.unwrap_or_default() != state {
            sink.emit(&AppEvent::PumpChanged(state));
        }

        // 5. Telemetry
        let telemetry_due = self.last_telemetry_ms.is_none_or(|t| {
            now.saturating_sub(t) >= u64::from(self.config.telemetry_interval_ms)
        });
        if telemetry_due {
            self.last_telemetry_ms = Some(now);
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        state
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the settings form, tests, etc.).
    ///
    /// New settings take effect in memory even when persisting them fails.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::UpdateSettings(new_settings) => {
                self.settings = new_settings;
                info!(
                    "ControlLoop: settings updated high={} low={} offset={}",
                    new_settings.high_threshold,
                    new_settings.low_threshold,
                    new_settings.timezone_offset_hours
                );
                match settings::save(storage, &new_settings) {
                    Ok(()) => sink.emit(&AppEvent::SettingsUpdated(new_settings)),
                    Err(e) => {
                        warn!("ControlLoop: {}, keeping settings in memory only", e);
                        sink.emit(&AppEvent::SettingsSaveFailed(e));
                    }
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            raw: self.sample.map_or(0, |s| s.raw),
            process_value: self.sample.map_or(0.0, |s| s.process_value),
            setpoint: self.setpoint,
            output: self.output,
            pump: self.pump(),
            hour: self.hour,
            overrun_windows: self.relay.overrun_windows(),
        }
    }

    /// Snapshot for the settings UI.
    pub fn status_view(&self, clock: &impl ClockPort) -> StatusView {
        StatusView {
            humidity: self.sample.map_or(0.0, |s| s.process_value),
            time: clock.formatted_time(self.settings.timezone_offset_hours),
            high_value: self.settings.high_threshold,
            low_value: self.settings.low_threshold,
            offset: self.settings.timezone_offset_hours,
            setpoint: self.setpoint,
            output: self.output,
            pump: self.pump(),
        }
    }

    pub fn settings(&self) -> ControlSettings {
        self.settings
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn sample(&self) -> Option<SensorSample> {
        self.sample
    }

    /// Last pump state written to the actuator.
    pub fn pump(&self) -> PumpState {
        self.applied.unwrap_or_default()
    }

    pub fn window_start_ms(&self) -> u64 {
        self.relay.window_start_ms()
    }

    pub fn overrun_windows(&self) -> u64 {
        self.relay.overrun_windows()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
