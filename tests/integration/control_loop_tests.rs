//! Integration tests for the ControlLoop → PID → relay window → pump pipeline.
//!
//! A synthetic clock drives the loop in fixed steps, so every assertion is
//! about exact times.

use humidistat::app::commands::AppCommand;
use humidistat::app::events::AppEvent;
use humidistat::app::ports::{SettingsError, StorageError};
use humidistat::app::service::ControlLoop;
use humidistat::config::ControllerConfig;
use humidistat::control::PumpState;
use humidistat::settings::{self, ControlSettings};

use crate::mock_hw::{MemStorage, MockClock, MockHardware, RecordingSink};

fn settings(high: i16, low: i16, offset: i16) -> ControlSettings {
    ControlSettings {
        high_threshold: high,
        low_threshold: low,
        timezone_offset_hours: offset,
    }
}

/// Proportional-only loop, so the output is a fixed function of the error.
fn p_only() -> ControllerConfig {
    ControllerConfig {
        ki: 0.0,
        kd: 0.0,
        ..ControllerConfig::default()
    }
}

fn run(
    cl: &mut ControlLoop,
    clock: &MockClock,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    from_ms: u64,
    until_ms: u64,
    step_ms: u64,
) {
    let mut t = from_ms;
    while t < until_ms {
        clock.set_ms(t);
        cl.tick(clock, hw, sink);
        t += step_ms;
    }
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_announces_settings() {
    let s = settings(600, 300, 2);
    let mut cl = ControlLoop::new(ControllerConfig::default(), s);
    let mut sink = RecordingSink::new();
    cl.start(&mut sink);
    assert!(matches!(sink.events[0], AppEvent::Started(got) if got == s));
}

// ── Closed loop ───────────────────────────────────────────────

#[test]
fn dry_soil_at_midday_switches_pump_on() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(1024); // process value 0
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));

    // First tick is proportional only: 600 ms is below the minimum pulse
    clock.set_ms(0);
    assert_eq!(cl.tick(&clock, &mut hw, &mut sink), PumpState::Off);
    assert_eq!(cl.setpoint(), 600.0);
    assert_eq!(cl.output(), 600.0);

    // One PID sample later the integral has pushed it past the minimum pulse
    clock.set_ms(100);
    assert_eq!(cl.tick(&clock, &mut hw, &mut sink), PumpState::On);
    assert!(cl.output() > 1000.0);

    run(&mut cl, &clock, &mut hw, &mut sink, 200, 1000, 100);
    assert!(hw.pump_on());
    assert_eq!(cl.output(), 5000.0, "output saturates at the window size");
    assert_eq!(sink.pump_changes(), vec![PumpState::On]);
}

#[test]
fn wet_soil_at_night_never_runs_pump() {
    let clock = MockClock::at(23, 0);
    let mut hw = MockHardware::new(0); // process value 1024
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));

    run(&mut cl, &clock, &mut hw, &mut sink, 0, 20_000, 100);

    assert_eq!(cl.setpoint(), 300.0);
    assert_eq!(cl.output(), 0.0);
    assert!(!hw.ever_on());
    assert!(sink.pump_changes().is_empty(), "OFF -> OFF is not a change");
}

#[test]
fn duty_cycle_follows_output_within_one_window() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(1024);
    let mut sink = RecordingSink::new();
    // error 3000 -> output 3000 ms of a 5000 ms window
    let mut cl = ControlLoop::new(p_only(), settings(3000, 0, 0));

    run(&mut cl, &clock, &mut hw, &mut sink, 0, 5000, 10);

    let on = hw.pump_writes.iter().filter(|s| s.is_on()).count();
    assert_eq!(cl.output(), 3000.0);
    assert_eq!(on, 300);
    assert_eq!(hw.pump_writes.len(), 500);
    assert_eq!(sink.pump_changes(), vec![PumpState::On, PumpState::Off]);
}

#[test]
fn output_at_minimum_pulse_is_suppressed() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(1024);
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(p_only(), settings(1000, 0, 0));

    run(&mut cl, &clock, &mut hw, &mut sink, 0, 15_000, 50);

    assert_eq!(cl.output(), 1000.0);
    assert!(!hw.ever_on());
}

#[test]
fn pump_is_written_every_tick() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(1024);
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(p_only(), settings(3000, 0, 0));

    run(&mut cl, &clock, &mut hw, &mut sink, 0, 2000, 20);

    assert_eq!(hw.pump_writes.len() as u64, cl.tick_count());
    assert_eq!(cl.tick_count(), 100);
}

// ── Schedule ──────────────────────────────────────────────────

#[test]
fn unsynced_clock_targets_low_threshold() {
    let clock = MockClock::unsynced();
    let mut hw = MockHardware::new(512);
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));

    cl.tick(&clock, &mut hw, &mut sink);
    assert_eq!(cl.setpoint(), 300.0);
    assert_eq!(cl.build_telemetry().hour, None);
    assert_eq!(cl.status_view(&clock).time.as_str(), "--:--:--");
}

#[test]
fn timezone_offset_moves_the_day_window() {
    // 07:30 UTC
    let clock = MockClock::at(7, 30);
    let mut hw = MockHardware::new(512);
    let mut sink = RecordingSink::new();

    let mut utc = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));
    utc.tick(&clock, &mut hw, &mut sink);
    assert_eq!(utc.setpoint(), 300.0);

    let mut east = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 3));
    east.tick(&clock, &mut hw, &mut sink);
    assert_eq!(east.build_telemetry().hour, Some(10));
    assert_eq!(east.setpoint(), 600.0);

    // 07:30 - 10h = 21:30 the previous day, a night boundary hour
    let mut west = ControlLoop::new(ControllerConfig::default(), settings(600, 300, -10));
    west.tick(&clock, &mut hw, &mut sink);
    assert_eq!(west.build_telemetry().hour, Some(21));
    assert_eq!(west.setpoint(), 300.0);
}

#[test]
fn setpoint_changes_when_day_begins() {
    let clock = MockClock::at(9, 59);
    let mut hw = MockHardware::new(512);
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));

    cl.tick(&clock, &mut hw, &mut sink);
    assert_eq!(cl.setpoint(), 300.0);

    clock.set_ms(60_000);
    cl.tick(&clock, &mut hw, &mut sink);
    assert_eq!(cl.setpoint(), 600.0);
}

/// Pump edges `(time, new state)` over `[from_ms, until_ms)` in 10 ms ticks.
fn pump_edges(
    cl: &mut ControlLoop,
    clock: &MockClock,
    hw: &mut MockHardware,
    from_ms: u64,
    until_ms: u64,
) -> Vec<(u64, PumpState)> {
    let mut sink = RecordingSink::new();
    let mut edges = Vec::new();
    let mut last = PumpState::Off;
    let mut t = from_ms;
    while t < until_ms {
        clock.set_ms(t);
        let state = cl.tick(clock, hw, &mut sink);
        if state != last {
            edges.push((t, state));
            last = state;
        }
        t += 10;
    }
    edges
}

fn assert_no_short_pulses(edges: &[(u64, PumpState)], min_pulse_ms: u64) {
    for pair in edges.windows(2) {
        let held = pair[1].0 - pair[0].0;
        assert!(
            held >= min_pulse_ms,
            "{:?} held only {held} ms: {edges:?}",
            pair[0].1
        );
    }
}

// Windows start at 57_510 so no window boundary falls inside the run.

#[test]
fn day_setpoint_step_does_not_chatter_the_pump() {
    let config = ControllerConfig::default();
    let min_pulse = u64::from(config.min_pulse_ms);
    let clock = MockClock::at(9, 59);
    let mut hw = MockHardware::new(724); // process value 300, on the night setpoint
    let mut cl = ControlLoop::new(config, settings(600, 300, 0));

    let edges = pump_edges(&mut cl, &clock, &mut hw, 57_510, 62_500);
    assert_eq!(cl.setpoint(), 600.0);
    assert_no_short_pulses(&edges, min_pulse);
    // The step ramps the output up: one switch-on, held to the end
    assert_eq!(edges.len(), 1, "{edges:?}");
    assert_eq!(edges[0].1, PumpState::On);
    assert!(edges[0].0 > 60_000);
}

#[test]
fn night_setpoint_step_keeps_saturated_pump_on() {
    let config = ControllerConfig::default();
    let min_pulse = u64::from(config.min_pulse_ms);
    let clock = MockClock::at(20, 59);
    let mut hw = MockHardware::new(1024); // process value 0
    let mut cl = ControlLoop::new(config, settings(600, 300, 0));

    let edges = pump_edges(&mut cl, &clock, &mut hw, 57_510, 62_500);
    assert_eq!(cl.setpoint(), 300.0);
    assert_eq!(cl.output(), 5000.0);
    assert_no_short_pulses(&edges, min_pulse);
    assert_eq!(edges.len(), 1, "{edges:?}");
    assert_eq!(edges[0].1, PumpState::On);
    assert!(edges[0].0 < 60_000);
}

// ── Sampling & telemetry ──────────────────────────────────────

#[test]
fn sensor_is_sampled_on_its_own_interval() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(824);
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));

    run(&mut cl, &clock, &mut hw, &mut sink, 0, 600, 100);
    assert_eq!(hw.reads, 1);
    assert_eq!(cl.sample().map(|s| s.process_value), Some(200.0));

    // A new reading is not seen until the next sample is due
    hw.raw = 424;
    clock.set_ms(900);
    cl.tick(&clock, &mut hw, &mut sink);
    assert_eq!(cl.sample().map(|s| s.raw), Some(824));

    clock.set_ms(1000);
    cl.tick(&clock, &mut hw, &mut sink);
    assert_eq!(hw.reads, 2);
    assert_eq!(cl.sample().map(|s| s.process_value), Some(600.0));
}

#[test]
fn telemetry_is_emitted_first_tick_then_per_interval() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(512);
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));

    for t in [0, 30_000, 59_999] {
        clock.set_ms(t);
        cl.tick(&clock, &mut hw, &mut sink);
    }
    assert_eq!(sink.telemetry_count(), 1);

    clock.set_ms(60_000);
    cl.tick(&clock, &mut hw, &mut sink);
    assert_eq!(sink.telemetry_count(), 2);

    let Some(AppEvent::Telemetry(t)) = sink
        .events
        .iter()
        .rev()
        .find(|e| matches!(e, AppEvent::Telemetry(_)))
    else {
        panic!("no telemetry recorded");
    };
    assert_eq!(t.raw, 512);
    assert_eq!(t.process_value, 512.0);
    assert_eq!(t.setpoint, 600.0);
    assert_eq!(t.hour, Some(12));
}

#[test]
fn stalled_loop_reports_window_backlog() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(1024);
    let mut sink = RecordingSink::new();
    let mut cl = ControlLoop::new(p_only(), settings(3000, 0, 0));

    clock.set_ms(0);
    cl.tick(&clock, &mut hw, &mut sink);
    clock.set_ms(17_500);
    cl.tick(&clock, &mut hw, &mut sink);

    assert_eq!(cl.window_start_ms(), 5000);
    assert_eq!(cl.overrun_windows(), 2);
    assert_eq!(cl.build_telemetry().overrun_windows, 2);
}

// ── Settings updates ──────────────────────────────────────────

#[test]
fn settings_update_is_applied_and_persisted() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(512);
    let mut sink = RecordingSink::new();
    let mut storage = MemStorage::new();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));

    cl.tick(&clock, &mut hw, &mut sink);
    assert_eq!(cl.setpoint(), 600.0);

    let new = settings(800, 100, -1);
    cl.handle_command(AppCommand::UpdateSettings(new), &mut storage, &mut sink);
    assert!(matches!(sink.events.last(), Some(AppEvent::SettingsUpdated(s)) if *s == new));
    assert_eq!(cl.settings(), new);
    assert_eq!(settings::load(&storage), new);
    assert_eq!(storage.writes, 1);

    clock.set_ms(100);
    cl.tick(&clock, &mut hw, &mut sink);
    // 12:00 UTC - 1h is still daytime
    assert_eq!(cl.setpoint(), 800.0);
    let view = cl.status_view(&clock);
    assert_eq!((view.high_value, view.low_value, view.offset), (800, 100, -1));
}

#[test]
fn failed_save_keeps_new_settings_in_memory() {
    let clock = MockClock::at(12, 0);
    let mut hw = MockHardware::new(512);
    let mut sink = RecordingSink::new();
    let mut storage = MemStorage::failing();
    let mut cl = ControlLoop::new(ControllerConfig::default(), settings(600, 300, 0));

    let new = settings(900, 150, 0);
    cl.handle_command(AppCommand::UpdateSettings(new), &mut storage, &mut sink);

    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::SettingsSaveFailed(SettingsError::StorageWrite(
            StorageError::IoError
        )))
    ));
    assert_eq!(cl.settings(), new);

    cl.tick(&clock, &mut hw, &mut sink);
    assert_eq!(cl.setpoint(), 900.0);
}
