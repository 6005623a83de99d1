//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let hour = t.hour.map_or_else(|| "--".into(), |h| format!("{h:02}"));
                info!(
                    "TELEM | raw={} pv={:.0} sp={:.0} | out={:.0}ms pump={} | hour={} | \
                     overruns={}",
                    t.raw, t.process_value, t.setpoint, t.output, t.pump, hour, t.overrun_windows,
                );
            }
            AppEvent::PumpChanged(state) => {
                info!("PUMP  | {}", state);
            }
            AppEvent::Started(s) => {
                info!(
                    "START | high={} low={} offset={}h",
                    s.high_threshold, s.low_threshold, s.timezone_offset_hours
                );
            }
            AppEvent::SettingsUpdated(s) => {
                info!(
                    "CONF  | high={} low={} offset={}h (saved)",
                    s.high_threshold, s.low_threshold, s.timezone_offset_hours
                );
            }
            AppEvent::SettingsSaveFailed(e) => {
                warn!("CONF  | save failed: {}", e);
            }
        }
    }
}
