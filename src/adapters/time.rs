//! ESP32 time adapter.
//!
//! Implements [`ClockPort`] for the humidistat.
//!
//! - **`target_os = "espidf"`**: monotonic time from `esp_timer_get_time()`
//!   (microsecond precision), wall clock from `gettimeofday()` once SNTP has
//!   set it.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` for monotonic
//!   time; the wall clock is unset unless injected with [`sim_set_epoch`].

use crate::app::ports::ClockPort;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI64, Ordering};

/// Wall-clock times before 2020-01-01 mean SNTP has not synced yet.
const EPOCH_2020: i64 = 1_577_836_800;

#[cfg(not(target_os = "espidf"))]
static SIM_EPOCH_SECS: AtomicI64 = AtomicI64::new(0);

/// Inject the wall clock seen by host builds (0 = not synchronised).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_epoch(secs: i64) {
    SIM_EPOCH_SECS.store(secs, Ordering::Relaxed);
}

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    #[cfg(target_os = "espidf")]
    fn wall_clock_secs(&self) -> i64 {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return 0;
        }
        tv.tv_sec as i64
    }

    #[cfg(not(target_os = "espidf"))]
    fn wall_clock_secs(&self) -> i64 {
        SIM_EPOCH_SECS.load(Ordering::Relaxed)
    }
}

impl ClockPort for Esp32TimeAdapter {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1000
    }

    fn epoch_secs(&self) -> Option<i64> {
        let secs = self.wall_clock_secs();
        (secs >= EPOCH_2020).then_some(secs)
    }
}
