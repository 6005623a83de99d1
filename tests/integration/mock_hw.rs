//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full history without
//! touching real ADC/GPIO registers.

use std::cell::Cell;
use std::collections::HashMap;

use humidistat::app::events::AppEvent;
use humidistat::app::ports::{
    ActuatorPort, ClockPort, EventSink, SensorPort, StorageError, StoragePort,
};
use humidistat::control::PumpState;

// ── MockClock ─────────────────────────────────────────────────

/// 2024-01-01 00:00:00 UTC
pub const MIDNIGHT_UTC: i64 = 1_704_067_200;

pub struct MockClock {
    now_ms: Cell<u64>,
    epoch_at_zero: Cell<Option<i64>>,
}

#[allow(dead_code)]
impl MockClock {
    /// Wall clock unset.
    pub fn unsynced() -> Self {
        Self {
            now_ms: Cell::new(0),
            epoch_at_zero: Cell::new(None),
        }
    }

    /// Wall clock reads `hh:mm` UTC at `now_ms == 0`.
    pub fn at(hh: i64, mm: i64) -> Self {
        Self {
            now_ms: Cell::new(0),
            epoch_at_zero: Cell::new(Some(MIDNIGHT_UTC + hh * 3600 + mm * 60)),
        }
    }

    pub fn set_ms(&self, ms: u64) {
        self.now_ms.set(ms);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set_unsynced(&self) {
        self.epoch_at_zero.set(None);
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn epoch_secs(&self) -> Option<i64> {
        self.epoch_at_zero
            .get()
            .map(|e| e + (self.now_ms.get() / 1000) as i64)
    }
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub raw: u16,
    pub reads: u32,
    pub pump_writes: Vec<PumpState>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(raw: u16) -> Self {
        Self {
            raw,
            reads: 0,
            pump_writes: Vec::new(),
        }
    }

    pub fn pump_on(&self) -> bool {
        self.pump_writes.last().is_some_and(|s| s.is_on())
    }

    pub fn ever_on(&self) -> bool {
        self.pump_writes.iter().any(|s| s.is_on())
    }
}

impl SensorPort for MockHardware {
    fn read_raw(&mut self) -> u16 {
        self.reads += 1;
        self.raw
    }
}

impl ActuatorPort for MockHardware {
    fn set_pump(&mut self, state: PumpState) {
        self.pump_writes.push(state);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn telemetry_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Telemetry(_)))
            .count()
    }

    pub fn pump_changes(&self) -> Vec<PumpState> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::PumpChanged(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MemStorage ────────────────────────────────────────────────

#[derive(Default)]
pub struct MemStorage {
    store: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
    pub writes: u32,
}

#[allow(dead_code)]
impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&[u8]> {
        self.store
            .get(&format!("{namespace}::{key}"))
            .map(Vec::as_slice)
    }
}

impl StoragePort for MemStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&format!("{namespace}::{key}")) {
            Some(v) if v.len() > buf.len() => Err(StorageError::IoError),
            Some(v) => {
                buf[..v.len()].copy_from_slice(v);
                Ok(v.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.writes += 1;
        self.store.insert(format!("{namespace}::{key}"), data.to_vec());
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{namespace}::{key}"))
    }
}
