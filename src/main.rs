//! Humidistat Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (Sensor+Actuator) (EventSink)    (Storage)    (Clock)         │
//! │  WifiAdapter       Web server ──── mpsc ────┐                  │
//! │                                             ▼                  │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Schedule · PID · RelayWindow                          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::http::server::EspHttpServer;
use esp_idf_svc::sntp::EspSntp;
use log::{error, info, warn};

use humidistat::adapters::hardware::HardwareAdapter;
use humidistat::adapters::log_sink::LogEventSink;
use humidistat::adapters::nvs::NvsAdapter;
use humidistat::adapters::time::Esp32TimeAdapter;
use humidistat::adapters::web;
use humidistat::adapters::wifi::{WifiAdapter, WifiCredentials};
use humidistat::app::commands::AppCommand;
use humidistat::app::ports::ClockPort;
use humidistat::app::service::ControlLoop;
use humidistat::app::status::StatusView;
use humidistat::config::ControllerConfig;
use humidistat::drivers::pump::{PumpDriver, RelayPin};
use humidistat::drivers::watchdog::Watchdog;
use humidistat::error::Error;
use humidistat::sensors::humidity::HumiditySensor;
use humidistat::{drivers, pins, settings};

const LOOP_DELAY_MS: u32 = 10;
const WIFI_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Services that must stay alive for the program lifetime.
struct Network {
    _sntp: EspSntp<'static>,
    _server: EspHttpServer<'static>,
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Humidistat v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals().map_err(Error::from) {
        error!("{}, halting", e);
        loop {
            FreeRtos::delay_ms(1000);
        }
    }
    let config = ControllerConfig::default();
    let mut hw = HardwareAdapter::new(
        HumiditySensor::new(config.sensor_max),
        PumpDriver::new(RelayPin::new(pins::PUMP_RELAY_GPIO)),
    );

    // ── 3. Persisted settings ─────────────────────────────────
    let mut nvs = NvsAdapter::new().map_err(Error::from)?;
    let initial = settings::load(&nvs);

    // ── 4. Network side: WiFi, SNTP, HTTP ─────────────────────
    let status = Arc::new(Mutex::new(StatusView::default()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<AppCommand>();
    let _network = match start_network(status.clone(), cmd_tx) {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("Network unavailable ({:#}), running offline on the low setpoint", e);
            None
        }
    };

    // ── 5. Control loop ───────────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let watchdog_timeout_ms = config.watchdog_timeout_ms;
    let mut control = ControlLoop::new(config, initial);
    control.start(&mut sink);

    // Subscribed only now: the blocking WiFi connect above may exceed the timeout.
    let watchdog = Watchdog::new(watchdog_timeout_ms);

    info!("System ready. Entering control loop.");
    run(&mut control, &clock, &mut hw, &mut nvs, &mut sink, &cmd_rx, &status, &watchdog)
}

#[allow(clippy::too_many_arguments)]
fn run(
    control: &mut ControlLoop,
    clock: &Esp32TimeAdapter,
    hw: &mut HardwareAdapter<RelayPin>,
    nvs: &mut NvsAdapter,
    sink: &mut LogEventSink,
    commands: &Receiver<AppCommand>,
    status: &Mutex<StatusView>,
    watchdog: &Watchdog,
) -> ! {
    loop {
        while let Ok(cmd) = commands.try_recv() {
            control.handle_command(cmd, nvs, sink);
        }

        control.tick(clock, hw, sink);

        if let Ok(mut view) = status.lock() {
            *view = control.status_view(clock);
        }

        watchdog.feed();
        FreeRtos::delay_ms(LOOP_DELAY_MS);
    }
}

fn start_network(
    status: Arc<Mutex<StatusView>>,
    commands: mpsc::Sender<AppCommand>,
) -> Result<Network> {
    let creds = WifiCredentials::from_build_env()?;
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    let mut wifi = WifiAdapter::new(creds, peripherals.modem, sysloop)?;
    if let Err(e) = wifi.connect() {
        warn!("WiFi: initial connect failed ({}), retrying in background", e);
    }
    std::thread::Builder::new()
        .name("wifi".into())
        .stack_size(4096)
        .spawn(move || {
            let clock = Esp32TimeAdapter::new();
            loop {
                wifi.poll(clock.now_ms());
                std::thread::sleep(WIFI_POLL_INTERVAL);
            }
        })?;

    let sntp = EspSntp::new_default()?;
    info!("SNTP: started");

    let server = web::start_web(status, commands)?;
    Ok(Network {
        _sntp: sntp,
        _server: server,
    })
}
