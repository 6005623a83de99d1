//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `hardware` | SensorPort         | ESP32 ADC                |
//! |            | ActuatorPort       | Relay GPIO               |
//! | `log_sink` | EventSink          | Serial log output        |
//! | `nvs`      | StoragePort        | NVS / in-memory store    |
//! | `time`     | ClockPort          | ESP32 timer + SNTP clock |
//! | `wifi`     |                    | ESP-IDF WiFi STA         |
//! | `web`      |                    | ESP-IDF HTTP server      |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod web;
pub mod wifi;
