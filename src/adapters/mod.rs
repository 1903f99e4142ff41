//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | PortSensor         | LED-select GPIO inputs   |
//! |                | PortActuator       | Front-panel switch lines |
//! | `delay`        | DelayNs            | FreeRTOS / thread sleep  |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA         |
//! | `mdns`         | —                  | ESP-IDF mDNS responder   |
//! | `device_id`    | —                  | eFuse MAC                |
//! | `http_server`  | —                  | ESP-IDF HTTP server      |

pub mod delay;
pub mod device_id;
pub mod hardware;
#[cfg(target_os = "espidf")]
pub mod http_server;
pub mod log_sink;
pub mod mdns;
pub mod wifi;
