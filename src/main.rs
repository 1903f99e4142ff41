//! KVM Switch Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     BlockingDelay   LogEventSink              │
//! │  (Sensor+Actuator)   (DelayNs)       (EventSink)               │
//! │  WifiAdapter   MdnsAdapter   HttpServer → RequestHandler       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   KvmService (lock) → SwitchController                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use kvmswitch::adapters::delay::BlockingDelay;
use kvmswitch::adapters::device_id::DeviceIdentity;
use kvmswitch::adapters::hardware::HardwareAdapter;
use kvmswitch::adapters::http_server::HttpServer;
use kvmswitch::adapters::log_sink::LogEventSink;
use kvmswitch::adapters::mdns::MdnsAdapter;
use kvmswitch::adapters::wifi::{ConnectivityPort, WifiAdapter};
use kvmswitch::api::{DeviceInfo, RequestHandler, ota};
use kvmswitch::app::controller::SwitchController;
use kvmswitch::app::service::KvmService;
use kvmswitch::config::SystemConfig;
use kvmswitch::drivers::hw_init;
use kvmswitch::error::Error;
use kvmswitch::kvm::SwitchTiming;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("KVM switch v{}", env!("CARGO_PKG_VERSION"));
    ota::check_rollback();

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::load().map_err(Error::from)?;
    info!(
        "Config: hold={}ms settle={}ms http_port={}",
        config.hold_ms, config.settle_ms, config.http_port
    );

    // ── 3. GPIO: LED inputs + floating switch lines ───────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}", e);
        return Err(Error::Init("gpio configuration failed").into());
    }

    // ── 4. Application core ───────────────────────────────────
    let controller = SwitchController::new(
        HardwareAdapter::on_board_pins(),
        BlockingDelay::new(),
        SwitchTiming::from_config(&config),
    );
    let service = Arc::new(KvmService::new(controller, LogEventSink::new()));
    service.start();

    // ── 5. Identity ───────────────────────────────────────────
    let identity = DeviceIdentity::of_this_device(&config.hostname_prefix).map_err(|e| {
        error!("Identity: {}", e);
        Error::Init("device identity")
    })?;
    info!("Device: {} ({}.local)", identity.id, identity.hostname);

    // ── 6. Network ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;

    let mut wifi = WifiAdapter::new();
    wifi.attach(driver);
    let mut mdns = MdnsAdapter::new(&identity, config.http_port);

    if config.wifi_ssid.is_empty() {
        warn!("WiFi: no SSID configured, request interface unreachable");
    } else {
        wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)?;
        if let Err(e) = wifi.connect() {
            warn!("WiFi: initial connect failed ({}), will retry", e);
        }
    }

    // ── 7. Request interface ──────────────────────────────────
    let handler = Arc::new(RequestHandler::new(
        Arc::clone(&service),
        DeviceInfo {
            hostname: identity.hostname.as_str().to_owned(),
            device_id: identity.id.as_str().to_owned(),
            version: env!("CARGO_PKG_VERSION"),
        },
        config.ota_enabled,
    ));
    let _server = HttpServer::start(config.http_port, handler).map_err(Error::from)?;

    // ── 8. Supervision loop ───────────────────────────────────
    loop {
        wifi.poll();
        if config.mdns_enabled {
            match (wifi.is_connected(), mdns.is_active()) {
                (true, false) => mdns.start(),
                (false, true) => mdns.stop(),
                _ => {}
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
