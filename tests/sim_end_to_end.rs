//! Whole stack on the GPIO simulation: request → service → controller →
//! HardwareAdapter → switch bank / LED sensor → simulated KVM.
//!
//! Kept in its own test binary because the simulation is process-global.

#![cfg(not(target_os = "espidf"))]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kvmswitch::adapters::delay::BlockingDelay;
use kvmswitch::adapters::hardware::HardwareAdapter;
use kvmswitch::adapters::log_sink::LogEventSink;
use kvmswitch::api::{ApiRequest, DeviceInfo, Method, RequestHandler};
use kvmswitch::app::controller::SwitchController;
use kvmswitch::app::service::KvmService;
use kvmswitch::drivers::hw_init::{self, sim};
use kvmswitch::kvm::{Port, SwitchTiming};
use kvmswitch::pins;

type SimHandler = RequestHandler<HardwareAdapter, BlockingDelay, LogEventSink>;

static SIM: Mutex<()> = Mutex::new(());

fn sim_guard() -> MutexGuard<'static, ()> {
    let guard = SIM.lock().unwrap_or_else(PoisonError::into_inner);
    sim::reset();
    guard
}

fn stack() -> SimHandler {
    hw_init::init_peripherals().unwrap();
    let controller = SwitchController::new(
        HardwareAdapter::on_board_pins(),
        BlockingDelay::new(),
        SwitchTiming::default(),
    );
    let service = Arc::new(KvmService::new(controller, LogEventSink::new()));
    service.start();
    RequestHandler::new(
        service,
        DeviceInfo {
            hostname: "kvm-efcafe".into(),
            device_id: "KV-EFCAFE".into(),
            version: env!("CARGO_PKG_VERSION"),
        },
        false,
    )
}

fn call(h: &SimHandler, method: Method, uri: &str) -> (u16, String) {
    let resp = h.handle(&ApiRequest::parse(method, uri, ""));
    (resp.status, resp.body)
}

#[test]
fn boot_reads_port_one_and_switches_to_three() {
    let _sim = sim_guard();
    let h = stack();

    // Both LED lines low.
    assert_eq!(call(&h, Method::Get, "/api/port"), (200, "1".into()));

    assert_eq!(call(&h, Method::Post, "/api/port/3"), (200, "3".into()));
    assert!(!sim::input(pins::LED_BIT1_GPIO));
    assert!(sim::input(pins::LED_BIT0_GPIO));
    assert_eq!(sim::driven_low_mask(), 0, "line left driven after switch");
}

#[test]
fn kvm_ignoring_press_is_reported_truthfully() {
    let _sim = sim_guard();
    let h = stack();
    sim::set_active_port(Port::Two);
    sim::set_kvm_follows_presses(false);

    assert_eq!(call(&h, Method::Post, "/api/port/4"), (200, "2".into()));
    assert_eq!(sim::driven_low_mask(), 0);
}

#[test]
fn invalid_request_leaves_lines_floating() {
    let _sim = sim_guard();
    let h = stack();

    assert_eq!(call(&h, Method::Post, "/api/port/7"), (400, "invalid port".into()));
    assert_eq!(sim::driven_low_mask(), 0);
    assert_eq!(call(&h, Method::Get, "/api/port"), (200, "1".into()));
}
