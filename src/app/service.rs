//! Application service — the hexagonal core.
//!
//! [`KvmService`] owns the [`SwitchController`] and the event sink behind a
//! single lock.  It is the one object request handlers share, so it is
//! where concurrent requests are serialised.
//!
//! ```text
//!  HTTP task A ─┐
//!               ├──▶ ┌──────────── lock ────────────┐ ──▶ EventSink
//!  HTTP task B ─┘    │ validate · press · hold ·    │
//!                    │ release · settle · re-read   │
//!                    └──────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! The lock is held for the entire switch sequence (~150 ms), so a second
//! request waits until the first has released its line and re-read the
//! LEDs.  Port queries take the same lock and therefore never observe a
//! half-finished switch.  There is no timeout: a sequence that has
//! started always completes, otherwise a line could stay driven.

use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::error::InvalidPort;
use crate::kvm::{Port, SwitchTiming};

use super::commands::KvmCommand;
use super::controller::SwitchController;
use super::events::AppEvent;
use super::ports::{EventSink, PortActuator, PortSensor};

struct Inner<H, D, E> {
    controller: SwitchController<H, D>,
    sink: E,
    switch_count: u64,
}

/// Thread-safe front door to the switch controller.
pub struct KvmService<H, D, E> {
    inner: Mutex<Inner<H, D, E>>,
    timing: SwitchTiming,
}

impl<H, D, E> KvmService<H, D, E>
where
    H: PortSensor + PortActuator,
    D: DelayNs,
    E: EventSink,
{
    pub fn new(controller: SwitchController<H, D>, sink: E) -> Self {
        let timing = controller.timing();
        Self {
            inner: Mutex::new(Inner {
                controller,
                sink,
                switch_count: 0,
            }),
            timing,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Read the boot-time port and announce the service.
    pub fn start(&self) -> Port {
        let mut inner = self.lock();
        let port = inner.controller.active_port();
        inner.sink.emit(&AppEvent::Started(port));
        info!("KvmService started, KVM on port {}", port);
        port
    }

    // ── Queries ───────────────────────────────────────────────

    /// Active port, read from the LED lines under the lock.
    pub fn current_port(&self) -> Port {
        self.lock().controller.active_port()
    }

    /// Completed switch sequences since startup.
    pub fn switch_count(&self) -> u64 {
        self.lock().switch_count
    }

    pub fn timing(&self) -> SwitchTiming {
        self.timing
    }

    // ── Commands ──────────────────────────────────────────────

    /// Switch to `requested`, holding the lock for the whole sequence.
    pub fn switch_to(&self, requested: i64) -> Result<Port, InvalidPort> {
        self.switch_validated(Port::try_from(requested))
    }

    /// [`switch_to`](Self::switch_to) for request text.
    pub fn switch_to_arg(&self, arg: &str) -> Result<Port, InvalidPort> {
        self.switch_validated(arg.parse::<Port>())
    }

    /// Process an external command (from the HTTP handler, console, etc.).
    pub fn handle_command(&self, cmd: KvmCommand<'_>) -> Result<Port, InvalidPort> {
        match cmd {
            KvmCommand::GetPort => Ok(self.current_port()),
            KvmCommand::SwitchTo(requested) => self.switch_to(requested),
            KvmCommand::SwitchToArg(arg) => self.switch_to_arg(arg),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn switch_validated(&self, port: Result<Port, InvalidPort>) -> Result<Port, InvalidPort> {
        let mut inner = self.lock();
        match port {
            Ok(requested) => {
                let reported = inner.controller.switch_to_port(requested);
                inner.switch_count += 1;
                inner.sink.emit(&AppEvent::Switched {
                    requested,
                    reported,
                });
                Ok(reported)
            }
            Err(e) => {
                warn!("switch rejected: {}", e);
                inner.sink.emit(&AppEvent::SwitchRejected);
                Err(e)
            }
        }
    }

    /// The guarded state is hardware, which a panicking holder cannot leave
    /// inconsistent in memory, so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, Inner<H, D, E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
