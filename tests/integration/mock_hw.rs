//! Mock hardware for integration tests.
//!
//! Every press, release, delay and sensor read lands in one shared
//! journal, so tests can assert on the exact order of hardware activity
//! across the controller, the service and the request handler.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use kvmswitch::app::controller::SwitchController;
use kvmswitch::app::events::AppEvent;
use kvmswitch::app::ports::{EventSink, PortActuator, PortSensor};
use kvmswitch::app::service::KvmService;
use kvmswitch::kvm::{LedCode, Port, SwitchTiming};

// ── Journal ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Press(Port),
    Release(Port),
    Delay(u32),
    Read(Port),
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Step>>>);

#[allow(dead_code)]
impl Journal {
    pub fn push(&self, step: Step) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(step);
    }

    pub fn steps(&self) -> Vec<Step> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn presses(&self) -> Vec<Port> {
        self.steps()
            .into_iter()
            .filter_map(|s| match s {
                Step::Press(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn actuations(&self) -> usize {
        self.steps()
            .iter()
            .filter(|s| matches!(s, Step::Press(_) | Step::Release(_)))
            .count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

// ── MockKvm ───────────────────────────────────────────────────

/// How the simulated KVM reacts to a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// The LED lines move to the pressed port.
    Follow,
    /// The LED lines never change.
    Ignore,
    /// The LED lines always move to this port instead.
    Divert(Port),
}

/// KVM modelled at the LED-line level: two bits, decoded on every read.
pub struct MockKvm {
    journal: Journal,
    bit1: bool,
    bit0: bool,
    reaction: Reaction,
}

#[allow(dead_code)]
impl MockKvm {
    pub fn new(journal: Journal, active: Port) -> Self {
        let code = LedCode::for_port(active);
        Self {
            journal,
            bit1: code.bit1(),
            bit0: code.bit0(),
            reaction: Reaction::Follow,
        }
    }

    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reaction = reaction;
        self
    }

    /// Set the raw LED lines, as a physical button press would.
    pub fn set_lines(&mut self, bit1: bool, bit0: bool) {
        self.bit1 = bit1;
        self.bit0 = bit0;
    }

    pub fn lines(&self) -> (bool, bool) {
        (self.bit1, self.bit0)
    }

    fn show(&mut self, port: Port) {
        let code = LedCode::for_port(port);
        self.set_lines(code.bit1(), code.bit0());
    }
}

impl PortSensor for MockKvm {
    fn read_active_port(&mut self) -> Port {
        let port = LedCode::from_bits(self.bit1, self.bit0).port();
        self.journal.push(Step::Read(port));
        port
    }
}

impl PortActuator for MockKvm {
    fn press(&mut self, port: Port) {
        self.journal.push(Step::Press(port));
        match self.reaction {
            Reaction::Follow => self.show(port),
            Reaction::Ignore => {}
            Reaction::Divert(other) => self.show(other),
        }
    }

    fn release(&mut self, port: Port) {
        self.journal.push(Step::Release(port));
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Records each wait; optionally really sleeps so threads can interleave.
pub struct MockDelay {
    journal: Journal,
    real_sleep: bool,
}

#[allow(dead_code)]
impl MockDelay {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            real_sleep: false,
        }
    }

    pub fn sleeping(journal: Journal) -> Self {
        Self {
            journal,
            real_sleep: true,
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal.push(Step::Delay(ms));
        if self.real_sleep {
            std::thread::sleep(Duration::from_millis(u64::from(ms / 10).max(1)));
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<AppEvent>>>);

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

// ── Builders ──────────────────────────────────────────────────

pub type MockController = SwitchController<MockKvm, MockDelay>;
pub type MockService = KvmService<MockKvm, MockDelay, RecordingSink>;

#[allow(dead_code)]
pub fn controller(journal: &Journal, kvm: MockKvm) -> MockController {
    SwitchController::new(kvm, MockDelay::new(journal.clone()), SwitchTiming::default())
}

#[allow(dead_code)]
pub fn service(journal: &Journal, kvm: MockKvm, sink: &RecordingSink) -> MockService {
    KvmService::new(controller(journal, kvm), sink.clone())
}
