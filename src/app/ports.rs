//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SwitchController / KvmService (domain)
//! ```
//!
//! Driven adapters (LED sensor, switch lines, event sinks) implement these
//! traits.  The [`SwitchController`](super::controller::SwitchController)
//! consumes them via generics, so the domain core never touches hardware
//! directly and tests can substitute recording mocks.
//!
//! Note the naming clash with the KVM's own "ports": traits here are
//! named after what they do (`PortSensor`, `PortActuator`).

use embedded_hal::delay::DelayNs;

use crate::kvm::{Port, SwitchPulse};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to learn the active KVM port.
pub trait PortSensor {
    /// Read the LED-select lines and decode them.  Infallible, never cached.
    fn read_active_port(&mut self) -> Port;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to press front-panel switches.
pub trait PortActuator {
    /// Drive the switch line of `port` low.
    fn press(&mut self, port: Port);

    /// Return the switch line of `port` to a floating input.
    fn release(&mut self, port: Port);

    /// One full momentary press: drive, hold for `pulse.hold`, release.
    ///
    /// `pulse.port` is already validated.  Blocks for the hold duration and
    /// always releases, so the line cannot stay driven after return.
    fn activate(&mut self, pulse: &SwitchPulse, delay: &mut impl DelayNs) {
        self.press(pulse.port);
        delay.delay_ms(pulse.hold_ms());
        self.release(pulse.port);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading [`SystemConfig`](crate::config::SystemConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override was not a JSON object of known fields.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
