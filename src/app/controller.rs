//! Switch controller — the "switch to port N" sequence.
//!
//! ```text
//!  validate ──▶ press ──▶ hold ──▶ release ──▶ settle ──▶ re-read LEDs
//!     │
//!     └── InvalidPort: nothing touched
//! ```
//!
//! The returned port is always the sensor's reading after the settle
//! delay.  The KVM, not this controller, decides which port is active;
//! a press it fails to register (or a simultaneous physical press) shows
//! up as a result that differs from the request.
//!
//! The controller is not re-entrant by itself.  Callers that can arrive
//! from several tasks go through [`KvmService`](super::service::KvmService),
//! which holds its lock across the whole sequence.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::error::InvalidPort;
use crate::kvm::{Port, SwitchPulse, SwitchTiming};

use super::ports::{PortActuator, PortSensor};

pub struct SwitchController<H, D> {
    hw: H,
    delay: D,
    timing: SwitchTiming,
}

impl<H, D> SwitchController<H, D>
where
    H: PortSensor + PortActuator,
    D: DelayNs,
{
    pub fn new(hw: H, delay: D, timing: SwitchTiming) -> Self {
        Self { hw, delay, timing }
    }

    /// The KVM's active port, straight from the LED lines.
    pub fn active_port(&mut self) -> Port {
        self.hw.read_active_port()
    }

    /// Validate `requested`, press its switch, settle, and report the
    /// port the KVM ends up on.
    pub fn switch_to(&mut self, requested: i64) -> Result<Port, InvalidPort> {
        let port = Port::try_from(requested)?;
        Ok(self.switch_to_port(port))
    }

    /// [`switch_to`](Self::switch_to) for request text, parsed by
    /// [`Port::from_str`](core::str::FromStr).  Anything that is not a
    /// decimal integer is rejected the same way as an out-of-range one.
    pub fn switch_to_arg(&mut self, arg: &str) -> Result<Port, InvalidPort> {
        let port: Port = arg.parse()?;
        Ok(self.switch_to_port(port))
    }

    /// The switch sequence for an already-valid port.
    pub fn switch_to_port(&mut self, port: Port) -> Port {
        let pulse = SwitchPulse::new(port, self.timing.hold);
        debug!("switch: pressing port {} for {}ms", port, pulse.hold_ms());

        self.hw.activate(&pulse, &mut self.delay);
        self.delay.delay_ms(self.timing.settle_ms());

        self.hw.read_active_port()
    }

    pub fn timing(&self) -> SwitchTiming {
        self.timing
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }
}
