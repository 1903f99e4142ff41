//! Hardware adapter — bridges the GPIO drivers to the domain port traits.
//!
//! Owns the [`PortLedSensor`] and the [`SwitchBank`], exposing them
//! through [`PortSensor`] and [`PortActuator`].  On non-espidf targets
//! the underlying drivers run against the GPIO simulation.

use crate::app::ports::{PortActuator, PortSensor};
use crate::drivers::switch_bank::SwitchBank;
use crate::kvm::Port;
use crate::sensors::PortLedSensor;

/// Concrete adapter that combines all KVM-facing hardware.
pub struct HardwareAdapter {
    sensor: PortLedSensor,
    bank: SwitchBank,
}

impl HardwareAdapter {
    pub fn new(sensor: PortLedSensor, bank: SwitchBank) -> Self {
        Self { sensor, bank }
    }

    /// Adapter on the board's pin assignment.
    pub fn on_board_pins() -> Self {
        Self::new(PortLedSensor::default(), SwitchBank::new())
    }

    pub fn bank(&self) -> &SwitchBank {
        &self.bank
    }
}

// ── PortSensor implementation ─────────────────────────────────

impl PortSensor for HardwareAdapter {
    fn read_active_port(&mut self) -> Port {
        self.sensor.read()
    }
}

// ── PortActuator implementation ───────────────────────────────

impl PortActuator for HardwareAdapter {
    fn press(&mut self, port: Port) {
        self.bank.press(port);
    }

    fn release(&mut self, port: Port) {
        self.bank.release(port);
    }
}
