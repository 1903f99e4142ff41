//! The four front-panel switch lines as one bank.
//!
//! ## Invariant
//!
//! At most one line is driven at any time.  [`SwitchBank::press`] releases
//! any other driven line before driving the requested one, and
//! [`SwitchBank::driven_count`] exposes the invariant for checks.
//!
//! Port validation happens upstream: every [`Port`] names a real line.

use log::warn;

use crate::drivers::switch_line::{LineMode, SwitchLine};
use crate::kvm::Port;
use crate::pins;

pub struct SwitchBank {
    lines: [SwitchLine; 4],
}

impl SwitchBank {
    /// Bank on the board's switch pins.
    pub fn new() -> Self {
        Self::with_gpios(pins::SWITCH_GPIOS)
    }

    /// Bank on explicit pins, indexed by `Port::index()`.
    pub fn with_gpios(gpios: [i32; 4]) -> Self {
        Self {
            lines: gpios.map(SwitchLine::new),
        }
    }

    /// Drive the line of `port` low.
    pub fn press(&mut self, port: Port) {
        for (i, line) in self.lines.iter_mut().enumerate() {
            if i != port.index() && line.is_driven() {
                warn!("switch: line {} still driven, releasing before press", i + 1);
                line.transition(LineMode::FloatingInput);
            }
        }
        self.lines[port.index()].transition(LineMode::DrivenLow);
    }

    /// Float the line of `port` again.
    pub fn release(&mut self, port: Port) {
        self.lines[port.index()].transition(LineMode::FloatingInput);
    }

    /// Float every line.
    pub fn release_all(&mut self) {
        for line in &mut self.lines {
            line.transition(LineMode::FloatingInput);
        }
    }

    pub fn mode(&self, port: Port) -> LineMode {
        self.lines[port.index()].mode()
    }

    pub fn driven_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_driven()).count()
    }

    /// The port whose line is currently driven, if any.
    pub fn driven_port(&self) -> Option<Port> {
        self.lines
            .iter()
            .position(SwitchLine::is_driven)
            .and_then(Port::from_index)
    }
}

impl Default for SwitchBank {
    fn default() -> Self {
        Self::new()
    }
}
