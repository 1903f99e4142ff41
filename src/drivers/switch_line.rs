//! A single front-panel switch line.
//!
//! Each line is either a floating input (idle, the physical button owns
//! it) or a low-driving output (pressed).  All mode changes go through
//! [`SwitchLine::transition`], which is the only place the line's GPIO
//! direction is touched.

use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    FloatingInput,
    DrivenLow,
}

pub struct SwitchLine {
    gpio: i32,
    mode: LineMode,
}

impl SwitchLine {
    /// Wrap an already-initialised line.  Lines start floating.
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            mode: LineMode::FloatingInput,
        }
    }

    pub fn mode(&self) -> LineMode {
        self.mode
    }

    pub fn is_driven(&self) -> bool {
        self.mode == LineMode::DrivenLow
    }

    /// Move the line to `to`.  Returns the previous mode; a transition to
    /// the current mode is a no-op.
    pub fn transition(&mut self, to: LineMode) -> LineMode {
        let from = self.mode;
        match (from, to) {
            (LineMode::FloatingInput, LineMode::DrivenLow) => hw_init::gpio_drive_low(self.gpio),
            (LineMode::DrivenLow, LineMode::FloatingInput) => hw_init::gpio_float(self.gpio),
            _ => return from,
        }
        self.mode = to;
        from
    }
}

impl Drop for SwitchLine {
    fn drop(&mut self) {
        // A line must never be left pulling the button low.
        self.transition(LineMode::FloatingInput);
    }
}
