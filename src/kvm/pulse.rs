//! Switch pulse and its timing.
//!
//! A pulse is built, driven, held, released and dropped inside a single
//! `switch_to` call.  Nothing about it outlives that call.

use core::time::Duration;

use super::port::Port;
use crate::config::SystemConfig;

/// Reference hold duration of the front-panel press.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(100);
/// Reference wait between release and the LED re-read.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(50);

/// Hold and settle durations for a switch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchTiming {
    pub hold: Duration,
    pub settle: Duration,
}

impl SwitchTiming {
    pub const fn new(hold: Duration, settle: Duration) -> Self {
        Self { hold, settle }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            hold: Duration::from_millis(u64::from(config.hold_ms)),
            settle: Duration::from_millis(u64::from(config.settle_ms)),
        }
    }

    /// Time a caller is blocked by one switch.
    pub fn total(&self) -> Duration {
        self.hold + self.settle
    }

    pub fn hold_ms(&self) -> u32 {
        whole_ms(self.hold)
    }

    pub fn settle_ms(&self) -> u32 {
        whole_ms(self.settle)
    }
}

impl Default for SwitchTiming {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD, DEFAULT_SETTLE)
    }
}

/// Level a line returns to once the pulse ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    /// Non-driving input, so the physical button can pull the line too.
    Floating,
}

/// One momentary press of a front-panel switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchPulse {
    pub port: Port,
    pub hold: Duration,
    pub release: ReleaseState,
}

impl SwitchPulse {
    pub const fn new(port: Port, hold: Duration) -> Self {
        Self {
            port,
            hold,
            release: ReleaseState::Floating,
        }
    }

    /// Hold time in whole milliseconds, saturating at `u32::MAX`.
    pub fn hold_ms(&self) -> u32 {
        whole_ms(self.hold)
    }
}

fn whole_ms(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}
