//! KVM port-state model — port identity, LED decoding, switch pulses.
//!
//! Pure data and lookup tables, no I/O.  The drivers and the
//! [`SwitchController`](crate::app::controller::SwitchController) build on
//! these types.

pub mod led;
pub mod port;
pub mod pulse;

pub use led::LedCode;
pub use port::{PORT_COUNT, Port};
pub use pulse::{SwitchPulse, SwitchTiming};
