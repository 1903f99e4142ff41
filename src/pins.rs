//! GPIO assignments for the KVM switch controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

use crate::kvm::PORT_COUNT;

// ---------------------------------------------------------------------------
// LED-select status lines (KVM → controller)
// ---------------------------------------------------------------------------

/// Digital input: LED-select bit 0.  Input-only pin, no internal pull.
pub const LED_BIT0_GPIO: i32 = 34;
/// Digital input: LED-select bit 1.  Input-only pin, no internal pull.
pub const LED_BIT1_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// Front-panel switch contacts (controller → KVM)
// ---------------------------------------------------------------------------
//
// Idle as floating inputs so the physical buttons keep working.
// Driven low only for the duration of a press.

pub const SWITCH_PORT1_GPIO: i32 = 25;
pub const SWITCH_PORT2_GPIO: i32 = 26;
pub const SWITCH_PORT3_GPIO: i32 = 27;
pub const SWITCH_PORT4_GPIO: i32 = 14;

/// Switch line per port, indexed by `Port::index()`.
pub const SWITCH_GPIOS: [i32; PORT_COUNT] = [
    SWITCH_PORT1_GPIO,
    SWITCH_PORT2_GPIO,
    SWITCH_PORT3_GPIO,
    SWITCH_PORT4_GPIO,
];

/// Both LED-select inputs.
pub const LED_GPIOS: [i32; 2] = [LED_BIT0_GPIO, LED_BIT1_GPIO];
