//! LED-status decoding.
//!
//! The KVM exposes its active input on two LED-select lines.  The board
//! routes them with ports 2 and 3 swapped relative to a plain binary
//! reading, so the code is mapped through a fixed table:
//!
//! | bit1 bit0 | code | port |
//! |-----------|------|------|
//! | 0 0       | 0    | 1    |
//! | 0 1       | 1    | 3    |
//! | 1 0       | 2    | 2    |
//! | 1 1       | 3    | 4    |
//!
//! Every 2-bit code maps to a port; there is no error case.

use super::port::Port;

/// Code → port, indexed by `bit1 << 1 | bit0`.
const DECODE: [Port; 4] = [Port::One, Port::Three, Port::Two, Port::Four];

/// Port → code, indexed by [`Port::index`].  Inverse of [`DECODE`].
const ENCODE: [u8; 4] = [0b00, 0b10, 0b01, 0b11];

/// A raw 2-bit reading of the LED-select lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCode(u8);

impl LedCode {
    /// Combine the two line levels (`true` = high) into a code.
    pub const fn from_bits(bit1: bool, bit0: bool) -> Self {
        Self(((bit1 as u8) << 1) | bit0 as u8)
    }

    /// The code the hardware presents while `port` is active.
    pub const fn for_port(port: Port) -> Self {
        Self(ENCODE[port.index()])
    }

    /// Numeric code 0..=3.
    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn bit0(self) -> bool {
        self.0 & 0b01 != 0
    }

    pub const fn bit1(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// Map the code to the port it reports.
    pub const fn port(self) -> Port {
        DECODE[self.0 as usize]
    }
}

/// Decode a raw line pair straight to a port.
pub const fn decode(bit1: bool, bit0: bool) -> Port {
    LedCode::from_bits(bit1, bit0).port()
}
