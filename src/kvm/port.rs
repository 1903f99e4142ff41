//! Logical KVM port identity.
//!
//! A [`Port`] can only be one of the four physical inputs, so every value
//! that reaches the actuator has already been validated.  Parsing from
//! request arguments funnels into [`InvalidPort`].

use core::fmt;
use core::str::FromStr;

use serde::Serialize;

use crate::error::InvalidPort;

/// Number of physical ports on the supported KVM.
pub const PORT_COUNT: usize = 4;

/// One of the four KVM inputs, numbered as printed on the front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum Port {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Port {
    /// All ports in front-panel order.
    pub const ALL: [Port; PORT_COUNT] = [Port::One, Port::Two, Port::Three, Port::Four];

    /// 1-based port number.
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// 0-based index into per-port tables (pins, line banks).
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Build a port from a 0-based index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Port::One),
            1 => Some(Port::Two),
            2 => Some(Port::Three),
            3 => Some(Port::Four),
            _ => None,
        }
    }
}

impl From<Port> for u8 {
    fn from(port: Port) -> u8 {
        port.number()
    }
}

impl TryFrom<i64> for Port {
    type Error = InvalidPort;

    fn try_from(n: i64) -> Result<Self, InvalidPort> {
        match n {
            1 => Ok(Port::One),
            2 => Ok(Port::Two),
            3 => Ok(Port::Three),
            4 => Ok(Port::Four),
            _ => Err(InvalidPort),
        }
    }
}

impl TryFrom<u8> for Port {
    type Error = InvalidPort;

    fn try_from(n: u8) -> Result<Self, InvalidPort> {
        Port::try_from(i64::from(n))
    }
}

impl FromStr for Port {
    type Err = InvalidPort;

    /// Accepts a plain decimal integer, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, InvalidPort> {
        let n: i64 = s.trim().parse().map_err(|_| InvalidPort)?;
        Port::try_from(n)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
