//! Device identity derived from the ESP32 factory MAC address.
//!
//! The last three MAC bytes form a suffix shared by the device ID
//! (`KV-A1B2C3`, reported on `/api/status` and in mDNS TXT) and the
//! hostname (`<prefix>-a1b2c3`, advertised as `<hostname>.local`).  The
//! prefix comes from [`SystemConfig::hostname_prefix`](crate::config::SystemConfig).

use core::fmt::{self, Write};

/// Fixed-size device ID string: "KV-XXYYZZ".
pub type DeviceIdString = heapless::String<16>;

/// mDNS hostname string: "<prefix>-xxyyzz".
pub type HostnameString = heapless::String<24>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

const ID_PREFIX: &str = "KV";

/// `-` plus six hex digits.
const SUFFIX_LEN: usize = 7;

/// Longest hostname prefix that still leaves room for the MAC suffix.
pub const MAX_PREFIX_LEN: usize = 24 - SUFFIX_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// Empty, over [`MAX_PREFIX_LEN`], or not a lowercase DNS label.
    InvalidPrefix,
    /// Formatted name overflowed its fixed buffer.
    Overflow,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrefix => write!(
                f,
                "hostname prefix must be 1-{MAX_PREFIX_LEN} chars of a-z, 0-9, '-'"
            ),
            Self::Overflow => write!(f, "device name overflowed its buffer"),
        }
    }
}

impl std::error::Error for IdentityError {}

/// Check `prefix` can start an mDNS hostname label.
pub fn validate_prefix(prefix: &str) -> Result<(), IdentityError> {
    let label_chars = prefix
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN || !label_chars || prefix.starts_with('-')
    {
        return Err(IdentityError::InvalidPrefix);
    }
    Ok(())
}

/// The device's names on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub id: DeviceIdString,
    pub hostname: HostnameString,
}

impl DeviceIdentity {
    pub fn from_mac(mac: &MacAddress, prefix: &str) -> Result<Self, IdentityError> {
        validate_prefix(prefix)?;
        let [.., a, b, c] = *mac;

        let mut id = DeviceIdString::new();
        write!(id, "{ID_PREFIX}-{a:02X}{b:02X}{c:02X}").map_err(|_| IdentityError::Overflow)?;

        let mut hostname = HostnameString::new();
        write!(hostname, "{prefix}-{a:02x}{b:02x}{c:02x}")
            .map_err(|_| IdentityError::Overflow)?;

        Ok(Self { id, hostname })
    }

    /// Identity of this board, from its eFuse MAC.
    pub fn of_this_device(prefix: &str) -> Result<Self, IdentityError> {
        Self::from_mac(&read_mac(), prefix)
    }
}

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: a locally administered MAC ending in "KVM".
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0x02, 0x00, 0x00, b'K', b'V', b'M']
}
