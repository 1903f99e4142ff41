//! Unified error types for the KVM switch firmware.
//!
//! The port-switching core has exactly one recoverable failure,
//! [`InvalidPort`].  Everything else funnels into the firmware-wide
//! [`Error`] so `main()` and the request layer handle failures uniformly.
//! All variants are `Copy` so they pass through the service lock and the
//! HTTP handlers without allocation.

use core::fmt;

use crate::api::ota::OtaError;
use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Core error
// ---------------------------------------------------------------------------

/// A requested port was outside 1..=4 or was not an integer at all.
///
/// Always detected before any line is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPort;

impl fmt::Display for InvalidPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid port")
    }
}

impl std::error::Error for InvalidPort {}

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A switch request named a port that does not exist.
    InvalidPort,
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// A firmware update session failed.
    Ota(OtaError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort => write!(f, "{}", InvalidPort),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Ota(e) => write!(f, "ota: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<InvalidPort> for Error {
    fn from(_: InvalidPort) -> Self {
        Self::InvalidPort
    }
}

impl From<OtaError> for Error {
    fn from(e: OtaError) -> Self {
        Self::Ota(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::Corrupted => Self::Config("override is not valid JSON"),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    WifiDisconnected,
    MdnsFailed,
    HttpServerFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::WifiDisconnected => write!(f, "WiFi disconnected"),
            Self::MdnsFailed => write!(f, "mDNS registration failed"),
            Self::HttpServerFailed => write!(f, "HTTP server failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
