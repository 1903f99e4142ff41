//! HTTP firmware update — backed by the `esp-ota` crate.
//!
//! Flow: `POST /api/update` with `X-Firmware-Sha256` → begin → N × chunk
//! → finalize (digest check, boot partition switch) → reboot
//!
//! The image is hashed as it streams in; a digest mismatch at finalize
//! aborts the update and the running firmware stays bootable.

use core::fmt;

use hmac_sha256::Hash;
use log::{info, warn};

const MAX_FIRMWARE_SIZE: u32 = 4 * 1024 * 1024; // 4 MB

/// Request header carrying the hex SHA-256 of the uploaded image.
pub const SHA256_HEADER: &str = "X-Firmware-Sha256";

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaError {
    Disabled,
    AlreadyInProgress,
    InvalidSize,
    InvalidSha,
    BeginFailed,
    WriteFailed,
    DigestMismatch,
    VerifyFailed,
    BootSetFailed,
    IncompleteTransfer,
    NotReceiving,
    Overflow,
}

impl OtaError {
    /// Whether the uploader, rather than the device, is at fault.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::InvalidSize
                | Self::InvalidSha
                | Self::DigestMismatch
                | Self::IncompleteTransfer
                | Self::Overflow
        )
    }
}

impl fmt::Display for OtaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "firmware update is disabled"),
            Self::AlreadyInProgress => write!(f, "OTA session already in progress"),
            Self::InvalidSize => write!(f, "firmware size out of range (max 4 MB)"),
            Self::InvalidSha => write!(f, "SHA-256 must be 64 hex digits"),
            Self::BeginFailed => write!(f, "OTA begin failed"),
            Self::WriteFailed => write!(f, "OTA write failed"),
            Self::DigestMismatch => write!(f, "image SHA-256 does not match header"),
            Self::VerifyFailed => write!(f, "OTA verification failed"),
            Self::BootSetFailed => write!(f, "set boot partition failed"),
            Self::IncompleteTransfer => write!(f, "finalize called before all bytes written"),
            Self::NotReceiving => write!(f, "operation requires active Receiving state"),
            Self::Overflow => write!(f, "chunk would exceed declared firmware size"),
        }
    }
}

impl std::error::Error for OtaError {}

/// Parse a 64-digit hex SHA-256 (either case).
pub fn parse_sha256_hex(s: &str) -> Result<[u8; 32], OtaError> {
    let s = s.trim().as_bytes();
    if s.len() != 64 {
        return Err(OtaError::InvalidSha);
    }
    let mut out = [0u8; 32];
    for (byte, pair) in out.iter_mut().zip(s.chunks_exact(2)) {
        *byte = (hex_nibble(pair[0])? << 4) | hex_nibble(pair[1])?;
    }
    Ok(out)
}

fn hex_nibble(c: u8) -> Result<u8, OtaError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(OtaError::InvalidSha),
    }
}

// ── State machine ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaState {
    Idle,
    Receiving {
        expected_size: u32,
        bytes_written: u32,
    },
    Verifying,
    ReadyToReboot,
    Failed,
}

// ── Manager ───────────────────────────────────────────────────

/// OTA firmware update manager.
///
/// On ESP-IDF targets, uses the `esp-ota` crate for partition management.
/// On the host only the state machine and digest check run.
pub struct OtaManager {
    state: OtaState,
    expected_sha256: [u8; 32],
    hasher: Hash,
    #[cfg(target_os = "espidf")]
    ota_update: Option<esp_ota::OtaUpdate>,
}

impl OtaManager {
    pub fn new() -> Self {
        Self {
            state: OtaState::Idle,
            expected_sha256: [0u8; 32],
            hasher: Hash::new(),
            #[cfg(target_os = "espidf")]
            ota_update: None,
        }
    }

    pub fn state(&self) -> OtaState {
        self.state
    }

    /// Begin an OTA session. Validates size and opens the inactive partition.
    pub fn begin(&mut self, firmware_size: u32, sha256: [u8; 32]) -> Result<(), OtaError> {
        if matches!(self.state, OtaState::Receiving { .. } | OtaState::Verifying) {
            return Err(OtaError::AlreadyInProgress);
        }
        if firmware_size == 0 || firmware_size > MAX_FIRMWARE_SIZE {
            return Err(OtaError::InvalidSize);
        }

        self.expected_sha256 = sha256;
        self.hasher = Hash::new();

        #[cfg(target_os = "espidf")]
        {
            let update = esp_ota::OtaUpdate::begin().map_err(|e| {
                warn!("esp-ota begin failed: {:?}", e);
                OtaError::BeginFailed
            })?;
            self.ota_update = Some(update);
        }

        self.state = OtaState::Receiving {
            expected_size: firmware_size,
            bytes_written: 0,
        };
        info!("OTA: begin ({} bytes)", firmware_size);
        Ok(())
    }

    /// Append the next chunk of the image. Returns total bytes written.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<u32, OtaError> {
        let OtaState::Receiving {
            expected_size,
            bytes_written,
        } = self.state
        else {
            return Err(OtaError::NotReceiving);
        };

        let new_written = u32::try_from(data.len())
            .ok()
            .and_then(|len| bytes_written.checked_add(len))
            .filter(|&total| total <= expected_size)
            .ok_or(OtaError::Overflow)?;

        #[cfg(target_os = "espidf")]
        {
            let Some(update) = self.ota_update.as_mut() else {
                return Err(OtaError::NotReceiving);
            };
            if let Err(e) = update.write(data) {
                warn!("esp-ota write failed: {:?}", e);
                self.abort();
                return Err(OtaError::WriteFailed);
            }
        }

        self.hasher.update(data);
        self.state = OtaState::Receiving {
            expected_size,
            bytes_written: new_written,
        };
        Ok(new_written)
    }

    /// Finalize: check the digest, mark the partition bootable, set ReadyToReboot.
    pub fn finalize(&mut self) -> Result<(), OtaError> {
        match self.state {
            OtaState::Receiving {
                expected_size,
                bytes_written,
            } if bytes_written == expected_size => {}
            OtaState::Receiving { .. } => return Err(OtaError::IncompleteTransfer),
            _ => return Err(OtaError::NotReceiving),
        }

        self.state = OtaState::Verifying;

        let digest = core::mem::replace(&mut self.hasher, Hash::new()).finalize();
        if digest != self.expected_sha256 {
            warn!("OTA: digest mismatch, discarding image");
            self.abort();
            self.state = OtaState::Failed;
            return Err(OtaError::DigestMismatch);
        }

        #[cfg(target_os = "espidf")]
        {
            let Some(update) = self.ota_update.take() else {
                self.state = OtaState::Failed;
                return Err(OtaError::NotReceiving);
            };
            let mut completed = update.finalize().map_err(|e| {
                warn!("esp-ota finalize failed: {:?}", e);
                self.state = OtaState::Failed;
                OtaError::VerifyFailed
            })?;
            completed.set_as_boot_partition().map_err(|e| {
                warn!("esp-ota set_as_boot_partition failed: {:?}", e);
                self.state = OtaState::Failed;
                OtaError::BootSetFailed
            })?;
        }

        self.state = OtaState::ReadyToReboot;
        info!("OTA: finalized, ready to reboot");
        Ok(())
    }

    /// Abort the current OTA session; resets to Idle.
    pub fn abort(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            // esp-ota aborts automatically when OtaUpdate is dropped
            self.ota_update.take();
        }
        self.state = OtaState::Idle;
        warn!("OTA: aborted");
    }
}

impl Default for OtaManager {
    fn default() -> Self {
        Self::new()
    }
}

// ── Boot validation ───────────────────────────────────────────

/// Soft-reset into the newly flashed firmware.
#[cfg(target_os = "espidf")]
pub fn reboot() -> ! {
    info!("OTA: rebooting into new firmware");
    esp_ota::restart();
}

/// Mark the running image valid so the bootloader does not roll back.
#[cfg(target_os = "espidf")]
pub fn check_rollback() {
    match esp_ota::mark_app_valid() {
        Ok(()) => info!("OTA: firmware marked valid (rollback cancelled)"),
        Err(e) => warn!("OTA: mark_app_valid failed: {:?}", e),
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn check_rollback() {
    info!("OTA rollback check (simulation): skipped");
}

// ── Tests ─────────────────────────────────────────────────────
