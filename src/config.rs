//! System configuration parameters
//!
//! All tunable parameters for the KVM switch firmware.
//! Defaults match the reference hardware; Wi-Fi credentials and an
//! optional JSON override are baked in at build time.

use serde::{Deserialize, Serialize};

use crate::adapters::device_id;
use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Switch timing ---
    /// How long a switch line is held low (milliseconds)
    pub hold_ms: u32,
    /// Wait after release before the LED lines are re-read (milliseconds)
    pub settle_ms: u32,

    // --- Network ---
    /// TCP port of the HTTP request interface
    pub http_port: u16,
    /// Station-mode SSID (empty = no network join)
    pub wifi_ssid: String,
    /// WPA2 passphrase (empty for open networks)
    pub wifi_password: String,
    /// Hostname is `<prefix>-xxyyzz`, the suffix from the MAC
    pub hostname_prefix: String,
    /// Advertise `<hostname>.local` over mDNS
    pub mdns_enabled: bool,
    /// Accept firmware images on `/api/update`
    pub ota_enabled: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            hold_ms: 100,
            settle_ms: 50,

            http_port: 80,
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            hostname_prefix: "kvm".into(),
            mdns_enabled: true,
            ota_enabled: true,
        }
    }
}

impl SystemConfig {
    /// Defaults, then build-time environment, then build-time JSON override.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(ssid) = option_env!("KVM_WIFI_SSID") {
            config.wifi_ssid = ssid.to_owned();
        }
        if let Some(password) = option_env!("KVM_WIFI_PASSWORD") {
            config.wifi_password = password.to_owned();
        }
        match option_env!("KVM_CONFIG_JSON") {
            Some(json) => config.merge_json(json),
            None => {
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Apply a JSON override on top of `self`.  Fields absent from the JSON
    /// keep their current values.
    pub fn merge_json(self, json: &str) -> Result<Self, ConfigError> {
        let mut value = serde_json::to_value(&self).map_err(|_| ConfigError::Corrupted)?;
        let patch: serde_json::Value =
            serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        let serde_json::Value::Object(fields) = patch else {
            return Err(ConfigError::Corrupted);
        };
        if let serde_json::Value::Object(base) = &mut value {
            base.extend(fields);
        }
        let merged: Self = serde_json::from_value(value).map_err(|_| ConfigError::Corrupted)?;
        merged.validate()?;
        Ok(merged)
    }

    /// Range-check every field.  Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(20..=2000).contains(&self.hold_ms) {
            return Err(ConfigError::ValidationFailed("hold_ms must be 20-2000"));
        }
        if self.settle_ms > 2000 {
            return Err(ConfigError::ValidationFailed("settle_ms must be 0-2000"));
        }
        if self.http_port == 0 {
            return Err(ConfigError::ValidationFailed("http_port must be non-zero"));
        }
        if self.wifi_ssid.len() > 32 {
            return Err(ConfigError::ValidationFailed("wifi_ssid longer than 32 bytes"));
        }
        if !self.wifi_password.is_empty() && !(8..=64).contains(&self.wifi_password.len()) {
            return Err(ConfigError::ValidationFailed("wifi_password must be 8-64 bytes"));
        }
        if device_id::validate_prefix(&self.hostname_prefix).is_err() {
            return Err(ConfigError::ValidationFailed(
                "hostname_prefix must be a lowercase DNS label of at most 17 chars",
            ));
        }
        Ok(())
    }
}
