//! mDNS service advertisement adapter.
//!
//! Publishes `<hostname>.local` and an `_http._tcp` service on the
//! request interface's port, with TXT records for firmware version and
//! device ID.  Uses the ESP-IDF mDNS component on device and is a no-op
//! on simulation targets.
//!
//! Lifecycle is tied to WiFi: start once an IP is assigned, stop on
//! disconnect.

use log::info;

use super::device_id::{DeviceIdString, DeviceIdentity, HostnameString};

const MDNS_SERVICE_TYPE: &str = "_http";

/// mDNS advertisement adapter.
pub struct MdnsAdapter {
    hostname: HostnameString,
    device_id: DeviceIdString,
    port: u16,
    active: bool,
}

impl MdnsAdapter {
    pub fn new(identity: &DeviceIdentity, port: u16) -> Self {
        Self {
            hostname: identity.hostname.clone(),
            device_id: identity.id.clone(),
            port,
            active: false,
        }
    }

    /// Whether mDNS is currently advertising.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start hostname + service advertisement.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = self.platform_start();
        if self.active {
            info!(
                "mDNS: advertising {}.local → {}._tcp:{} (device={})",
                self.hostname, MDNS_SERVICE_TYPE, self.port, self.device_id
            );
        }
    }

    /// Stop advertisement.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.platform_stop();
        self.active = false;
        info!("mDNS: stopped");
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&self) -> bool {
        use esp_idf_svc::sys::*;

        // NUL-terminated copies for the C API.
        fn c_buf<const N: usize>(s: &str) -> [u8; N] {
            let mut buf = [0u8; N];
            let len = s.len().min(N - 1);
            buf[..len].copy_from_slice(&s.as_bytes()[..len]);
            buf
        }

        let hostname = c_buf::<32>(&self.hostname);
        let id = c_buf::<24>(&self.device_id);
        let svc_type = b"_http\0";
        let svc_proto = b"_tcp\0";
        let ver = concat!(env!("CARGO_PKG_VERSION"), "\0");

        unsafe {
            let ret = mdns_init();
            if ret != ESP_OK as i32 {
                log::error!("mDNS: mdns_init failed ({})", ret);
                return false;
            }
            mdns_hostname_set(hostname.as_ptr() as *const _);
            mdns_instance_name_set(b"KVM Switch\0".as_ptr() as *const _);

            let ret = mdns_service_add(
                b"KVM Switch\0".as_ptr() as *const _,
                svc_type.as_ptr() as *const _,
                svc_proto.as_ptr() as *const _,
                self.port,
                core::ptr::null_mut(),
                0,
            );
            if ret != ESP_OK as i32 {
                log::error!("mDNS: service add failed ({})", ret);
                mdns_free();
                return false;
            }

            mdns_service_txt_item_set(
                svc_type.as_ptr() as *const _,
                svc_proto.as_ptr() as *const _,
                b"version\0".as_ptr() as *const _,
                ver.as_ptr() as *const _,
            );
            mdns_service_txt_item_set(
                svc_type.as_ptr() as *const _,
                svc_proto.as_ptr() as *const _,
                b"id\0".as_ptr() as *const _,
                id.as_ptr() as *const _,
            );
        }
        true
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&self) -> bool {
        info!(
            "mDNS(sim): registered {}.local {}:{} v={} id={}",
            self.hostname,
            MDNS_SERVICE_TYPE,
            self.port,
            env!("CARGO_PKG_VERSION"),
            self.device_id
        );
        true
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&self) {
        unsafe {
            esp_idf_svc::sys::mdns_free();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&self) {
        info!("mDNS(sim): unregistered");
    }
}
