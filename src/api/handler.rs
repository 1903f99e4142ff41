//! Request handler — routes an [`ApiRequest`] to the [`KvmService`].
//!
//! Transport-agnostic: the ESP-IDF server adapter and the host tests both
//! feed requests through [`RequestHandler::handle`], so every route is
//! testable without a network stack.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use serde::Serialize;

use crate::app::ports::{EventSink, PortActuator, PortSensor};
use crate::app::service::KvmService;
use crate::kvm::Port;

use super::ota::{OtaError, OtaManager, OtaState, parse_sha256_hex};
use super::page;
use super::request::{ApiRequest, BodyError, MAX_BODY, Method, read_body};
use super::response::ApiResponse;

/// Identity reported on the status route and the control page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub hostname: String,
    pub device_id: String,
    pub version: &'static str,
}

#[derive(Serialize)]
struct StatusBody<'a> {
    port: Port,
    hostname: &'a str,
    device_id: &'a str,
    version: &'a str,
    hold_ms: u32,
    settle_ms: u32,
    switch_count: u64,
}

pub struct RequestHandler<H, D, E> {
    service: Arc<KvmService<H, D, E>>,
    info: DeviceInfo,
    ota_enabled: bool,
    ota_busy: AtomicBool,
}

impl<H, D, E> RequestHandler<H, D, E>
where
    H: PortSensor + PortActuator,
    D: DelayNs,
    E: EventSink,
{
    pub fn new(service: Arc<KvmService<H, D, E>>, info: DeviceInfo, ota_enabled: bool) -> Self {
        Self {
            service,
            info,
            ota_enabled,
            ota_busy: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> &Arc<KvmService<H, D, E>> {
        &self.service
    }

    /// Answer every route except `/api/update`, whose body is streamed
    /// through [`handle_update`](Self::handle_update).
    pub fn handle(&self, req: &ApiRequest<'_>) -> ApiResponse {
        match req {
            ApiRequest::Page => {
                let port = self.service.current_port();
                ApiResponse::html(page::render(port, &self.info.hostname))
            }
            ApiRequest::PageSwitch(arg) => match self.service.switch_to_arg(arg) {
                Ok(_) => ApiResponse::see_other("/"),
                Err(e) => ApiResponse::bad_request(e.to_string()),
            },
            ApiRequest::Status => self.status(),
            ApiRequest::GetPort | ApiRequest::Switch(_) => match req.command() {
                Some(cmd) => match self.service.handle_command(cmd) {
                    Ok(port) => ApiResponse::text(port.to_string()),
                    Err(e) => ApiResponse::bad_request(e.to_string()),
                },
                None => ApiResponse::not_found(),
            },
            ApiRequest::Update => {
                ApiResponse::bad_request("firmware upload requires a streamed body")
            }
            ApiRequest::MethodNotAllowed => ApiResponse::method_not_allowed(),
            ApiRequest::NotFound => ApiResponse::not_found(),
        }
    }

    /// Read the body through `read` and answer the routed request.  A body
    /// over [`MAX_BODY`] is refused before routing, so nothing is switched.
    pub fn handle_streamed(
        &self,
        method: Method,
        uri: &str,
        content_len: Option<u64>,
        read: impl FnMut(&mut [u8]) -> Option<usize>,
    ) -> ApiResponse {
        if content_len.is_some_and(|len| len > MAX_BODY as u64) {
            warn!("HTTP: {} body of {:?} bytes refused", uri, content_len);
            return ApiResponse::payload_too_large();
        }
        let mut buf = [0u8; MAX_BODY];
        match read_body(&mut buf, read) {
            Ok(body) => self.handle(&ApiRequest::parse(method, uri, body)),
            Err(BodyError::TooLarge) => {
                warn!("HTTP: {} body over {} bytes refused", uri, MAX_BODY);
                ApiResponse::payload_too_large()
            }
            Err(BodyError::NotUtf8) => ApiResponse::bad_request("body is not utf-8"),
            Err(BodyError::Transport) => ApiResponse::bad_request("incomplete body"),
        }
    }

    fn status(&self) -> ApiResponse {
        let timing = self.service.timing();
        let body = StatusBody {
            port: self.service.current_port(),
            hostname: &self.info.hostname,
            device_id: &self.info.device_id,
            version: self.info.version,
            hold_ms: timing.hold_ms(),
            settle_ms: timing.settle_ms(),
            switch_count: self.service.switch_count(),
        };
        match serde_json::to_string(&body) {
            Ok(json) => ApiResponse::json(json),
            Err(_) => ApiResponse::server_error("status encoding failed"),
        }
    }

    /// Stream a firmware image into the OTA partition.
    ///
    /// `read` fills the buffer and returns the byte count, `0` at end of
    /// body, or `None` on a transport error.  A 200 response means the
    /// image is verified and bootable; the caller reboots after sending it.
    /// One upload at a time: a second concurrent upload gets 409.
    pub fn handle_update(
        &self,
        sha256_header: Option<&str>,
        content_len: Option<u64>,
        read: impl FnMut(&mut [u8]) -> Option<usize>,
    ) -> ApiResponse {
        if !self.ota_enabled {
            return ota_response(OtaError::Disabled);
        }
        let Some(_busy) = BusyFlag::claim(&self.ota_busy) else {
            return ota_response(OtaError::AlreadyInProgress);
        };
        let result = stream_image(sha256_header, content_len, read);

        match result {
            Ok(()) => {
                info!("OTA: image accepted");
                ApiResponse::text("update accepted, rebooting")
            }
            Err(e) => ota_response(e),
        }
    }
}

/// Holds the one-upload flag; released on drop, unwinding included.
struct BusyFlag<'a>(&'a AtomicBool);

impl<'a> BusyFlag<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::AcqRel)).then_some(Self(flag))
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn stream_image(
    sha256_header: Option<&str>,
    content_len: Option<u64>,
    mut read: impl FnMut(&mut [u8]) -> Option<usize>,
) -> Result<(), OtaError> {
    let sha = parse_sha256_hex(sha256_header.unwrap_or_default())?;
    let size = content_len
        .and_then(|len| u32::try_from(len).ok())
        .ok_or(OtaError::InvalidSize)?;

    let mut ota = OtaManager::new();
    ota.begin(size, sha)?;

    let mut buf = [0u8; 1024];
    let result = loop {
        match read(&mut buf) {
            None => break Err(OtaError::IncompleteTransfer),
            Some(0) => break ota.finalize(),
            Some(n) => {
                if let Err(e) = ota.write_chunk(&buf[..n.min(buf.len())]) {
                    break Err(e);
                }
            }
        }
    };
    if result.is_err() && matches!(ota.state(), OtaState::Receiving { .. }) {
        ota.abort();
    }
    result
}

fn ota_response(e: OtaError) -> ApiResponse {
    warn!("OTA: {}", e);
    match e {
        OtaError::Disabled => ApiResponse::new(403, super::response::TEXT_PLAIN, e.to_string()),
        OtaError::AlreadyInProgress => {
            ApiResponse::new(409, super::response::TEXT_PLAIN, e.to_string())
        }
        e if e.is_client_error() => ApiResponse::bad_request(e.to_string()),
        e => ApiResponse::server_error(e.to_string()),
    }
}
