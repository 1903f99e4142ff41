//! ESP-IDF HTTP server binding.
//!
//! Registers one wildcard handler per method on `EspHttpServer` and
//! funnels every request through [`RequestHandler`].  The server runs
//! handlers on its own task; concurrent requests are serialised by the
//! service lock, not here.  Body limits live in the handler.

use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use esp_idf_svc::http::Method as HttpMethod;
use esp_idf_svc::http::server::{Configuration, EspHttpConnection, EspHttpServer, Request};
use esp_idf_svc::io::{EspIOError, Read, Write};
use log::{info, warn};

use crate::api::ota::{self, SHA256_HEADER};
use crate::api::{ApiRequest, ApiResponse, Method, RequestHandler};
use crate::app::ports::{EventSink, PortActuator, PortSensor};
use crate::error::CommsError;

pub struct HttpServer {
    _server: EspHttpServer<'static>,
}

impl HttpServer {
    pub fn start<H, D, E>(
        port: u16,
        handler: Arc<RequestHandler<H, D, E>>,
    ) -> Result<Self, CommsError>
    where
        H: PortSensor + PortActuator + Send + 'static,
        D: DelayNs + Send + 'static,
        E: EventSink + Send + 'static,
    {
        let config = Configuration {
            http_port: port,
            uri_match_wildcard: true,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&config).map_err(|e| {
            warn!("HTTP: server start failed: {}", e);
            CommsError::HttpServerFailed
        })?;

        for method in [HttpMethod::Get, HttpMethod::Head, HttpMethod::Post, HttpMethod::Put] {
            let handler = Arc::clone(&handler);
            server
                .fn_handler("/*", method, move |req| serve(&handler, method, req))
                .map_err(|e| {
                    warn!("HTTP: handler registration failed: {}", e);
                    CommsError::HttpServerFailed
                })?;
        }

        info!("HTTP: listening on port {}", port);
        Ok(Self { _server: server })
    }
}

fn serve<H, D, E>(
    handler: &RequestHandler<H, D, E>,
    method: HttpMethod,
    mut req: Request<&mut EspHttpConnection<'_>>,
) -> Result<(), EspIOError>
where
    H: PortSensor + PortActuator,
    D: DelayNs,
    E: EventSink,
{
    let method = match method {
        HttpMethod::Get => Method::Get,
        HttpMethod::Head => Method::Head,
        HttpMethod::Post => Method::Post,
        HttpMethod::Put => Method::Put,
        _ => Method::Other,
    };
    let uri = req.uri().to_owned();

    if ApiRequest::parse(method, &uri, "") == ApiRequest::Update {
        let sha = req.header(SHA256_HEADER).map(str::to_owned);
        let len = req.content_len();
        let resp = handler.handle_update(sha.as_deref(), len, |buf| req.read(buf).ok());
        let accepted = resp.is_success();
        respond(req, method, &resp)?;
        if accepted {
            ota::reboot();
        }
        return Ok(());
    }

    let len = req.content_len();
    let resp = handler.handle_streamed(method, &uri, len, |buf| req.read(buf).ok());
    respond(req, method, &resp)
}

fn respond(
    req: Request<&mut EspHttpConnection<'_>>,
    method: Method,
    resp: &ApiResponse,
) -> Result<(), EspIOError> {
    let content_type = ("Content-Type", resp.content_type);
    let mut out = match resp.location {
        Some(location) => req.into_response(
            resp.status,
            Some(resp.reason()),
            &[content_type, ("Location", location)],
        )?,
        None => req.into_response(resp.status, Some(resp.reason()), &[content_type])?,
    };
    out.write_all(resp.body_for(method))?;
    Ok(())
}
