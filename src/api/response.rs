//! Transport-neutral HTTP response.

use super::request::Method;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// `Location` header for redirects.
    pub location: Option<&'static str>,
}

impl ApiResponse {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            location: None,
        }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new(200, TEXT_PLAIN, body)
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self::new(200, APPLICATION_JSON, body)
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200, TEXT_HTML, body)
    }

    /// 303 back to `location`, so a browser form post lands on a page.
    pub fn see_other(location: &'static str) -> Self {
        Self {
            location: Some(location),
            ..Self::new(303, TEXT_PLAIN, location)
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(400, TEXT_PLAIN, msg)
    }

    pub fn not_found() -> Self {
        Self::new(404, TEXT_PLAIN, "not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(405, TEXT_PLAIN, "method not allowed")
    }

    pub fn payload_too_large() -> Self {
        Self::new(413, TEXT_PLAIN, "request body too large")
    }

    pub fn server_error(msg: impl Into<String>) -> Self {
        Self::new(500, TEXT_PLAIN, msg)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Bytes to send after the headers.  HEAD gets the GET headers and
    /// no body.
    pub fn body_for(&self, method: Method) -> &[u8] {
        match method {
            Method::Head => &[],
            _ => self.body.as_bytes(),
        }
    }

    /// Reason phrase for the status line.
    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            303 => "See Other",
            400 => "Bad Request",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            413 => "Payload Too Large",
            500 => "Internal Server Error",
            _ => "",
        }
    }
}
