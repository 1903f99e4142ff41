//! Request routing — method, path, query and body into an [`ApiRequest`].
//!
//! Parsing is pure and never fails: anything unroutable becomes
//! [`ApiRequest::NotFound`] or [`ApiRequest::MethodNotAllowed`], and a
//! missing or malformed port argument is carried through as text so the
//! service rejects it with `InvalidPort` in one place.

use crate::app::commands::KvmCommand;

/// HTTP methods the routes care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Other,
}

impl Method {
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            _ => Self::Other,
        }
    }

    fn is_read(self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }

    fn is_write(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

/// A routed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRequest<'a> {
    /// `GET /` — HTML control page.
    Page,
    /// `POST /` from the control page's forms; answered with a redirect.
    PageSwitch(&'a str),
    /// `GET /api/port`.
    GetPort,
    /// `POST|PUT /api/port[/{n}]`; the raw port argument, possibly empty.
    Switch(&'a str),
    /// `GET /api/status`.
    Status,
    /// `POST /api/update` — body is a firmware image.
    Update,
    MethodNotAllowed,
    NotFound,
}

const PORT_PATH: &str = "/api/port";

/// Largest body accepted on routes other than `/api/update`.
pub const MAX_BODY: usize = 64;

/// Why a request body could not be taken whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    /// Declared or actual length exceeds [`MAX_BODY`].
    TooLarge,
    NotUtf8,
    /// The connection failed mid-body.
    Transport,
}

/// Read a complete body into `buf`.  A body longer than `buf` is an
/// error, never truncated: a cut-off argument could name a valid port.
///
/// `read` follows the OTA stream contract: byte count, `0` at end of
/// body, `None` on a transport error.
pub fn read_body<'b>(
    buf: &'b mut [u8],
    mut read: impl FnMut(&mut [u8]) -> Option<usize>,
) -> Result<&'b str, BodyError> {
    let mut filled = 0;
    loop {
        if filled == buf.len() {
            let mut extra = [0u8; 1];
            match read(&mut extra) {
                Some(0) => break,
                Some(_) => return Err(BodyError::TooLarge),
                None => return Err(BodyError::Transport),
            }
        }
        match read(&mut buf[filled..]) {
            Some(0) => break,
            Some(n) => filled += n.min(buf.len() - filled),
            None => return Err(BodyError::Transport),
        }
    }
    core::str::from_utf8(&buf[..filled]).map_err(|_| BodyError::NotUtf8)
}

impl<'a> ApiRequest<'a> {
    /// Route a request.  `uri` may carry a `?query`; `body` is only
    /// consulted for switch requests without a path or query argument.
    pub fn parse(method: Method, uri: &'a str, body: &'a str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, query),
            None => (uri, ""),
        };
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };

        match path {
            "/" | "/index.html" if method.is_write() => {
                Self::PageSwitch(query_param(query, "port").unwrap_or_else(|| body_arg(body)))
            }
            "/" | "/index.html" => Self::read_only(method, Self::Page),
            "/api/status" => Self::read_only(method, Self::Status),
            "/api/update" if method == Method::Post => Self::Update,
            "/api/update" => Self::MethodNotAllowed,
            PORT_PATH if method.is_read() => Self::GetPort,
            PORT_PATH if method.is_write() => {
                let arg = query_param(query, "port").unwrap_or_else(|| body_arg(body));
                Self::Switch(arg)
            }
            PORT_PATH => Self::MethodNotAllowed,
            _ => match path.strip_prefix(PORT_PATH).and_then(|r| r.strip_prefix('/')) {
                Some(arg) if !arg.contains('/') => {
                    if method.is_write() {
                        Self::Switch(arg)
                    } else {
                        Self::MethodNotAllowed
                    }
                }
                _ => Self::NotFound,
            },
        }
    }

    fn read_only(method: Method, route: Self) -> Self {
        if method.is_read() {
            route
        } else {
            Self::MethodNotAllowed
        }
    }

    /// The service command this request maps to, if any.
    pub fn command(&self) -> Option<KvmCommand<'a>> {
        match *self {
            Self::GetPort => Some(KvmCommand::GetPort),
            Self::Switch(arg) | Self::PageSwitch(arg) => Some(KvmCommand::SwitchToArg(arg)),
            _ => None,
        }
    }
}

/// Value of `key` in an `a=1&b=2` query string.
pub fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Switch body: either a bare number or a form field `port=N`.
fn body_arg(body: &str) -> &str {
    let body = body.trim();
    query_param(body, "port").unwrap_or(body)
}
