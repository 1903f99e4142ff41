//! HTTP request interface.
//!
//! ```text
//!  EspHttpServer ──▶ ApiRequest::parse ──▶ RequestHandler ──▶ KvmService
//!                                              │
//!                                              └──▶ ApiResponse
//! ```
//!
//! Everything here is transport-neutral; the server binding lives in
//! `adapters::http_server`.

pub mod handler;
pub mod ota;
pub mod page;
pub mod request;
pub mod response;

pub use handler::{DeviceInfo, RequestHandler};
pub use request::{ApiRequest, Method};
pub use response::ApiResponse;
