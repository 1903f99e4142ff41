//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (HTTP request
//! handler, serial console) that the [`KvmService`](super::service::KvmService)
//! interprets and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvmCommand<'a> {
    /// Report the active port.  No actuation.
    GetPort,

    /// Switch to a numeric port request (validated by the controller).
    SwitchTo(i64),

    /// Switch to a port given as request text, e.g. a query value or body.
    /// Text that is not an integer is rejected like an out-of-range number.
    SwitchToArg(&'a str),
}
