//! Outbound application events.
//!
//! The [`KvmService`](super::service::KvmService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, etc.

use crate::kvm::Port;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service came up; carries the port the KVM reported at boot.
    Started(Port),

    /// A switch sequence ran to completion.  `reported` is what the LED
    /// lines showed after settling and may differ from `requested`.
    Switched { requested: Port, reported: Port },

    /// A switch request was refused before any line was driven.
    SwitchRejected,
}

impl AppEvent {
    /// A completed switch whose re-read disagrees with the request.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Switched { requested, reported } if requested != reported)
    }
}
