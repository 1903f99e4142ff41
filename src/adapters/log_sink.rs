//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(port) => {
                info!("START | port={}", port);
            }
            AppEvent::Switched {
                requested,
                reported,
            } if event.is_mismatch() => {
                warn!(
                    "SWITCH | requested={} reported={} | KVM did not follow",
                    requested, reported
                );
            }
            AppEvent::Switched {
                requested,
                reported,
            } => {
                info!("SWITCH | requested={} reported={}", requested, reported);
            }
            AppEvent::SwitchRejected => {
                warn!("SWITCH | rejected: invalid port");
            }
        }
    }
}
