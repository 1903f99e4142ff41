//! KVM switch firmware library.
//!
//! Exposes the switching core, the request layer and the adapters for
//! integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module; on the host the
//! GPIO layer runs against an in-memory simulation.

#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod kvm;
pub mod pins;
pub mod sensors;
