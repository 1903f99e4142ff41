//! Application core — the switching rules, no direct I/O.
//!
//! The [`controller`] runs the press/settle/re-read sequence and the
//! [`service`] serialises access to it.  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this layer
//! testable without a KVM attached.

pub mod commands;
pub mod controller;
pub mod events;
pub mod ports;
pub mod service;
