//! Sensor drivers.
//!
//! The only sensed quantity is the KVM's active port, read from its
//! LED-select lines by [`port_led::PortLedSensor`].

pub mod port_led;

pub use port_led::PortLedSensor;
