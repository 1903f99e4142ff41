//! Fuzz target: `ApiRequest::parse` and port argument parsing
//!
//! Splits arbitrary input into method / uri / body and asserts the router
//! never panics and only yields a switch for POST or PUT.  Any switch
//! argument that parses as a port must be in 1..=4.
//!
//! cargo fuzz run fuzz_request_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use kvmswitch::api::{ApiRequest, Method};
use kvmswitch::kvm::Port;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let mut parts = text.splitn(3, '\n');
    let method = Method::parse(parts.next().unwrap_or(""));
    let uri = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("");

    if let ApiRequest::Switch(arg) | ApiRequest::PageSwitch(arg) =
        ApiRequest::parse(method, uri, body)
    {
        assert!(matches!(method, Method::Post | Method::Put));
        if let Ok(port) = arg.parse::<Port>() {
            assert!((1..=4).contains(&port.number()));
        }
    }
});
