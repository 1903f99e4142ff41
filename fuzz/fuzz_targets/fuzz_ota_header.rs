//! Fuzz target: `parse_sha256_hex`
//!
//! Arbitrary header values must either be rejected or decode to a digest
//! that re-encodes to the same hex (case-insensitive).
//!
//! cargo fuzz run fuzz_ota_header

#![no_main]

use libfuzzer_sys::fuzz_target;
use kvmswitch::api::ota::parse_sha256_hex;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(digest) = parse_sha256_hex(text) {
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(hex, text.trim().to_ascii_lowercase());
    }
});
