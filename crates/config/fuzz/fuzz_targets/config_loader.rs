//! Fuzzing harness for the config loader
//!
//! Arbitrary bytes must never panic the parse → validate → decode pipeline.
//! Run with: cargo fuzz run config_loader

#![no_main]
use fontdock_config::{load_from_bytes, parse_document, validate_document};
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    let origin = Path::new("fuzz.toml");

    // A document that validates must also decode
    if let Ok(doc) = parse_document(data, origin) {
        let valid = validate_document(&doc).is_empty();
        let loaded = load_from_bytes(data, origin);
        assert_eq!(valid, loaded.is_ok());
    }
});
