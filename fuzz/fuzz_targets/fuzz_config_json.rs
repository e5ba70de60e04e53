//! Fuzz target: `SystemConfig::from_json`
//!
//! Feeds arbitrary bytes to the configuration parser and verifies:
//! - No panics on malformed UTF-8 or JSON
//! - Every accepted configuration passes `validate()`
//! - Accepted configurations survive a serialize/parse cycle unchanged
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use poolheat::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = SystemConfig::from_json(text) else {
        return;
    };
    assert!(config.validate().is_ok(), "accepted config failed validation");

    let json = serde_json::to_string(&config).expect("serialize accepted config");
    let reparsed = SystemConfig::from_json(&json).expect("re-parse own output");
    assert_eq!(config, reparsed);
});
