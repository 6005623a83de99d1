//! Fuzz target: persisted settings region
//!
//! Feeds arbitrary bytes through `ControlSettings::decode` and checks:
//! - No panics for any length
//! - Regions shorter than the layout are rejected
//! - Anything decoded re-encodes to the first six bytes
//!
//! cargo fuzz run fuzz_settings_decode

#![no_main]

use humidistat::settings::{ControlSettings, SETTINGS_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match ControlSettings::decode(data) {
        Some(s) => {
            assert!(data.len() >= SETTINGS_LEN);
            assert_eq!(&s.encode()[..], &data[..SETTINGS_LEN]);
        }
        None => assert!(data.len() < SETTINGS_LEN),
    }
});
