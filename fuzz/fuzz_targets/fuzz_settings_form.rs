//! Fuzz target: settings form body
//!
//! Arbitrary request bodies must never panic the parser, and the rendered
//! status page must never keep an unfilled placeholder.
//!
//! cargo fuzz run fuzz_settings_form

#![no_main]

use humidistat::app::status::StatusView;
use humidistat::ui;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    let s = ui::parse_settings_form(&body);
    let view = StatusView {
        high_value: s.high_threshold,
        low_value: s.low_threshold,
        offset: s.timezone_offset_hours,
        ..StatusView::default()
    };
    assert!(!ui::render_index(&view).contains("{{"));
});
