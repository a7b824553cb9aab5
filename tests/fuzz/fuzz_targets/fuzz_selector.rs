#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Selector parser must not panic on any input.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = s.parse::<covdelta::model::TestId>();
    }
});
