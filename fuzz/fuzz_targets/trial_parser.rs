#![no_main]

use libfuzzer_sys::fuzz_target;
use medir::label::Label;
use medir::trial::parse_records;

fuzz_target!(|data: &[u8]| {
    // Convert arbitrary bytes to UTF-8 string
    if let Ok(input) = std::str::from_utf8(data) {
        // CSV parsing and label resolution should not panic
        // regardless of input
        for record in parse_records(input) {
            for cell in &record {
                let _ = Label::resolve(cell);
            }
        }
    }
});
