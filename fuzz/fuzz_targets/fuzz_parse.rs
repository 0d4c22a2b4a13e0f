#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let parsed = ged_parser::parse(input);
    let _ = ged_parser::parse_summary_json(&parsed);
    let _ = serde_json::to_string(&parsed.transmission);
    for xref in parsed.transmission.dangling_references() {
        assert!(parsed.transmission.resolve(&xref).is_err());
    }
});
