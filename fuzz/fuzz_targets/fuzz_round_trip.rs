#![no_main]

use ged_core::EmitConfig;
use libfuzzer_sys::fuzz_target;

// Emitted text parses back cleanly into the same tree and re-emits unchanged.
fuzz_target!(|data: &[u8]| {
    let Some((&width, rest)) = data.split_first() else {
        return;
    };
    let Ok(input) = std::str::from_utf8(rest) else {
        return;
    };
    let config = EmitConfig::default().with_wrap_width(20 + usize::from(width));

    let first = ged_parser::parse(input);
    let emitted = ged_emit::emit_with_config(&first.transmission, &config);
    let second = ged_parser::parse(&emitted);
    assert!(second.errors.is_empty(), "{:?}\n{emitted}", second.errors);
    assert_eq!(second.transmission, first.transmission);
    assert_eq!(ged_emit::emit_with_config(&second.transmission, &config), emitted);
});
