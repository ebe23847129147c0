#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use journalpost_forwarder::MessageSanitizer;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    message: String,
    from_container: bool,
    single_line: bool,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(sanitizer) = MessageSanitizer::new(input.single_line) else {
        return;
    };

    let once = sanitizer
        .sanitize(&input.message, input.from_container)
        .into_owned();
    let twice = sanitizer.sanitize(&once, input.from_container);
    assert_eq!(once, twice, "sanitize must be idempotent");

    if input.single_line {
        assert!(!once.contains(['\n', '\r']));
    }
});
