#![cfg_attr(fuzzing, no_main)]

// Workspace test builds also compile fuzz binaries; give them a plain main.
#[cfg(not(fuzzing))]
fn main() {}

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let registry = resloc::Registry::new();

    // Strict decoding never panics; failures are typed KeyError kinds.
    let strict = registry.parse_key(raw);

    // The lenient family is fail-fast on the three precondition errors;
    // everything else must sanitize.
    if raw.is_empty() || raw.len() > resloc::MAX_LENGTH || raw.ends_with(':') {
        assert!(strict.is_err());
        return;
    }
    let key = registry.key(raw);

    // Sanitized halves are canonical.
    assert!(resloc::is_valid_namespace(key.namespace().name()));
    assert!(resloc::is_valid_key(key.local()));

    // The canonical form re-parses strictly to the identical entry.
    let reparsed = registry
        .parse_key(key.as_str())
        .expect("canonical form must re-parse");
    assert_eq!(reparsed, key);

    // When strict parsing succeeded, both policies agree.
    if let Ok(strict_key) = strict {
        assert_eq!(strict_key, key);
    }
});
