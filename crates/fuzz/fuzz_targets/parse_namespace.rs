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

    let strict = registry.parse_namespace(raw);

    if raw.len() > resloc::MAX_LENGTH || raw.ends_with(':') {
        assert!(strict.is_err());
        return;
    }
    let ns = registry.namespace(raw);

    assert!(resloc::is_valid_namespace(ns.name()));

    // The canonical name re-parses strictly to the identical entry.
    let reparsed = registry
        .parse_namespace(ns.name())
        .expect("canonical namespace must re-parse");
    assert_eq!(reparsed, ns);

    if let Ok(strict_ns) = strict {
        assert_eq!(strict_ns, ns);
    }
});
