//! Canonical namespaced resource identifiers.
//!
//! Identifiers take the form `"namespace:key"` (for example
//! `minecraft:air`) over a restricted lowercase ASCII charset. A
//! [`Registry`] canonicalizes every distinct namespace and key string to
//! a single shared entry, so comparing handles is an identity comparison
//! rather than a string comparison.
//!
//! Each entry point comes in two flavors: a lenient one that sanitizes
//! invalid characters to `_` and panics only on structurally broken input
//! (for literals), and a strict `parse_*` one that returns a typed
//! [`KeyError`] (for untrusted input).
//!
//! ```
//! use resloc::Registry;
//!
//! let registry = Registry::new();
//! let air = registry.key("minecraft:air");
//! assert_eq!(air, registry.default_namespace().key("air"));
//! assert_eq!(air, registry.parse_key("MINECRAFT:AIR").unwrap());
//! assert_eq!(air.to_string(), "minecraft:air");
//! ```

pub mod errors;
pub mod parse;
pub mod registry;
pub mod types;

pub use errors::{InvalidCharKind, KeyError, Result};
pub use parse::{is_valid_key, is_valid_namespace, DEFAULT_NAMESPACE, MAX_LENGTH, SEPARATOR};
pub use registry::Registry;
pub use types::{Key, Namespace};
