//! Concurrent canonicalization registry.
//!
//! Interns namespace and key strings so that each canonical string maps to
//! exactly one shared entry. Lookups take a shared lock; first-time
//! construction takes the exclusive lock, re-checks, and inserts at most
//! once per string.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::errors::Result;
use crate::parse::{parse, Policy, Shape, DEFAULT_NAMESPACE, SEPARATOR};
use crate::types::{Key, Namespace};

/// Thread-safe get-or-create cache from canonical strings to entries.
#[derive(Debug)]
pub(crate) struct InternMap<T> {
    entries: RwLock<HashMap<Box<str>, T>>,
}

impl<T: Clone> InternMap<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Shared-lock lookup; never creates.
    pub(crate) fn get(&self, name: &str) -> Option<T> {
        self.entries.read().get(name).cloned()
    }

    /// Returns the entry for `name`, running `make` at most once per name
    /// over the map's lifetime. Concurrent callers racing on the same
    /// absent name all receive the one entry the winner inserted.
    pub(crate) fn get_or_create(&self, name: &str, make: impl FnOnce() -> T) -> T {
        if let Some(entry) = self.entries.read().get(name) {
            return entry.clone();
        }

        let mut entries = self.entries.write();
        // Re-check: another thread may have inserted the entry while we
        // waited for the exclusive lock.
        if let Some(entry) = entries.get(name) {
            return entry.clone();
        }
        let entry = make();
        entries.insert(name.into(), entry.clone());
        entry
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Canonicalization registry for namespaces and keys.
///
/// Every distinct canonical namespace string maps to exactly one
/// [`Namespace`] entry, and every distinct key string within a namespace
/// to exactly one [`Key`] entry, for the lifetime of the registry. All
/// operations are safe to call concurrently; share the registry by
/// reference or behind an `Arc`.
///
/// Entries are never evicted, so the registry grows with the number of
/// distinct canonical strings ever requested. Untrusted input should be
/// validated or bounded before being interned through the lenient entry
/// points.
#[derive(Debug)]
pub struct Registry {
    namespaces: InternMap<Namespace>,
    default_ns: Namespace,
}

impl Registry {
    /// Creates a registry with the default namespace already interned.
    pub fn new() -> Self {
        let namespaces = InternMap::new();
        let default_ns =
            namespaces.get_or_create(DEFAULT_NAMESPACE, || Namespace::new_entry(DEFAULT_NAMESPACE));
        Self {
            namespaces,
            default_ns,
        }
    }

    /// The eagerly interned default namespace.
    pub fn default_namespace(&self) -> Namespace {
        self.default_ns.clone()
    }

    /// Looks up an already-interned namespace by canonical name; never
    /// creates.
    pub fn get_namespace(&self, name: &str) -> Option<Namespace> {
        self.namespaces.get(name)
    }

    /// Looks up an already-interned key by its canonical
    /// `"namespace:key"` form; never creates.
    pub fn get_key(&self, full: &str) -> Option<Key> {
        let (ns, key) = full.split_once(SEPARATOR)?;
        self.get_namespace(ns)?.get(key)
    }

    /// Number of namespaces interned so far.
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Leniently parses `raw` as a namespace and interns it. Invalid
    /// characters are replaced with '_'; the empty string resolves to the
    /// default namespace.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is longer than [`MAX_LENGTH`](crate::MAX_LENGTH)
    /// bytes or ends with ':'. Intended for literals known valid at
    /// compile time; use [`Registry::parse_namespace`] for untrusted
    /// input.
    pub fn namespace(&self, raw: &str) -> Namespace {
        match parse(raw, Policy::Lenient, Shape::NamespaceOnly) {
            Ok((ns, _)) => self.intern_namespace(&ns),
            Err(err) => panic!("invalid namespace literal {raw:?}: {err}"),
        }
    }

    /// Strictly parses `raw` as a namespace and interns it.
    pub fn parse_namespace(&self, raw: &str) -> Result<Namespace> {
        let (ns, _) = parse(raw, Policy::Strict, Shape::NamespaceOnly)?;
        Ok(self.intern_namespace(&ns))
    }

    /// Leniently parses `raw` as `"namespace:key"` (or a bare key,
    /// resolved into the default namespace) and interns the pair. Invalid
    /// characters are replaced with '_'.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is empty, longer than
    /// [`MAX_LENGTH`](crate::MAX_LENGTH) bytes, or ends with ':'.
    /// Intended for literals known valid at compile time; use
    /// [`Registry::parse_key`] for untrusted input.
    pub fn key(&self, raw: &str) -> Key {
        match parse(raw, Policy::Lenient, Shape::Full) {
            Ok((ns, key)) => self.intern_namespace(&ns).intern_key(&key),
            Err(err) => panic!("invalid key literal {raw:?}: {err}"),
        }
    }

    /// Strictly parses `raw` as `"namespace:key"` (or a bare key) and
    /// interns the pair. Parser error kinds are surfaced verbatim, which
    /// makes this the decode half of the canonical text contract.
    pub fn parse_key(&self, raw: &str) -> Result<Key> {
        let (ns, key) = parse(raw, Policy::Strict, Shape::Full)?;
        Ok(self.intern_namespace(&ns).intern_key(&key))
    }

    fn intern_namespace(&self, name: &str) -> Namespace {
        self.namespaces.get_or_create(name, || {
            debug!(namespace = name, "interning new namespace");
            Namespace::new_entry(name)
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace_is_interned_eagerly() {
        let registry = Registry::new();
        assert_eq!(registry.namespace_count(), 1);
        assert_eq!(registry.default_namespace().name(), DEFAULT_NAMESPACE);
        assert_eq!(
            registry.default_namespace(),
            registry.namespace(DEFAULT_NAMESPACE)
        );
    }

    #[test]
    fn test_get_never_creates() {
        let registry = Registry::new();
        assert!(registry.get_namespace("other").is_none());
        assert!(registry.get_key("minecraft:air").is_none());
        assert_eq!(registry.namespace_count(), 1);

        let air = registry.key("minecraft:air");
        assert_eq!(registry.get_key("minecraft:air"), Some(air));
    }

    #[test]
    fn test_get_or_create_reuses_entries() {
        let map = InternMap::new();
        let a = map.get_or_create("x", || String::from("first"));
        let b = map.get_or_create("x", || String::from("second"));
        assert_eq!(a, "first");
        assert_eq!(b, "first");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_equivalent_spellings_intern_once() {
        let registry = Registry::new();
        let a = registry.key("minecraft:air");
        let b = registry.key("MINECRAFT:AIR");
        let c = registry.parse_key("minecraft:air").unwrap();
        let d = registry.key("air");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
        assert_eq!(registry.namespace_count(), 1);
    }

    #[test]
    fn test_sanitized_and_canonical_spellings_share_an_entry() {
        let registry = Registry::new();
        let sanitized = registry.key("abc:;;;123");
        let canonical = registry.parse_key("abc:___123").unwrap();
        assert_eq!(sanitized, canonical);
        assert_eq!(sanitized.as_str(), "abc:___123");
    }

    #[test]
    fn test_strict_errors_pass_through() {
        let registry = Registry::new();
        assert_eq!(registry.parse_key(""), Err(crate::KeyError::Empty));
        assert_eq!(
            registry.parse_key("aa:"),
            Err(crate::KeyError::TrailingSeparator)
        );
        assert!(matches!(
            registry.parse_namespace("a/b"),
            Err(crate::KeyError::InvalidChar { ch: '/', .. })
        ));
        // Failed parses intern nothing.
        assert_eq!(registry.namespace_count(), 1);
    }

    #[test]
    #[should_panic(expected = "invalid key literal")]
    fn test_lenient_key_panics_on_empty_input() {
        Registry::new().key("");
    }

    #[test]
    #[should_panic(expected = "invalid namespace literal")]
    fn test_lenient_namespace_panics_on_trailing_separator() {
        Registry::new().namespace("aa:");
    }
}
