//! Namespace and key handles.
//!
//! Handles are cheap clones of entries owned by a
//! [`Registry`](crate::Registry). Equality and hashing are identity of the
//! underlying entry: two handles compare equal iff they refer to the same
//! registry entry, never by comparing strings.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::errors::{KeyError, Result};
use crate::parse::{parse, Policy, Shape, SEPARATOR};
use crate::registry::InternMap;

/// Entry backing a [`Namespace`] handle.
#[derive(Debug)]
pub(crate) struct NamespaceEntry {
    name: Box<str>,
    /// Keys interned inside this namespace. Key entries hold a handle
    /// back to their namespace, so entries form reference cycles and
    /// stay alive until process exit.
    keys: InternMap<Key>,
}

/// A namespace handle, e.g. the `minecraft` in `minecraft:air`.
///
/// The default value is the nil handle: it displays as the empty string
/// and its structural operations fail with [`KeyError::NilHandle`] or, on
/// the fail-fast accessors, panic.
#[derive(Clone, Default)]
pub struct Namespace {
    entry: Option<Arc<NamespaceEntry>>,
}

impl Namespace {
    pub(crate) fn new_entry(name: &str) -> Self {
        Self {
            entry: Some(Arc::new(NamespaceEntry {
                name: name.into(),
                keys: InternMap::new(),
            })),
        }
    }

    /// Canonical namespace name, or `""` for the nil handle.
    pub fn name(&self) -> &str {
        self.entry.as_ref().map_or("", |e| &e.name)
    }

    /// Whether this is the nil (default-constructed) handle.
    pub fn is_nil(&self) -> bool {
        self.entry.is_none()
    }

    /// Leniently parses `raw` as a key fragment and interns it in this
    /// namespace. Invalid characters are replaced with '_'.
    ///
    /// # Panics
    ///
    /// Panics on the nil handle, and if `raw` is empty, longer than
    /// [`MAX_LENGTH`](crate::MAX_LENGTH) bytes, or ends with ':'.
    /// Intended for literals known valid at compile time; use
    /// [`Namespace::parse_key`] for untrusted input.
    pub fn key(&self, raw: &str) -> Key {
        assert!(!self.is_nil(), "key() called on a nil namespace handle");
        match parse(raw, Policy::Lenient, Shape::BareKey) {
            Ok((_, key)) => self.intern_key(&key),
            Err(err) => panic!("invalid key literal {raw:?}: {err}"),
        }
    }

    /// Strictly parses `raw` as a key fragment and interns it in this
    /// namespace.
    pub fn parse_key(&self, raw: &str) -> Result<Key> {
        if self.is_nil() {
            return Err(KeyError::NilHandle);
        }
        let (_, key) = parse(raw, Policy::Strict, Shape::BareKey)?;
        Ok(self.intern_key(&key))
    }

    /// Looks up an already-interned key by canonical string; never
    /// creates. Returns `None` on the nil handle.
    pub fn get(&self, key: &str) -> Option<Key> {
        self.entry.as_ref().and_then(|e| e.keys.get(key))
    }

    /// Number of keys interned in this namespace so far.
    pub fn key_count(&self) -> usize {
        self.entry.as_ref().map_or(0, |e| e.keys.len())
    }

    pub(crate) fn intern_key(&self, local: &str) -> Key {
        let entry = self
            .entry
            .as_ref()
            .expect("interned namespace handles are never nil");
        entry.keys.get_or_create(local, || {
            debug!(namespace = &*entry.name, key = local, "interning new key");
            Key::new_entry(self.clone(), local)
        })
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        entry_ptr(&self.entry) == entry_ptr(&other.entry)
    }
}

impl Eq for Namespace {}

impl Hash for Namespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        entry_ptr(&self.entry).hash(state);
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Namespace").field(&self.name()).finish()
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Entry backing a [`Key`] handle.
#[derive(Debug)]
pub(crate) struct KeyEntry {
    namespace: Namespace,
    local: Box<str>,
    /// Precomputed canonical `"namespace:key"` form.
    full: Box<str>,
}

/// A namespaced key handle, e.g. `minecraft:air`.
///
/// The default value is the nil handle: it displays as the empty string
/// and its structural operations fail with [`KeyError::NilHandle`] or, on
/// the fail-fast accessors, panic.
#[derive(Clone, Default)]
pub struct Key {
    entry: Option<Arc<KeyEntry>>,
}

impl Key {
    pub(crate) fn new_entry(namespace: Namespace, local: &str) -> Self {
        let mut full = String::with_capacity(namespace.name().len() + 1 + local.len());
        full.push_str(namespace.name());
        full.push(SEPARATOR);
        full.push_str(local);
        Self {
            entry: Some(Arc::new(KeyEntry {
                namespace,
                local: local.into(),
                full: full.into_boxed_str(),
            })),
        }
    }

    /// Whether this is the nil (default-constructed) handle.
    pub fn is_nil(&self) -> bool {
        self.entry.is_none()
    }

    /// The namespace this key belongs to.
    ///
    /// # Panics
    ///
    /// Panics on the nil handle; see [`Key::try_namespace`] for the
    /// fallible accessor.
    pub fn namespace(&self) -> Namespace {
        match self.try_namespace() {
            Ok(ns) => ns,
            Err(err) => panic!("namespace() called on a nil key handle: {err}"),
        }
    }

    /// Fallible counterpart of [`Key::namespace`].
    pub fn try_namespace(&self) -> Result<Namespace> {
        self.entry
            .as_ref()
            .map(|e| e.namespace.clone())
            .ok_or(KeyError::NilHandle)
    }

    /// The local part after the ':', or `""` for the nil handle.
    pub fn local(&self) -> &str {
        self.entry.as_ref().map_or("", |e| &e.local)
    }

    /// The canonical `"namespace:key"` form, or `""` for the nil handle.
    /// This is the encode half of the canonical text contract.
    pub fn as_str(&self) -> &str {
        self.entry.as_ref().map_or("", |e| &e.full)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        entry_ptr(&self.entry) == entry_ptr(&other.entry)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        entry_ptr(&self.entry).hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.as_str()).finish()
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Identity of the backing allocation; 0 for the nil handle.
fn entry_ptr<T>(entry: &Option<Arc<T>>) -> usize {
    entry.as_ref().map_or(0, |e| Arc::as_ptr(e) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    #[test]
    fn test_handle_equality_is_identity() {
        let registry = Registry::new();
        let a = registry.key("minecraft:air");
        let b = registry.key("minecraft:air");
        let other = registry.key("minecraft:stone");
        assert_eq!(a, b);
        assert_ne!(a, other);
        assert_eq!(a.namespace(), other.namespace());

        // The same canonical strings in a different registry are
        // different entries.
        let second = Registry::new();
        assert_ne!(a, second.key("minecraft:air"));
    }

    #[test]
    fn test_round_trip() {
        let registry = Registry::new();
        let key = registry.namespace("mypack").key("blocks/air.2");
        assert_eq!(key.as_str(), "mypack:blocks/air.2");
        assert_eq!(key.to_string(), "mypack:blocks/air.2");
        assert_eq!(key.local(), "blocks/air.2");
        assert_eq!(key.namespace().name(), "mypack");
    }

    #[test]
    fn test_namespace_scoped_parsing() {
        let registry = Registry::new();
        let ns = registry.namespace("mypack");
        assert_eq!(ns.key("AIR"), ns.parse_key("air").unwrap());
        assert_eq!(ns.key(";air").as_str(), "mypack:_air");
        assert!(matches!(
            ns.parse_key("a:b"),
            Err(KeyError::InvalidChar { ch: ':', .. })
        ));
        assert_eq!(ns.parse_key(""), Err(KeyError::Empty));
    }

    #[test]
    fn test_namespace_get_and_key_count() {
        let registry = Registry::new();
        let ns = registry.namespace("mypack");
        assert_eq!(ns.key_count(), 0);
        assert!(ns.get("air").is_none());

        let air = ns.key("air");
        assert_eq!(ns.key_count(), 1);
        assert_eq!(ns.get("air"), Some(air));
        // Lookup expects the canonical string, not a raw spelling.
        assert!(ns.get("AIR").is_none());
    }

    #[test]
    fn test_nil_handles() {
        let ns = Namespace::default();
        assert!(ns.is_nil());
        assert_eq!(ns.name(), "");
        assert_eq!(ns.to_string(), "");
        assert_eq!(ns.parse_key("air"), Err(KeyError::NilHandle));
        assert!(ns.get("air").is_none());
        assert_eq!(ns, Namespace::default());

        let key = Key::default();
        assert!(key.is_nil());
        assert_eq!(key.as_str(), "");
        assert_eq!(key.local(), "");
        assert_eq!(key.try_namespace(), Err(KeyError::NilHandle));
        assert_eq!(key, Key::default());
        assert_ne!(key, Registry::new().key("minecraft:air"));
    }

    #[test]
    #[should_panic(expected = "nil namespace handle")]
    fn test_nil_namespace_key_panics() {
        Namespace::default().key("air");
    }

    #[test]
    #[should_panic(expected = "nil key handle")]
    fn test_nil_key_namespace_panics() {
        Key::default().namespace();
    }

    #[test]
    fn test_serialize_as_canonical_string() {
        let registry = Registry::new();
        let key = registry.key("minecraft:air");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"minecraft:air\"");
        assert_eq!(
            serde_json::to_string(&key.namespace()).unwrap(),
            "\"minecraft\""
        );
        assert_eq!(serde_json::to_string(&Key::default()).unwrap(), "\"\"");
    }

    #[test]
    fn test_handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Namespace>();
        assert_send_sync::<Key>();
        assert_send_sync::<Registry>();
    }
}
