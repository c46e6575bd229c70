//! Parsing and normalization of namespaced keys.
//!
//! The grammar accepts `namespace:key` pairs over a restricted ASCII
//! charset: `[a-z0-9_-]` for the namespace and `[a-z0-9_/.-]` for the key.
//! Parsing runs in a single left-to-right pass. The fast path borrows the
//! input unchanged; the first character that needs rewriting (case folding,
//! or replacement under the lenient policy) switches to a rebuild buffer.

use std::borrow::Cow;

use crate::errors::{InvalidCharKind, KeyError, Result};

/// Maximum length in bytes of a raw input, namespace, or key.
pub const MAX_LENGTH: usize = 200;

/// Namespace substituted when a key is parsed without an explicit
/// namespace.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Character separating the namespace from the key.
pub const SEPARATOR: char = ':';

/// Parsing policy: reject invalid input, or sanitize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Policy {
    /// Fail with [`KeyError::InvalidChar`] at the first invalid character.
    Strict,
    /// Replace every invalid character with '_' instead of failing.
    Lenient,
}

/// Grammar shape the input is parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// `namespace:key`, or a bare key resolved into the default namespace.
    Full,
    /// A key fragment; a ':' separator is not permitted.
    BareKey,
    /// A namespace; ':' and path characters are not permitted.
    NamespaceOnly,
}

/// Parses `raw` into a normalized `(namespace, key)` pair.
///
/// Under [`Shape::NamespaceOnly`] the key half is always empty; under the
/// other shapes the namespace half falls back to [`DEFAULT_NAMESPACE`]
/// when the input contains no separator.
pub(crate) fn parse(
    raw: &str,
    policy: Policy,
    shape: Shape,
) -> Result<(Cow<'_, str>, Cow<'_, str>)> {
    if raw.is_empty() {
        // A namespace-only parse of the empty string falls back to the
        // default namespace.
        return if shape == Shape::NamespaceOnly {
            Ok((Cow::Borrowed(DEFAULT_NAMESPACE), Cow::Borrowed("")))
        } else {
            Err(KeyError::Empty)
        };
    }
    if raw.len() > MAX_LENGTH {
        return Err(KeyError::TooLong { len: raw.len() });
    }
    if raw.as_bytes()[raw.len() - 1] == b':' {
        return Err(KeyError::TrailingSeparator);
    }

    let ns_only = shape == Shape::NamespaceOnly;
    // While `bare` is set no separator may be fixed. Full-shape input
    // downgrades to bare when a '/' or '.' appears with no ':' anywhere
    // ahead of it, and the downgrade is sticky for the rest of the scan.
    let mut bare = shape != Shape::Full;
    let mut sep: Option<usize> = None;
    // Rebuild buffer, allocated at the first character that differs from
    // the input. `sep` always refers to a position in the output, which
    // only matches the input byte offset while `out` is unallocated.
    let mut out: Option<String> = None;

    for (i, ch) in raw.char_indices() {
        let verdict = match ch {
            'a'..='z' | '0'..='9' | '_' | '-' => Ok(ch),
            'A'..='Z' => Ok(ch.to_ascii_lowercase()),
            ':' => {
                if bare {
                    Err(InvalidCharKind::SeparatorNotAllowed)
                } else if sep.is_some() {
                    Err(InvalidCharKind::DoubledSeparator)
                } else {
                    Ok(':')
                }
            }
            '/' | '.' => {
                if sep.is_some() || (bare && !ns_only) {
                    Ok(ch)
                } else if !bare && !raw.as_bytes()[i..].contains(&b':') {
                    // No separator anywhere ahead: the whole input is a
                    // bare key, so path characters are legal from here on.
                    bare = true;
                    Ok(ch)
                } else {
                    Err(InvalidCharKind::PathInNamespace)
                }
            }
            _ => Err(InvalidCharKind::Unrecognized),
        };

        match verdict {
            Ok(c) => {
                if c == ':' {
                    sep = Some(out.as_ref().map_or(i, String::len));
                }
                match &mut out {
                    Some(buf) => buf.push(c),
                    None if c != ch => {
                        // Case folding forces a rebuild of the remainder.
                        let mut buf = String::with_capacity(raw.len());
                        buf.push_str(&raw[..i]);
                        buf.push(c);
                        out = Some(buf);
                    }
                    None => {}
                }
            }
            Err(kind) => {
                if policy == Policy::Strict {
                    return Err(KeyError::InvalidChar { ch, index: i, kind });
                }
                let buf = out.get_or_insert_with(|| {
                    let mut buf = String::with_capacity(raw.len());
                    buf.push_str(&raw[..i]);
                    buf
                });
                buf.push('_');
            }
        }
    }

    let normalized = match out {
        Some(buf) => Cow::Owned(buf),
        None => Cow::Borrowed(raw),
    };

    Ok(match sep {
        // A leading ':' leaves an empty namespace prefix, which resolves
        // to the default namespace like a bare key does.
        Some(0) => (Cow::Borrowed(DEFAULT_NAMESPACE), slice_from(normalized, 1)),
        Some(p) => split_at_separator(normalized, p),
        None if ns_only => (normalized, Cow::Borrowed("")),
        None => (Cow::Borrowed(DEFAULT_NAMESPACE), normalized),
    })
}

fn slice_from(s: Cow<'_, str>, start: usize) -> Cow<'_, str> {
    match s {
        Cow::Borrowed(s) => Cow::Borrowed(&s[start..]),
        Cow::Owned(mut s) => {
            s.drain(..start);
            Cow::Owned(s)
        }
    }
}

fn split_at_separator(s: Cow<'_, str>, sep: usize) -> (Cow<'_, str>, Cow<'_, str>) {
    // An empty key suffix would require a trailing ':', which the
    // precondition checks already rejected.
    debug_assert!(sep + 1 < s.len());
    match s {
        Cow::Borrowed(s) => (Cow::Borrowed(&s[..sep]), Cow::Borrowed(&s[sep + 1..])),
        Cow::Owned(mut s) => {
            let key = s.split_off(sep + 1);
            s.truncate(sep);
            (Cow::Owned(s), Cow::Owned(key))
        }
    }
}

/// Returns whether `s` is a canonical namespace: `[a-z0-9_-]`, 1–200 bytes.
pub fn is_valid_namespace(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_LENGTH
        && s.bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-'))
}

/// Returns whether `s` is a canonical key: `[a-z0-9_/.-]`, 1–200 bytes.
pub fn is_valid_key(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_LENGTH
        && s.bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'/' | b'.'))
}
