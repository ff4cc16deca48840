//! Composite key encoding.
//!
//! A composite key is `U+0000 namespace U+0000 (part U+0000)*`. Because every
//! component is terminated by the delimiter, the key built from a namespace
//! and a leading subset of its parts is a strict prefix of every key that
//! extends those parts, and of no other key.

use crate::error::LedgerError;

/// Delimiter and leading marker of every composite key.
pub const COMPOSITE_DELIMITER: char = '\u{0}';

/// Largest code point; appended to a prefix to form an exclusive range end.
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

/// Builds a composite key from a namespace and ordered parts.
///
/// With a leading subset of parts the result is the range prefix shared by
/// every full key over those parts.
pub fn create_composite_key(namespace: &str, parts: &[&str]) -> Result<String, LedgerError> {
    if namespace.is_empty() {
        return Err(LedgerError::InvalidKey("namespace must not be empty".to_string()));
    }
    validate_component(namespace)?;

    let capacity = 2 + namespace.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>();
    let mut key = String::with_capacity(capacity);
    key.push(COMPOSITE_DELIMITER);
    key.push_str(namespace);
    key.push(COMPOSITE_DELIMITER);

    for part in parts {
        validate_component(part)?;
        key.push_str(part);
        key.push(COMPOSITE_DELIMITER);
    }

    Ok(key)
}

fn validate_component(component: &str) -> Result<(), LedgerError> {
    if component.contains(COMPOSITE_DELIMITER) || component.contains(MAX_UNICODE_RUNE) {
        return Err(LedgerError::InvalidKey(format!(
            "component {component:?} contains a reserved code point"
        )));
    }
    Ok(())
}
