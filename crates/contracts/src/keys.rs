//! Key scheme: how new entity ids are minted.
//!
//! An id is a composite key over the entity namespace, zero or more
//! disambiguating parts, and a time-ordered unique suffix:
//!
//! ```text
//! device:       \0device\0<sha256(hostname)>\0<suffix>\0
//! requirements: \0requirements\0<asset_id>\0<suffix>\0
//! ```
//!
//! [`key_prefix`] over the same namespace and parts is a strict prefix of every
//! minted id, which is what prefix-scoped listing relies on.

use std::sync::Mutex;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use chainmetric_ledger::{LedgerError, StateStore, create_composite_key};

/// Source of unique, time-ordered key suffixes.
pub trait SuffixGenerator: Send + Sync {
    fn next_suffix(&self) -> String;
}

/// UUIDv7-based suffixes, strictly increasing within the process.
///
/// Two calls in the same millisecond still yield distinct, ordered suffixes.
#[derive(Debug, Default)]
pub struct TimeOrderedSuffix {
    last: Mutex<u128>,
}

impl TimeOrderedSuffix {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SuffixGenerator for TimeOrderedSuffix {
    fn next_suffix(&self) -> String {
        let candidate = Uuid::now_v7().as_u128();
        let next = match self.last.lock() {
            Ok(mut last) => {
                let next = if candidate > *last { candidate } else { *last + 1 };
                *last = next;
                next
            }
            // Poisoned: fall back to the raw v7 value.
            Err(_) => candidate,
        };
        Uuid::from_u128(next).simple().to_string()
    }
}

/// Composes a full key from namespace, parts and suffix.
pub fn make_key(namespace: &str, parts: &[&str], suffix: &str) -> Result<String, LedgerError> {
    create_composite_key(namespace, &components(parts, suffix))
}

/// Key components in order: the disambiguating parts, then the suffix.
fn components<'a>(parts: &[&'a str], suffix: &'a str) -> Vec<&'a str> {
    let mut components = Vec::with_capacity(parts.len() + 1);
    components.extend_from_slice(parts);
    components.push(suffix);
    components
}

/// Shared prefix of every key [`make_key`] builds over `namespace` and `parts`.
pub fn key_prefix(namespace: &str, parts: &[&str]) -> Result<String, LedgerError> {
    create_composite_key(namespace, parts)
}

/// Lowercase hex SHA-256, used to keep raw hostnames out of keys.
pub fn hash(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Mints entity ids through the ledger's composite-key capability.
#[derive(Debug, Default)]
pub struct KeyScheme<G = TimeOrderedSuffix> {
    suffixes: G,
}

impl<G> KeyScheme<G> {
    pub fn new(suffixes: G) -> Self {
        Self { suffixes }
    }
}

impl<G: SuffixGenerator> KeyScheme<G> {
    /// Builds a fresh id; identical `parts` never produce the same id twice.
    pub fn mint<S>(&self, store: &S, namespace: &str, parts: &[&str]) -> Result<String, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        let suffix = self.suffixes.next_suffix();
        store.create_composite_key(namespace, &components(parts, &suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmetric_ledger::InMemoryLedger;
    use proptest::prelude::*;

    #[test]
    fn successive_suffixes_are_strictly_increasing() {
        let suffixes = TimeOrderedSuffix::new();
        let batch: Vec<String> = (0..1000).map(|_| suffixes.next_suffix()).collect();

        for pair in batch.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn minted_ids_for_same_parts_never_collide() {
        let ledger = InMemoryLedger::new();
        let keys = KeyScheme::<TimeOrderedSuffix>::default();

        let a = keys.mint(&ledger, "requirements", &["A1"]).unwrap();
        let b = keys.mint(&ledger, "requirements", &["A1"]).unwrap();

        assert_ne!(a, b);
        let prefix = key_prefix("requirements", &["A1"]).unwrap();
        assert!(a.starts_with(&prefix));
        assert!(b.starts_with(&prefix));
    }

    struct FixedSuffix(&'static str);

    impl SuffixGenerator for FixedSuffix {
        fn next_suffix(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn mint_builds_the_same_key_as_make_key() {
        let ledger = InMemoryLedger::new();
        let keys = KeyScheme::new(FixedSuffix("0190f3a2c4"));

        let minted = keys.mint(&ledger, "device", &["abc123"]).unwrap();

        assert_eq!(minted, make_key("device", &["abc123"], "0190f3a2c4").unwrap());
        assert_eq!(minted, "\u{0}device\u{0}abc123\u{0}0190f3a2c4\u{0}");
    }

    #[test]
    fn hash_is_stable_hex() {
        let digest = hash("probe-01.local");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash("probe-01.local"));
        assert_ne!(digest, hash("probe-02.local"));
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    proptest! {
        /// Property: make_key(N, P, s) always starts with key_prefix(N, P).
        #[test]
        fn make_key_starts_with_prefix(
            namespace in "[a-z]{1,12}",
            parts in proptest::collection::vec("[A-Za-z0-9]{0,10}", 0..3),
        ) {
            let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
            let suffix = TimeOrderedSuffix::new().next_suffix();

            let key = make_key(&namespace, &parts, &suffix).unwrap();
            let prefix = key_prefix(&namespace, &parts).unwrap();

            prop_assert!(key.starts_with(&prefix));
            prop_assert_ne!(key, prefix);
        }

        /// Property: prefixes differ across distinct namespaces or parts.
        #[test]
        fn prefixes_differ_for_distinct_inputs(
            a in ("[a-z]{1,6}", "[A-Z0-9]{0,6}"),
            b in ("[a-z]{1,6}", "[A-Z0-9]{0,6}"),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(
                key_prefix(&a.0, &[a.1.as_str()]).unwrap(),
                key_prefix(&b.0, &[b.1.as_str()]).unwrap()
            );
        }
    }
}
