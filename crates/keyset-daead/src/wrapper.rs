//! Keyset wrapper combining many deterministic AEAD primitives into one.
//!
//! Encryption always goes to the primary. Decryption shortlists candidates
//! by output prefix and trial-decrypts until one authenticates.

use keyset_core::{Entry, PrimitiveSet};

use crate::{error::DaeadError, primitive::DeterministicAead};

/// Primitive set of deterministic AEAD handles
pub type DaeadPrimitiveSet = PrimitiveSet<dyn DeterministicAead>;

type DaeadEntry = Entry<dyn DeterministicAead>;

/// A whole keyset presented as a single [`DeterministicAead`].
///
/// Owns its primitive set for its lifetime and never mutates it, so shared
/// references can be used from any number of threads without locking.
#[derive(Debug)]
pub struct DeterministicAeadSet {
    daead_set: DaeadPrimitiveSet,
}

impl DeterministicAeadSet {
    /// Wrap `daead_set`.
    ///
    /// # Errors
    ///
    /// - `InvalidConstruction`: if the set has no primary
    pub fn new(daead_set: DaeadPrimitiveSet) -> Result<Self, DaeadError> {
        let primary = daead_set.primary()?;

        tracing::debug!(
            entries = daead_set.len(),
            primary_key_id = primary.key_id(),
            "wrapped deterministic AEAD keyset"
        );

        Ok(Self { daead_set })
    }

    /// The wrapped primitive set.
    pub fn primitive_set(&self) -> &DaeadPrimitiveSet {
        &self.daead_set
    }
}

impl TryFrom<Option<DaeadPrimitiveSet>> for DeterministicAeadSet {
    type Error = DaeadError;

    /// Wrap a possibly absent set; absence is a construction error like a
    /// missing primary.
    fn try_from(daead_set: Option<DaeadPrimitiveSet>) -> Result<Self, Self::Error> {
        let Some(daead_set) = daead_set else {
            return Err(DaeadError::InvalidConstruction {
                reason: "primitive set is absent".to_string(),
            });
        };
        Self::new(daead_set)
    }
}

impl DeterministicAead for DeterministicAeadSet {
    /// Encrypt with the primary primitive. Its output and errors pass
    /// through unchanged.
    fn encrypt_deterministically(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, DaeadError> {
        let primary = self.daead_set.primary()?;
        primary.primitive().encrypt_deterministically(plaintext, associated_data)
    }

    /// Decrypt with the first candidate that authenticates `ciphertext`.
    ///
    /// Candidates, each given the full ciphertext:
    /// 1. entries whose prefix equals the leading bytes of `ciphertext`,
    ///    shortest prefix length first, insertion order within a prefix
    /// 2. raw entries, in insertion order
    ///
    /// # Errors
    ///
    /// - `DecryptionFailed`: if no candidate succeeds
    fn decrypt_deterministically(
        &self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, DaeadError> {
        for prefix_len in self.daead_set.prefix_lengths() {
            // Lengths ascend, so no longer prefix can fit either
            let Some(prefix) = ciphertext.get(..prefix_len) else {
                break;
            };

            let candidates = self.daead_set.get_primitives(prefix);
            if let Some(plaintext) =
                first_success(&candidates, ciphertext, associated_data)
            {
                return Ok(plaintext);
            }
        }

        let raw = self.daead_set.get_raw_primitives();
        if let Some(plaintext) = first_success(&raw, ciphertext, associated_data) {
            return Ok(plaintext);
        }

        Err(DaeadError::DecryptionFailed)
    }
}

/// Trial-decrypt with each candidate in order. Individual failures are
/// discarded.
fn first_success(
    candidates: &[&DaeadEntry],
    ciphertext: &[u8],
    associated_data: &[u8],
) -> Option<Vec<u8>> {
    candidates.iter().find_map(|entry| {
        entry.primitive().decrypt_deterministically(ciphertext, associated_data).ok()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use keyset_core::{KeyInfo, KeyStatus, OutputPrefixType};

    use super::*;

    /// Deterministic stand-in: `prefix || name || '|' || ad || '|' || plaintext`.
    struct FakeDaead {
        prefix: Vec<u8>,
        name: &'static str,
        encrypt_calls: AtomicUsize,
        decrypt_calls: AtomicUsize,
    }

    impl FakeDaead {
        fn new(name: &'static str, prefix: Vec<u8>) -> Arc<Self> {
            Arc::new(Self {
                prefix,
                name,
                encrypt_calls: AtomicUsize::new(0),
                decrypt_calls: AtomicUsize::new(0),
            })
        }

        fn header(&self, associated_data: &[u8]) -> Vec<u8> {
            let mut header = self.prefix.clone();
            header.extend_from_slice(self.name.as_bytes());
            header.push(b'|');
            header.extend_from_slice(associated_data);
            header.push(b'|');
            header
        }

        fn decrypt_calls(&self) -> usize {
            self.decrypt_calls.load(Ordering::SeqCst)
        }
    }

    impl DeterministicAead for FakeDaead {
        fn encrypt_deterministically(
            &self,
            plaintext: &[u8],
            associated_data: &[u8],
        ) -> Result<Vec<u8>, DaeadError> {
            self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
            let mut ciphertext = self.header(associated_data);
            ciphertext.extend_from_slice(plaintext);
            Ok(ciphertext)
        }

        fn decrypt_deterministically(
            &self,
            ciphertext: &[u8],
            associated_data: &[u8],
        ) -> Result<Vec<u8>, DaeadError> {
            self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
            ciphertext
                .strip_prefix(self.header(associated_data).as_slice())
                .map(<[u8]>::to_vec)
                .ok_or(DaeadError::DecryptionFailed)
        }
    }

    /// Accepts any ciphertext and reports a fixed plaintext.
    struct AcceptAll;

    impl DeterministicAead for AcceptAll {
        fn encrypt_deterministically(
            &self,
            plaintext: &[u8],
            _: &[u8],
        ) -> Result<Vec<u8>, DaeadError> {
            Ok(plaintext.to_vec())
        }

        fn decrypt_deterministically(&self, _: &[u8], _: &[u8]) -> Result<Vec<u8>, DaeadError> {
            Ok(b"accept-all".to_vec())
        }
    }

    /// Fails every call with a detailed reason.
    struct Broken;

    impl DeterministicAead for Broken {
        fn encrypt_deterministically(&self, _: &[u8], _: &[u8]) -> Result<Vec<u8>, DaeadError> {
            Err(DaeadError::EncryptionFailed { reason: "plaintext too large".to_string() })
        }

        fn decrypt_deterministically(&self, _: &[u8], _: &[u8]) -> Result<Vec<u8>, DaeadError> {
            Err(DaeadError::DecryptionFailed)
        }
    }

    fn add(
        set: &mut DaeadPrimitiveSet,
        primitive: Arc<dyn DeterministicAead>,
        key_id: u32,
        prefix: &[u8],
    ) {
        set.add_with_prefix(primitive, key_id, KeyStatus::Enabled, prefix).unwrap();
    }

    #[test]
    fn new_requires_primary() {
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, FakeDaead::new("k1", vec![0x01]), 1, &[0x01]);

        let result = DeterministicAeadSet::new(set);

        assert!(matches!(result, Err(DaeadError::InvalidConstruction { .. })));
    }

    #[test]
    fn absent_set_fails_like_missing_primary() {
        let absent = DeterministicAeadSet::try_from(None::<DaeadPrimitiveSet>);
        let no_primary = DeterministicAeadSet::try_from(Some(DaeadPrimitiveSet::new()));

        assert!(matches!(absent, Err(DaeadError::InvalidConstruction { .. })));
        assert!(matches!(no_primary, Err(DaeadError::InvalidConstruction { .. })));
    }

    #[test]
    fn encrypt_uses_only_primary() {
        let k1 = FakeDaead::new("k1", vec![0x01]);
        let k2 = FakeDaead::new("k2", vec![0x02]);
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, k1.clone(), 1, &[0x01]);
        add(&mut set, k2.clone(), 2, &[0x02]);
        set.set_primary(2).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let ciphertext = daead.encrypt_deterministically(b"hello", b"ctx").unwrap();

        assert_eq!(ciphertext, b"\x02k2|ctx|hello");
        assert_eq!(k1.encrypt_calls.load(Ordering::SeqCst), 0);
        assert_eq!(k2.encrypt_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn encrypt_error_passes_through() {
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, Arc::new(Broken), 1, &[0x01]);
        set.set_primary(1).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let result = daead.encrypt_deterministically(b"m", b"ad");

        assert_eq!(
            result,
            Err(DaeadError::EncryptionFailed { reason: "plaintext too large".to_string() })
        );
    }

    #[test]
    fn decrypt_non_primary_ciphertext() {
        let k1 = FakeDaead::new("k1", vec![0x01]);
        let k2 = FakeDaead::new("k2", vec![0x02]);
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, k1, 1, &[0x01]);
        add(&mut set, k2.clone(), 2, &[0x02]);
        set.set_primary(1).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let ciphertext = k2.encrypt_deterministically(b"world", b"ctx").unwrap();

        assert_eq!(daead.decrypt_deterministically(&ciphertext, b"ctx").unwrap(), b"world");
    }

    #[test]
    fn same_prefix_tried_in_insertion_order() {
        let first = FakeDaead::new("same", vec![0x07]);
        let second = FakeDaead::new("same", vec![0x07]);
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, first.clone(), 1, &[0x07]);
        add(&mut set, second.clone(), 2, &[0x07]);
        set.set_primary(1).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let ciphertext = daead.encrypt_deterministically(b"m", b"").unwrap();
        daead.decrypt_deterministically(&ciphertext, b"").unwrap();

        assert_eq!(first.decrypt_calls(), 1);
        assert_eq!(second.decrypt_calls(), 0);
    }

    #[test]
    fn colliding_prefix_falls_through_to_next_candidate() {
        let decoy = FakeDaead::new("decoy", vec![0x07]);
        let owner = FakeDaead::new("owner", vec![0x07]);
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, decoy.clone(), 1, &[0x07]);
        add(&mut set, owner.clone(), 2, &[0x07]);
        set.set_primary(1).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let ciphertext = owner.encrypt_deterministically(b"mine", b"ad").unwrap();

        assert_eq!(daead.decrypt_deterministically(&ciphertext, b"ad").unwrap(), b"mine");
        assert_eq!(decoy.decrypt_calls(), 1);
        assert_eq!(owner.decrypt_calls(), 1);
    }

    #[test]
    fn raw_keys_do_not_shadow_prefixed_keys() {
        let prefixed = FakeDaead::new("prefixed", vec![0x01]);
        let mut set = DaeadPrimitiveSet::new();
        // Raw key added first still runs after the prefixed group
        add(&mut set, Arc::new(AcceptAll), 1, &[]);
        add(&mut set, prefixed.clone(), 2, &[0x01]);
        set.set_primary(2).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let ciphertext = daead.encrypt_deterministically(b"payload", b"").unwrap();

        assert_eq!(daead.decrypt_deterministically(&ciphertext, b"").unwrap(), b"payload");
    }

    #[test]
    fn raw_key_fallback_after_prefixed_failure() {
        let raw = FakeDaead::new("raw", Vec::new());
        let prefixed = FakeDaead::new("prefixed", vec![0x01]);
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, prefixed.clone(), 1, &[0x01]);
        add(&mut set, raw.clone(), 2, &[]);
        set.set_primary(1).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let ciphertext = raw.encrypt_deterministically(b"legacy", b"ad").unwrap();

        assert_eq!(daead.decrypt_deterministically(&ciphertext, b"ad").unwrap(), b"legacy");
        assert_eq!(raw.decrypt_calls(), 1);
    }

    #[test]
    fn raw_key_gets_unmodified_ciphertext_with_matching_prefix() {
        // Raw output that happens to start with a registered prefix
        let raw = FakeDaead::new("\x01raw", Vec::new());
        let prefixed = FakeDaead::new("prefixed", vec![0x01]);
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, prefixed.clone(), 1, &[0x01]);
        add(&mut set, raw.clone(), 2, &[]);
        set.set_primary(2).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let ciphertext = daead.encrypt_deterministically(b"data", b"").unwrap();
        assert_eq!(ciphertext[0], 0x01);

        assert_eq!(daead.decrypt_deterministically(&ciphertext, b"").unwrap(), b"data");
        assert_eq!(prefixed.decrypt_calls(), 1);
    }

    #[test]
    fn multiple_prefix_lengths() {
        let short = FakeDaead::new("short", vec![0x02]);
        let tink = FakeDaead::new("tink", keyset_core::output_prefix(9, OutputPrefixType::Tink));
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, short.clone(), 1, &[0x02]);
        set.add_primitive(tink.clone(), &KeyInfo::enabled(9, OutputPrefixType::Tink)).unwrap();
        set.set_primary(1).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let ciphertext = tink.encrypt_deterministically(b"long", b"").unwrap();

        assert_eq!(daead.decrypt_deterministically(&ciphertext, b"").unwrap(), b"long");
        assert_eq!(short.decrypt_calls(), 0);
    }

    #[test]
    fn ciphertext_shorter_than_prefixes_only_tries_raw() {
        let raw = FakeDaead::new("", Vec::new());
        let tink = FakeDaead::new("tink", keyset_core::output_prefix(9, OutputPrefixType::Tink));
        let mut set = DaeadPrimitiveSet::new();
        set.add_primitive(tink.clone(), &KeyInfo::enabled(9, OutputPrefixType::Tink)).unwrap();
        add(&mut set, raw.clone(), 2, &[]);
        set.set_primary(9).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        assert_eq!(daead.decrypt_deterministically(b"||", b"").unwrap(), b"");
        assert_eq!(tink.decrypt_calls(), 0);
        assert_eq!(raw.decrypt_calls(), 1);
    }

    #[test]
    fn total_failure_hides_candidate_errors() {
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, Arc::new(Broken), 42, &[0x01]);
        add(&mut set, Arc::new(Broken), 43, &[]);
        set.set_primary(42).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        let result = daead.decrypt_deterministically(b"\x01garbage", b"ad");

        assert_eq!(result, Err(DaeadError::DecryptionFailed));
    }

    #[test]
    fn unknown_prefix_without_raw_keys_fails() {
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, FakeDaead::new("k1", vec![0x01]), 1, &[0x01]);
        set.set_primary(1).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        assert_eq!(
            daead.decrypt_deterministically(b"\x09k1||", b""),
            Err(DaeadError::DecryptionFailed)
        );
        assert_eq!(daead.decrypt_deterministically(b"", b""), Err(DaeadError::DecryptionFailed));
    }

    #[test]
    fn wrapper_exposes_owned_set() {
        let mut set = DaeadPrimitiveSet::new();
        add(&mut set, FakeDaead::new("k1", vec![0x01]), 1, &[0x01]);
        set.set_primary(1).unwrap();
        let daead = DeterministicAeadSet::new(set).unwrap();

        assert_eq!(daead.primitive_set().len(), 1);
        assert_eq!(daead.primitive_set().primary().unwrap().key_id(), 1);
    }

    #[test]
    fn wrapper_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeterministicAeadSet>();
    }
}
