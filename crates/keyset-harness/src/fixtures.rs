//! Keyset fixtures with deterministic key material.

use std::sync::Arc;

use hkdf::Hkdf;
use keyset_core::{KeyId, KeyInfo, KeyStatus, OutputPrefixType};
use keyset_daead::{DaeadError, DaeadPrimitiveSet, DeterministicAead, DeterministicAeadSet};
use sha2::Sha256;

use crate::siv::SivDaead;

/// Label used for test key material derivation
const TEST_KEY_LABEL: &[u8] = b"keysetHarnessKeyV1";

/// A key and its primitive, ready to be placed into a set.
#[derive(Clone)]
pub struct TestKey {
    /// Key id
    pub key_id: KeyId,
    /// Prefix format, or `None` for a custom prefix
    pub output_prefix_type: Option<OutputPrefixType>,
    /// The primitive; holds the same prefix the set will index
    pub primitive: Arc<SivDaead>,
}

impl TestKey {
    /// Key whose prefix follows `prefix_type`.
    pub fn with_type(key_id: KeyId, prefix_type: OutputPrefixType) -> Self {
        let prefix = keyset_core::output_prefix(key_id, prefix_type);
        Self {
            key_id,
            output_prefix_type: Some(prefix_type),
            primitive: Arc::new(SivDaead::new(&key_material(key_id, &prefix), prefix)),
        }
    }

    /// `0x01 || key_id` prefixed key.
    pub fn tink(key_id: KeyId) -> Self {
        Self::with_type(key_id, OutputPrefixType::Tink)
    }

    /// `0x00 || key_id` prefixed key.
    pub fn legacy(key_id: KeyId) -> Self {
        Self::with_type(key_id, OutputPrefixType::Legacy)
    }

    /// Unprefixed key.
    pub fn raw(key_id: KeyId) -> Self {
        Self::with_type(key_id, OutputPrefixType::Raw)
    }

    /// Key with an arbitrary prefix.
    pub fn custom(key_id: KeyId, prefix: impl Into<Vec<u8>>) -> Self {
        let prefix = prefix.into();
        Self {
            key_id,
            output_prefix_type: None,
            primitive: Arc::new(SivDaead::new(&key_material(key_id, &prefix), prefix)),
        }
    }

    /// Encrypt directly with this key, bypassing any wrapper.
    pub fn encrypt(&self, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>, DaeadError> {
        self.primitive.encrypt_deterministically(plaintext, associated_data)
    }

    fn add_to(&self, set: &mut DaeadPrimitiveSet) -> Result<(), DaeadError> {
        let primitive: Arc<dyn DeterministicAead> = self.primitive.clone();
        match self.output_prefix_type {
            Some(output_prefix_type) => {
                let info = KeyInfo::enabled(self.key_id, output_prefix_type);
                set.add_primitive(primitive, &info)?;
            },
            None => {
                let prefix = self.primitive.output_prefix().to_vec();
                set.add_with_prefix(primitive, self.key_id, KeyStatus::Enabled, prefix)?;
            },
        }
        Ok(())
    }
}

/// Key material unique per (`key_id`, prefix).
fn key_material(key_id: KeyId, prefix: &[u8]) -> [u8; 32] {
    let hkdf = Hkdf::<Sha256>::new(None, &key_id.to_be_bytes());

    let mut info = Vec::with_capacity(TEST_KEY_LABEL.len() + prefix.len());
    info.extend_from_slice(TEST_KEY_LABEL);
    info.extend_from_slice(prefix);

    let mut material = [0u8; 32];
    let Ok(()) = hkdf.expand(&info, &mut material) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };
    material
}

/// Builds primitive sets and wrappers from [`TestKey`]s.
#[derive(Default)]
pub struct KeysetBuilder {
    keys: Vec<TestKey>,
    primary: Option<KeyId>,
}

impl KeysetBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key; keys enter the set in call order.
    #[must_use]
    pub fn key(mut self, key: &TestKey) -> Self {
        self.keys.push(key.clone());
        self
    }

    /// Designate the primary key.
    #[must_use]
    pub fn primary(mut self, key_id: KeyId) -> Self {
        self.primary = Some(key_id);
        self
    }

    /// Build the primitive set.
    pub fn build_set(&self) -> Result<DaeadPrimitiveSet, DaeadError> {
        let mut set = DaeadPrimitiveSet::new();
        for key in &self.keys {
            key.add_to(&mut set)?;
        }
        if let Some(key_id) = self.primary {
            set.set_primary(key_id)?;
        }
        Ok(set)
    }

    /// Build the set and wrap it.
    pub fn build(&self) -> Result<DeterministicAeadSet, DaeadError> {
        DeterministicAeadSet::new(self.build_set()?)
    }
}

/// Deterministic AEAD that fails every call.
///
/// Encryption reports `reason`; decryption reports `DecryptionFailed`.
pub struct FailingDaead {
    reason: String,
}

impl FailingDaead {
    /// Fail every call with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl DeterministicAead for FailingDaead {
    fn encrypt_deterministically(&self, _: &[u8], _: &[u8]) -> Result<Vec<u8>, DaeadError> {
        Err(DaeadError::EncryptionFailed { reason: self.reason.clone() })
    }

    fn decrypt_deterministically(&self, _: &[u8], _: &[u8]) -> Result<Vec<u8>, DaeadError> {
        Err(DaeadError::DecryptionFailed)
    }
}
