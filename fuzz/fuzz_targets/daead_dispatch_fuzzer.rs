//! Fuzz target for keyset dispatch of deterministic AEAD
//!
//! Builds keysets of mixed prefix formats and drives the wrapper with
//! adversarial ciphertexts.
//!
//! # Strategy
//!
//! - Keysets mixing Tink, Legacy, Raw and one-byte custom prefixes
//! - Colliding key ids and prefixes across formats
//! - Arbitrary primary choice
//! - Wrapper encrypt, direct per-key encrypt, bit flips and raw garbage
//!
//! # Invariants
//!
//! - Construction fails only when the primary id is ambiguous
//! - Encryption output equals the primary key's own output
//! - Every key's ciphertext decrypts through the wrapper
//! - Corrupted ciphertext and garbage never decrypt
//! - Decryption failures are always the detail-free error

#![no_main]

use arbitrary::Arbitrary;
use keyset_daead::{DaeadError, DeterministicAead};
use keyset_harness::{KeysetBuilder, TestKey};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct DispatchScenario {
    /// Keys in insertion order
    keys: Vec<KeySpec>,
    /// Index into `keys` of the primary
    primary: u8,
    /// Operations to perform
    operations: Vec<Operation>,
}

#[derive(Debug, Clone, Arbitrary)]
enum KeySpec {
    Tink(u8),
    Legacy(u8),
    Raw(u8),
    Custom { key_id: u8, prefix: u8 },
}

impl KeySpec {
    fn to_key(&self) -> TestKey {
        match *self {
            KeySpec::Tink(key_id) => TestKey::tink(key_id.into()),
            KeySpec::Legacy(key_id) => TestKey::legacy(key_id.into()),
            KeySpec::Raw(key_id) => TestKey::raw(key_id.into()),
            KeySpec::Custom { key_id, prefix } => TestKey::custom(key_id.into(), [prefix]),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Operation {
    /// Encrypt through the wrapper and decrypt back
    Encrypt { plaintext: Vec<u8>, associated_data: Vec<u8> },
    /// Encrypt with one key directly, decrypt through the wrapper
    ForeignKey { key: u8, plaintext: Vec<u8> },
    /// Flip one bit of a valid ciphertext
    Corrupt { plaintext: Vec<u8>, position: u16, bit: u8 },
    /// Decrypt arbitrary bytes
    Garbage { ciphertext: Vec<u8> },
}

fuzz_target!(|scenario: DispatchScenario| {
    let keys: Vec<TestKey> = scenario.keys.iter().take(8).map(KeySpec::to_key).collect();
    if keys.is_empty() {
        return;
    }

    let primary = &keys[scenario.primary as usize % keys.len()];
    let builder = keys.iter().fold(KeysetBuilder::new(), |builder, key| builder.key(key));

    // INVARIANT 1: Construction fails only when the primary id is ambiguous
    let daead = match builder.primary(primary.key_id).build() {
        Ok(daead) => daead,
        Err(err) => {
            let duplicates = keys.iter().filter(|key| key.key_id == primary.key_id).count();
            assert!(duplicates > 1, "unexpected construction failure: {err}");
            assert!(matches!(err, DaeadError::InvalidConstruction { .. }));
            return;
        },
    };

    for op in scenario.operations.into_iter().take(32) {
        match op {
            Operation::Encrypt { plaintext, associated_data } => {
                // INVARIANT 2: Output comes from the primary
                let ciphertext =
                    daead.encrypt_deterministically(&plaintext, &associated_data).unwrap();
                assert_eq!(ciphertext, primary.encrypt(&plaintext, &associated_data).unwrap());

                // INVARIANT 3: Round-trip
                let decrypted = daead.decrypt_deterministically(&ciphertext, &associated_data);
                assert_eq!(decrypted.unwrap(), plaintext, "roundtrip must succeed");
            },

            Operation::ForeignKey { key, plaintext } => {
                let producer = &keys[key as usize % keys.len()];
                let ciphertext = producer.encrypt(&plaintext, b"").unwrap();

                // INVARIANT 4: Ciphertext of any key in the set decrypts
                let decrypted = daead.decrypt_deterministically(&ciphertext, b"");
                assert_eq!(decrypted.unwrap(), plaintext, "foreign key ciphertext must decrypt");
            },

            Operation::Corrupt { plaintext, position, bit } => {
                let mut ciphertext = daead.encrypt_deterministically(&plaintext, b"").unwrap();
                let position = position as usize % ciphertext.len();
                ciphertext[position] ^= 1 << (bit % 8);

                // INVARIANT 5: Corruption is always detected
                let result = daead.decrypt_deterministically(&ciphertext, b"");
                assert_eq!(result, Err(DaeadError::DecryptionFailed));
            },

            Operation::Garbage { ciphertext } => {
                // INVARIANT 6: Garbage never decrypts and never leaks detail
                let result = daead.decrypt_deterministically(&ciphertext, b"");
                assert_eq!(result, Err(DaeadError::DecryptionFailed));
            },
        }
    }
});
