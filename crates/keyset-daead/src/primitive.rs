//! The deterministic AEAD primitive interface

use crate::error::DaeadError;

/// Deterministic authenticated encryption with associated data.
///
/// The ciphertext is a pure function of key, plaintext and associated data,
/// so equal inputs always produce equal outputs. Implementations stamp their
/// own output prefix, if any, on the ciphertext.
///
/// Implementations must be safe to call concurrently from several threads.
pub trait DeterministicAead: Send + Sync {
    /// Encrypt `plaintext`, binding it to `associated_data`.
    fn encrypt_deterministically(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, DaeadError>;

    /// Decrypt and authenticate `ciphertext` against `associated_data`.
    fn decrypt_deterministically(
        &self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, DaeadError>;
}
