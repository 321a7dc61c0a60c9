//! Error types for deterministic AEAD operations

use keyset_core::PrimitiveSetError;
use thiserror::Error;

/// Errors from deterministic AEAD primitives and the keyset wrapper
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DaeadError {
    /// The keyset handed to the wrapper is unusable (absent or no primary)
    #[error("invalid construction: {reason}")]
    InvalidConstruction {
        /// Why construction was rejected
        reason: String,
    },

    /// A primitive could not encrypt (size limit, encoding failure)
    #[error("encryption failed: {reason}")]
    EncryptionFailed {
        /// Reason reported by the primitive
        reason: String,
    },

    /// No key could authenticate the ciphertext
    ///
    /// Deliberately carries no detail about which keys were tried.
    #[error("decryption failed")]
    DecryptionFailed,
}

impl From<PrimitiveSetError> for DaeadError {
    fn from(err: PrimitiveSetError) -> Self {
        Self::InvalidConstruction { reason: err.to_string() }
    }
}
