//! Error types for primitive set operations

use thiserror::Error;

use crate::format::{KeyId, KeyStatus};

/// Errors from building or querying a [`crate::PrimitiveSet`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveSetError {
    /// No primary entry was designated
    #[error("primitive set has no primary")]
    NoPrimary,

    /// No entry carries the requested key id
    #[error("unknown key: {key_id}")]
    UnknownKey {
        /// The key id that was not found
        key_id: KeyId,
    },

    /// Several entries carry the key id requested as primary
    #[error("ambiguous key: {count} entries have key id {key_id}")]
    AmbiguousKey {
        /// The duplicated key id
        key_id: KeyId,
        /// Number of entries with that id
        count: usize,
    },

    /// Only enabled keys may enter a primitive set
    #[error("key {key_id} is {status}, expected enabled")]
    KeyNotEnabled {
        /// The rejected key id
        key_id: KeyId,
        /// Its status
        status: KeyStatus,
    },
}
