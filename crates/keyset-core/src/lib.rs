//! Keyset Core
//!
//! Key metadata and the prefix-indexed [`PrimitiveSet`] that keyset-aware
//! wrappers dispatch over. Nothing here performs cryptography: a set only
//! records which primitive belongs to which key, which output prefix that
//! key stamps on its ciphertexts, and which key is primary.
//!
//! # Output Prefixes
//!
//! ```text
//! Tink     0x01 ║ key_id (u32 BE) ║ primitive output
//! Legacy   0x00 ║ key_id (u32 BE) ║ primitive output
//! Crunchy  0x00 ║ key_id (u32 BE) ║ primitive output
//! Raw                             ║ primitive output
//! ```
//!
//! A prefix narrows the candidates for decryption. It is not bound to the
//! key cryptographically: raw keys all share the empty prefix and key ids
//! may collide across formats. Wrappers must treat a prefix hit as a
//! shortlist and accept a ciphertext only after a primitive has
//! authenticated it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod format;
pub mod primitive_set;

pub use error::PrimitiveSetError;
pub use format::{KeyId, KeyInfo, KeyStatus, OutputPrefixType, output_prefix};
pub use primitive_set::{Entry, PrimitiveSet};
