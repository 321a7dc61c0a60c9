//! Keyset-aware Deterministic AEAD
//!
//! Presents a whole keyset of deterministic AEAD primitives as a single
//! [`DeterministicAead`]. Keys can be added, rotated to primary, or retired
//! without invalidating ciphertexts produced under earlier primaries.
//!
//! # Dispatch
//!
//! ```text
//! encrypt(m, ad) ──► primary primitive ──► prefix ║ ciphertext
//!
//! decrypt(c, ad)
//!        │
//!        ▼ c[..len] for each prefix length in the set
//! prefixed candidates (insertion order) ──► first success wins
//!        │ all failed
//!        ▼
//! raw candidates (insertion order, full c) ──► first success wins
//!        │ all failed
//!        ▼
//! DecryptionFailed
//! ```
//!
//! # Security
//!
//! - A prefix match only shortlists candidates; a ciphertext is accepted
//!   only after a primitive authenticates it
//! - Raw keys are tried last so the empty prefix never shadows a prefixed key
//! - Total failure is a single detail-free error: callers cannot learn which
//!   keys were tried or why each failed

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod primitive;
pub mod wrapper;

pub use error::DaeadError;
pub use primitive::DeterministicAead;
pub use wrapper::{DaeadPrimitiveSet, DeterministicAeadSet};
