//! Test harness for keyset-aware primitives.
//!
//! Supplies real deterministic AEAD primitives so that wrapper tests run
//! against actual authenticated encryption instead of mocks:
//!
//! - [`SivDaead`]: synthetic-IV deterministic AEAD over HMAC-SHA256 and
//!   `XChaCha20-Poly1305`, stamping its output prefix on every ciphertext
//! - [`FailingDaead`]: fails every call
//! - [`TestKey`] and [`KeysetBuilder`]: keyset fixtures with deterministic
//!   key material
//!
//! Not for production use. Key material is derived from public key ids.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod siv;

pub use fixtures::{FailingDaead, KeysetBuilder, TestKey};
pub use siv::{SIV_SIZE, SivDaead};
