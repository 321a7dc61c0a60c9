//! Synthetic-IV deterministic AEAD
//!
//! The nonce is an HMAC over the associated data and plaintext, so equal
//! inputs always produce equal ciphertexts.
//!
//! # Ciphertext format
//!
//! ```text
//! output prefix ║ SIV (24 bytes) ║ XChaCha20-Poly1305(plaintext, ad) ║ tag (16 bytes)
//! ```

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use keyset_daead::{DaeadError, DeterministicAead};
use sha2::Sha256;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// Size of the synthetic IV, the `XChaCha20` nonce size
pub const SIV_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
const POLY1305_TAG_SIZE: usize = 16;

/// Label for deriving the SIV MAC key
const MAC_KEY_LABEL: &[u8] = b"keysetSivMacV1";

/// Label for deriving the encryption key
const ENC_KEY_LABEL: &[u8] = b"keysetSivEncV1";

/// Deterministic AEAD built from HMAC-SHA256 and `XChaCha20-Poly1305`.
pub struct SivDaead {
    mac_key: [u8; 32],
    enc_key: [u8; 32],
    output_prefix: Vec<u8>,
}

impl SivDaead {
    /// Create a primitive from 32 bytes of key material.
    ///
    /// `output_prefix` is prepended to every ciphertext and required on
    /// decryption.
    pub fn new(key_material: &[u8; 32], output_prefix: Vec<u8>) -> Self {
        let hkdf = Hkdf::<Sha256>::new(None, key_material);

        let mut mac_key = [0u8; 32];
        let Ok(()) = hkdf.expand(MAC_KEY_LABEL, &mut mac_key) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 output length");
        };

        let mut enc_key = [0u8; 32];
        let Ok(()) = hkdf.expand(ENC_KEY_LABEL, &mut enc_key) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 output length");
        };

        Self { mac_key, enc_key, output_prefix }
    }

    /// Output prefix stamped on ciphertexts.
    pub fn output_prefix(&self) -> &[u8] {
        &self.output_prefix
    }

    /// MAC over `len(ad) || ad || plaintext`.
    fn siv_mac(&self, plaintext: &[u8], associated_data: &[u8]) -> HmacSha256 {
        let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(&self.mac_key) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(&(associated_data.len() as u64).to_be_bytes());
        mac.update(associated_data);
        mac.update(plaintext);
        mac
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new((&self.enc_key).into())
    }
}

impl DeterministicAead for SivDaead {
    fn encrypt_deterministically(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, DaeadError> {
        let tag = self.siv_mac(plaintext, associated_data).finalize().into_bytes();
        let siv = &tag[..SIV_SIZE];

        let sealed = self
            .cipher()
            .encrypt(XNonce::from_slice(siv), Payload { msg: plaintext, aad: associated_data })
            .map_err(|_| DaeadError::EncryptionFailed {
                reason: "plaintext too large".to_string(),
            })?;

        let mut ciphertext = Vec::with_capacity(self.output_prefix.len() + SIV_SIZE + sealed.len());
        ciphertext.extend_from_slice(&self.output_prefix);
        ciphertext.extend_from_slice(siv);
        ciphertext.extend_from_slice(&sealed);
        Ok(ciphertext)
    }

    fn decrypt_deterministically(
        &self,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, DaeadError> {
        let body = ciphertext
            .strip_prefix(self.output_prefix.as_slice())
            .ok_or(DaeadError::DecryptionFailed)?;
        if body.len() < SIV_SIZE + POLY1305_TAG_SIZE {
            return Err(DaeadError::DecryptionFailed);
        }

        let (siv, sealed) = body.split_at(SIV_SIZE);
        let plaintext = self
            .cipher()
            .decrypt(XNonce::from_slice(siv), Payload { msg: sealed, aad: associated_data })
            .map_err(|_| DaeadError::DecryptionFailed)?;

        // The nonce must be the one this key derives for the plaintext
        self.siv_mac(&plaintext, associated_data)
            .verify_truncated_left(siv)
            .map_err(|_| DaeadError::DecryptionFailed)?;

        Ok(plaintext)
    }
}

impl Drop for SivDaead {
    fn drop(&mut self) {
        self.mac_key.zeroize();
        self.enc_key.zeroize();
    }
}
