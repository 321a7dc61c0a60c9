//! Key metadata and output-prefix format
//!
//! All functions are pure. The prefix of a key is a function of its id and
//! its [`OutputPrefixType`] only.

use std::fmt;

/// Identifier of a key within a keyset
pub type KeyId = u32;

/// Size of a non-raw output prefix: one start byte plus a 4-byte key id
pub const NON_RAW_PREFIX_SIZE: usize = 5;

/// Size of a raw output prefix
pub const RAW_PREFIX_SIZE: usize = 0;

/// Start byte of `Tink` prefixes
pub const TINK_START_BYTE: u8 = 0x01;

/// Start byte of `Legacy` and `Crunchy` prefixes
pub const LEGACY_START_BYTE: u8 = 0x00;

/// How a key marks the ciphertexts it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputPrefixType {
    /// `0x01 || key_id`
    Tink,
    /// `0x00 || key_id`
    Legacy,
    /// `0x00 || key_id`, kept distinct from `Legacy` for key-format bookkeeping
    Crunchy,
    /// No prefix
    Raw,
}

impl OutputPrefixType {
    /// Prefix length produced by this type.
    pub fn prefix_size(self) -> usize {
        match self {
            Self::Tink | Self::Legacy | Self::Crunchy => NON_RAW_PREFIX_SIZE,
            Self::Raw => RAW_PREFIX_SIZE,
        }
    }
}

/// Lifecycle status of a key within its keyset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStatus {
    /// Usable for encryption (if primary) and decryption
    Enabled,
    /// Kept in the keyset but must not be used
    Disabled,
    /// Key material has been deleted
    Destroyed,
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Metadata of one keyset entry, as handed over by the keyset layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    /// Key id, unique among the primary candidates of a keyset
    pub key_id: KeyId,
    /// Lifecycle status
    pub status: KeyStatus,
    /// Prefix format of this key's output
    pub output_prefix_type: OutputPrefixType,
}

impl KeyInfo {
    /// Metadata for an enabled key.
    pub fn enabled(key_id: KeyId, output_prefix_type: OutputPrefixType) -> Self {
        Self { key_id, status: KeyStatus::Enabled, output_prefix_type }
    }

    /// Output prefix this key stamps on its ciphertexts.
    pub fn output_prefix(&self) -> Vec<u8> {
        output_prefix(self.key_id, self.output_prefix_type)
    }
}

/// Compute the output prefix for a key.
///
/// Structure for non-raw types:
/// - byte 0: start byte ([`TINK_START_BYTE`] or [`LEGACY_START_BYTE`])
/// - bytes 1-4: `key_id` (big-endian)
pub fn output_prefix(key_id: KeyId, prefix_type: OutputPrefixType) -> Vec<u8> {
    let start_byte = match prefix_type {
        OutputPrefixType::Tink => TINK_START_BYTE,
        OutputPrefixType::Legacy | OutputPrefixType::Crunchy => LEGACY_START_BYTE,
        OutputPrefixType::Raw => return Vec::new(),
    };

    let mut prefix = Vec::with_capacity(NON_RAW_PREFIX_SIZE);
    prefix.push(start_byte);
    prefix.extend_from_slice(&key_id.to_be_bytes());
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tink_prefix_structure() {
        let prefix = output_prefix(0x0102_0304, OutputPrefixType::Tink);
        assert_eq!(prefix, [0x01, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn legacy_and_crunchy_share_start_byte() {
        let legacy = output_prefix(42, OutputPrefixType::Legacy);
        let crunchy = output_prefix(42, OutputPrefixType::Crunchy);

        assert_eq!(legacy, crunchy);
        assert_eq!(legacy[0], LEGACY_START_BYTE);
        assert_eq!(&legacy[1..], &42u32.to_be_bytes());
    }

    #[test]
    fn raw_prefix_is_empty() {
        assert!(output_prefix(7, OutputPrefixType::Raw).is_empty());
    }

    #[test]
    fn prefix_size_matches_output() {
        for prefix_type in [
            OutputPrefixType::Tink,
            OutputPrefixType::Legacy,
            OutputPrefixType::Crunchy,
            OutputPrefixType::Raw,
        ] {
            assert_eq!(output_prefix(u32::MAX, prefix_type).len(), prefix_type.prefix_size());
        }
    }

    #[test]
    fn tink_and_legacy_prefixes_differ_for_same_id() {
        assert_ne!(
            output_prefix(9, OutputPrefixType::Tink),
            output_prefix(9, OutputPrefixType::Legacy)
        );
    }

    #[test]
    fn key_info_prefix_matches_free_function() {
        let info = KeyInfo::enabled(0xDEAD_BEEF, OutputPrefixType::Tink);
        assert_eq!(info.output_prefix(), output_prefix(0xDEAD_BEEF, OutputPrefixType::Tink));
        assert_eq!(info.status, KeyStatus::Enabled);
    }

    #[test]
    fn status_display() {
        assert_eq!(KeyStatus::Disabled.to_string(), "disabled");
    }
}
