//! Prefix-indexed set of primitives for one keyset.
//!
//! The set keeps two views over the same entries:
//! - insertion order: every entry, as added by the keyset layer
//! - `prefix → entries`: the entries stamping a given output prefix, still in
//!   insertion order
//!
//! # Design
//!
//! - No overwrite: entries sharing a prefix are appended to the same group
//! - Exact match: lookups compare whole prefixes, never partial ones
//! - Read-only after hand-off: a wrapper takes the set by value and only
//!   exposes `&self` queries

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use crate::{
    error::PrimitiveSetError,
    format::{KeyId, KeyInfo, KeyStatus, OutputPrefixType},
};

/// One primitive together with the key metadata it was created from.
///
/// Only `Enabled` keys are ever stored, so an entry carries no status.
pub struct Entry<P: ?Sized> {
    primitive: Arc<P>,
    key_id: KeyId,
    output_prefix_type: Option<OutputPrefixType>,
    identifier: Vec<u8>,
}

impl<P: ?Sized> Entry<P> {
    /// The primitive instance.
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Key id of the entry.
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// Prefix format, or `None` if the prefix was supplied directly.
    pub fn output_prefix_type(&self) -> Option<OutputPrefixType> {
        self.output_prefix_type
    }

    /// Output prefix bytes. Empty for raw keys.
    pub fn identifier(&self) -> &[u8] {
        &self.identifier
    }

    /// Whether this entry is a raw (unprefixed) key.
    pub fn is_raw(&self) -> bool {
        self.identifier.is_empty()
    }
}

impl<P: ?Sized> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            primitive: Arc::clone(&self.primitive),
            key_id: self.key_id,
            output_prefix_type: self.output_prefix_type,
            identifier: self.identifier.clone(),
        }
    }
}

impl<P: ?Sized> fmt::Debug for Entry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key_id", &self.key_id)
            .field("output_prefix_type", &self.output_prefix_type)
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Primitives of one keyset, indexed by output prefix, with one primary.
pub struct PrimitiveSet<P: ?Sized> {
    /// All entries in insertion order
    entries: Vec<Entry<P>>,
    /// Output prefix → indices into `entries`, in insertion order
    by_prefix: HashMap<Vec<u8>, Vec<usize>>,
    /// Distinct non-empty prefix lengths
    prefix_lengths: BTreeSet<usize>,
    /// Index of the primary entry
    primary: Option<usize>,
}

impl<P: ?Sized> Default for PrimitiveSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> PrimitiveSet<P> {
    /// Create an empty set without a primary.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_prefix: HashMap::new(),
            prefix_lengths: BTreeSet::new(),
            primary: None,
        }
    }

    /// Add a primitive for the key described by `key`.
    ///
    /// The output prefix is derived from the key id and prefix type.
    pub fn add_primitive(
        &mut self,
        primitive: Arc<P>,
        key: &KeyInfo,
    ) -> Result<&Entry<P>, PrimitiveSetError> {
        let prefix = key.output_prefix();
        self.insert(primitive, key.key_id, key.status, Some(key.output_prefix_type), prefix)
    }

    /// Add a primitive under a caller-supplied output prefix.
    ///
    /// For prefix formats outside [`crate::format`]. An empty prefix makes
    /// the entry raw.
    pub fn add_with_prefix(
        &mut self,
        primitive: Arc<P>,
        key_id: KeyId,
        status: KeyStatus,
        prefix: impl Into<Vec<u8>>,
    ) -> Result<&Entry<P>, PrimitiveSetError> {
        self.insert(primitive, key_id, status, None, prefix.into())
    }

    fn insert(
        &mut self,
        primitive: Arc<P>,
        key_id: KeyId,
        status: KeyStatus,
        output_prefix_type: Option<OutputPrefixType>,
        identifier: Vec<u8>,
    ) -> Result<&Entry<P>, PrimitiveSetError> {
        if status != KeyStatus::Enabled {
            return Err(PrimitiveSetError::KeyNotEnabled { key_id, status });
        }

        let index = self.entries.len();
        if !identifier.is_empty() {
            self.prefix_lengths.insert(identifier.len());
        }
        self.by_prefix.entry(identifier.clone()).or_default().push(index);

        tracing::debug!(key_id, prefix_len = identifier.len(), "added primitive");

        self.entries.push(Entry { primitive, key_id, output_prefix_type, identifier });
        Ok(&self.entries[index])
    }

    /// Designate the entry with `key_id` as primary.
    ///
    /// Replaces any earlier designation.
    pub fn set_primary(&mut self, key_id: KeyId) -> Result<(), PrimitiveSetError> {
        let mut matches = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.key_id == key_id)
            .map(|(index, _)| index);

        let Some(index) = matches.next() else {
            return Err(PrimitiveSetError::UnknownKey { key_id });
        };

        let others = matches.count();
        if others > 0 {
            return Err(PrimitiveSetError::AmbiguousKey { key_id, count: others + 1 });
        }

        tracing::debug!(key_id, "designated primary");
        self.primary = Some(index);
        Ok(())
    }

    /// The primary entry.
    pub fn primary(&self) -> Result<&Entry<P>, PrimitiveSetError> {
        self.primary.map(|index| &self.entries[index]).ok_or(PrimitiveSetError::NoPrimary)
    }

    /// Entries whose output prefix equals `prefix` exactly, in insertion
    /// order. Empty if none match.
    pub fn get_primitives(&self, prefix: &[u8]) -> Vec<&Entry<P>> {
        self.by_prefix
            .get(prefix)
            .map(|indices| indices.iter().map(|&index| &self.entries[index]).collect())
            .unwrap_or_default()
    }

    /// Entries with an empty output prefix, in insertion order.
    pub fn get_raw_primitives(&self) -> Vec<&Entry<P>> {
        self.get_primitives(&[])
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[Entry<P>] {
        &self.entries
    }

    /// Distinct non-empty prefix lengths present in the set, ascending.
    pub fn prefix_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.prefix_lengths.iter().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: ?Sized> fmt::Debug for PrimitiveSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveSet")
            .field("entries", &self.entries)
            .field("primary", &self.primary().ok().map(Entry::key_id))
            .finish()
    }
}
