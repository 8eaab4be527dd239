//! Named collections of descriptors and their MessagePack bundle format.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::RecordDescriptor;
use crate::error::BundleError;

/// Descriptors keyed by record name.
///
/// A set is what a descriptor generator produces for one or more schema
/// files. It can be shipped as a bundle with [`DescriptorSet::to_bytes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSet {
    records: BTreeMap<String, Arc<RecordDescriptor>>,
}

impl DescriptorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor under its own name, replacing any previous entry.
    pub fn insert(&mut self, descriptor: Arc<RecordDescriptor>) -> Option<Arc<RecordDescriptor>> {
        self.records.insert(descriptor.name.clone(), descriptor)
    }

    /// Get a descriptor by record name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<RecordDescriptor>> {
        self.records.get(name)
    }

    /// Iterate over descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RecordDescriptor>> {
        self.records.values()
    }

    /// Record names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encode the set as a MessagePack bundle.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Encode`] if serialisation fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BundleError> {
        rmp_serde::to_vec_named(self).map_err(BundleError::Encode)
    }

    /// Decode a MessagePack bundle and validate every descriptor in it.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Decode`] for malformed bytes and
    /// [`BundleError::Invalid`] for a descriptor that breaks its layout
    /// invariants.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BundleError> {
        let set: Self = rmp_serde::from_slice(bytes)?;
        for descriptor in set.records.values() {
            descriptor.validate()?;
        }
        Ok(set)
    }
}

impl FromIterator<Arc<RecordDescriptor>> for DescriptorSet {
    fn from_iter<I: IntoIterator<Item = Arc<RecordDescriptor>>>(iter: I) -> Self {
        let mut set = Self::new();
        for descriptor in iter {
            set.insert(descriptor);
        }
        set
    }
}
