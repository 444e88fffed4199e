//! Records of installed intercepts.
//!
//! The registry keeps, for every installed replacement, the original implementation returned
//! by the backend at install time. Forwarders read it on every intercepted call, often on the
//! host's render thread, while the registrar may be installing other intercepts concurrently;
//! a [`DashMap`] keeps those lookups off the shim's state lock.

use dashmap::DashMap;

use crate::runtime::{FnAddr, InstanceHandle, InterceptId, ModuleHandle};

/// Where an intercept was installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterceptLocation {
    /// A named module export.
    Export {
        /// The module owning the export
        module: ModuleHandle,
    },
    /// A dispatch table slot of a runtime object.
    Slot {
        /// The patched object
        instance: InstanceHandle,
        /// The patched slot index
        slot: usize,
    },
}

/// One installed intercept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterceptRecord {
    /// Identity of the installed replacement.
    pub id: InterceptId,
    /// Call-site label the intercept was installed under.
    pub label: String,
    /// Where the intercept lives.
    pub location: InterceptLocation,
    /// The original, un-intercepted implementation.
    pub original: FnAddr,
}

/// Concurrent map of installed intercepts, keyed by replacement identity.
#[derive(Debug, Default)]
pub struct InterceptRegistry {
    records: DashMap<InterceptId, InterceptRecord>,
}

impl InterceptRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record, returning the one it replaced.
    pub fn insert(&self, record: InterceptRecord) -> Option<InterceptRecord> {
        self.records.insert(record.id, record)
    }

    /// Removes and returns the record for `id`.
    pub fn remove(&self, id: InterceptId) -> Option<InterceptRecord> {
        self.records.remove(&id).map(|(_, record)| record)
    }

    /// Returns the original implementation captured when `id` was installed.
    #[must_use]
    pub fn original(&self, id: InterceptId) -> Option<FnAddr> {
        self.records.get(&id).map(|record| record.original)
    }

    /// Returns a copy of the record for `id`.
    #[must_use]
    pub fn get(&self, id: InterceptId) -> Option<InterceptRecord> {
        self.records.get(&id).map(|record| record.clone())
    }

    /// Returns `true` if `id` is installed.
    #[must_use]
    pub fn contains(&self, id: InterceptId) -> bool {
        self.records.contains_key(&id)
    }

    /// Returns the identities of all installed intercepts, in declaration order.
    #[must_use]
    pub fn ids(&self) -> Vec<InterceptId> {
        let mut ids: Vec<_> = self.records.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    /// Returns the number of installed intercepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: InterceptId, original: usize) -> InterceptRecord {
        InterceptRecord {
            id,
            label: id.to_string(),
            location: InterceptLocation::Export {
                module: ModuleHandle::new(0x1000),
            },
            original: FnAddr::new(original),
        }
    }

    #[test]
    fn test_registry_insert_and_lookup() {
        let registry = InterceptRegistry::new();
        assert!(registry.is_empty());

        assert!(registry
            .insert(record(InterceptId::Cleanup, 0x10))
            .is_none());
        assert!(registry.contains(InterceptId::Cleanup));
        assert_eq!(
            registry.original(InterceptId::Cleanup),
            Some(FnAddr::new(0x10))
        );
        assert_eq!(registry.original(InterceptId::SubmitCurrent), None);
    }

    #[test]
    fn test_registry_replace_and_remove() {
        let registry = InterceptRegistry::new();
        registry.insert(record(InterceptId::Cleanup, 0x10));
        let previous = registry.insert(record(InterceptId::Cleanup, 0x20)).unwrap();

        assert_eq!(previous.original, FnAddr::new(0x10));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.remove(InterceptId::Cleanup).unwrap().original,
            FnAddr::new(0x20)
        );
        assert!(registry.remove(InterceptId::Cleanup).is_none());
    }

    #[test]
    fn test_registry_ids_sorted() {
        let registry = InterceptRegistry::new();
        registry.insert(record(InterceptId::RecommendedRenderTargetSize, 1));
        registry.insert(record(InterceptId::ClientCoreFactory, 2));
        registry.insert(record(InterceptId::SubmitTyped, 3));

        assert_eq!(
            registry.ids(),
            vec![
                InterceptId::ClientCoreFactory,
                InterceptId::SubmitTyped,
                InterceptId::RecommendedRenderTargetSize
            ]
        );
    }
}
