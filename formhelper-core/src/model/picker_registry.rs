//! ``src/model/picker_registry.rs``
//! ============================================================================
//! # `PickerRegistry`: Explicit Set of Live Pickers
//!
//! Holds every picker of one form in registration order. A picker leaves the
//! registry only through [`PickerRegistry::remove_picker`], called by the same
//! action that detaches its view, and from then on drops out of every
//! aggregate. Aggregates are derived on each call and never cached.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{Merge, PickerConfig, PickerOverrides};
use crate::error::{FormError, FormResult};
use crate::model::picker::{PickerCallbacks, PickerId, PickerInstance};
use crate::util::humanize::format_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PickerSummary {
    pub picker: PickerId,
    pub size: u64,
    pub count: u32,
}

/// Whole-form totals plus a per-picker breakdown in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AggregateInfo {
    pub total_size: u64,
    pub total_count: u64,
    pub per_picker: Vec<PickerSummary>,
}

impl AggregateInfo {
    #[must_use]
    pub fn formatted_size(&self) -> String {
        format_bytes(self.total_size)
    }
}

#[derive(Debug, Clone)]
pub struct PickerRegistry {
    defaults: PickerConfig,
    pickers: IndexMap<PickerId, PickerInstance>,
    next_id: u64,
}

impl PickerRegistry {
    /// Empty registry; every picker is created from `defaults` plus its overrides.
    #[must_use]
    pub fn new(defaults: PickerConfig) -> Self {
        Self {
            defaults,
            pickers: IndexMap::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub const fn defaults(&self) -> &PickerConfig {
        &self.defaults
    }

    /// Create and register a picker.
    pub fn add_picker(
        &mut self,
        overrides: &PickerOverrides,
        callbacks: PickerCallbacks,
    ) -> &mut PickerInstance {
        let id: PickerId = PickerId(self.next_id);
        self.next_id += 1;

        let picker: PickerInstance =
            PickerInstance::new(id, self.defaults.merged(overrides), callbacks);

        tracing::debug!(picker = %id, "picker registered");

        self.pickers.entry(id).or_insert(picker)
    }

    /// Unregister a picker, keeping the order of the rest.
    pub fn remove_picker(&mut self, id: PickerId) -> FormResult<PickerInstance> {
        let picker: PickerInstance = self
            .pickers
            .shift_remove(&id)
            .ok_or(FormError::PickerNotFound(id))?;

        tracing::debug!(picker = %id, files = picker.count(), "picker unregistered");

        Ok(picker)
    }

    #[must_use]
    pub fn get(&self, id: PickerId) -> Option<&PickerInstance> {
        self.pickers.get(&id)
    }

    pub fn get_mut(&mut self, id: PickerId) -> Option<&mut PickerInstance> {
        self.pickers.get_mut(&id)
    }

    pub fn picker(&self, id: PickerId) -> FormResult<&PickerInstance> {
        self.get(id).ok_or(FormError::PickerNotFound(id))
    }

    pub fn picker_mut(&mut self, id: PickerId) -> FormResult<&mut PickerInstance> {
        self.get_mut(id).ok_or(FormError::PickerNotFound(id))
    }

    /// Pickers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PickerInstance> {
        self.pickers.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pickers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pickers.is_empty()
    }

    /// Recompute totals over every live picker.
    #[must_use]
    pub fn aggregate(&self) -> AggregateInfo {
        let per_picker: Vec<PickerSummary> = self
            .iter()
            .map(|picker| PickerSummary {
                picker: picker.id(),
                size: picker.size(),
                count: picker.count(),
            })
            .collect();

        AggregateInfo {
            total_size: per_picker
                .iter()
                .fold(0u64, |total, s| total.saturating_add(s.size)),
            total_count: per_picker.iter().map(|s| u64::from(s.count)).sum(),
            per_picker,
        }
    }
}

impl Default for PickerRegistry {
    fn default() -> Self {
        Self::new(PickerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::file_record::FileHandle;

    #[test]
    fn test_registration_order_and_ids() {
        let mut registry = PickerRegistry::default();
        let a = registry
            .add_picker(&PickerOverrides::default(), PickerCallbacks::default())
            .id();
        let b = registry
            .add_picker(&PickerOverrides::default(), PickerCallbacks::default())
            .id();
        let c = registry
            .add_picker(&PickerOverrides::default(), PickerCallbacks::default())
            .id();

        assert_ne!(a, b);
        registry.remove_picker(b).unwrap();

        let order: Vec<PickerId> = registry.iter().map(PickerInstance::id).collect();
        assert_eq!(order, [a, c]);
        assert!(matches!(
            registry.remove_picker(b),
            Err(FormError::PickerNotFound(id)) if id == b
        ));
    }

    #[test]
    fn test_overrides_apply_per_picker() {
        let mut registry = PickerRegistry::default();
        let small = registry
            .add_picker(
                &PickerOverrides {
                    max_files: Some(2),
                    ..PickerOverrides::default()
                },
                PickerCallbacks::default(),
            )
            .id();
        let plain = registry
            .add_picker(&PickerOverrides::default(), PickerCallbacks::default())
            .id();

        assert_eq!(registry.picker(small).unwrap().config().max_files, 2);
        assert_eq!(registry.picker(plain).unwrap().config().max_files, 10);
        assert_eq!(registry.defaults().max_files, 10);
    }

    #[test]
    fn test_aggregate_is_recomputed() {
        let mut registry = PickerRegistry::default();
        let a = registry
            .add_picker(&PickerOverrides::default(), PickerCallbacks::default())
            .id();
        let b = registry
            .add_picker(&PickerOverrides::default(), PickerCallbacks::default())
            .id();

        registry
            .picker_mut(a)
            .unwrap()
            .add_files([FileHandle::metadata_only("x", 1024), FileHandle::metadata_only("y", 512)]);
        registry
            .picker_mut(b)
            .unwrap()
            .add_files([FileHandle::metadata_only("z", 100)]);

        let info = registry.aggregate();
        assert_eq!(info.total_size, 1636);
        assert_eq!(info.total_count, 3);
        assert_eq!(info.per_picker[0].size, 1536);
        assert_eq!(info.per_picker[1].count, 1);

        registry.remove_picker(a).unwrap();
        let info = registry.aggregate();
        assert_eq!(info.total_size, 100);
        assert_eq!(info.formatted_size(), "100.00 Bytes");
    }
}
