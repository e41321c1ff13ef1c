// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data type label cache

use foundry_model::{DataTypeId, UnitService};
use rustc_hash::FxHashMap;

/// Cache of human-readable data type labels
///
/// Each label is fetched from the unit service the first time it is asked
/// for. The cache belongs to whoever built it; call [`LabelCache::invalidate`]
/// after switching documents or changing unit settings.
#[derive(Debug, Default)]
pub struct LabelCache {
    labels: FxHashMap<DataTypeId, String>,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label for `data_type`, fetched on first use
    pub fn label(&mut self, units: &dyn UnitService, data_type: &DataTypeId) -> &str {
        self.labels
            .entry(data_type.clone())
            .or_insert_with(|| units.label(data_type))
    }

    /// Drop every cached label
    pub fn invalidate(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{specs, UnitTable};

    #[test]
    fn test_label_cached_once() {
        let units = UnitTable::project_defaults();
        let mut cache = LabelCache::new();
        let voltage = DataTypeId::from(specs::ELECTRICAL_VOLTAGE);

        assert_eq!(cache.label(&units, &voltage), "Electrical Potential");
        assert_eq!(cache.label(&units, &voltage), "Electrical Potential");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_rebuilds() {
        let mut cache = LabelCache::new();
        let voltage = DataTypeId::from(specs::ELECTRICAL_VOLTAGE);

        assert_eq!(cache.label(&UnitTable::new(), &voltage), "voltage");

        // Stale until invalidated
        let relabelled = UnitTable::new().with_label(specs::ELECTRICAL_VOLTAGE, "Potential");
        assert_eq!(cache.label(&relabelled, &voltage), "voltage");

        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.label(&relabelled, &voltage), "Potential");
    }
}
