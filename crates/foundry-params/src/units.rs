// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit formats and conversion to internal units

use foundry_model::{DataTypeId, MappingError, Result, UnitId, UnitService};
use rustc_hash::FxHashMap;

/// Common data type (spec) identifiers
pub mod specs {
    pub const LENGTH: &str = "autodesk.spec.aec:length-2.0.0";
    pub const NUMBER: &str = "autodesk.spec.aec:number-2.0.0";
    pub const INTEGER: &str = "autodesk.spec:spec.int64-2.0.0";
    pub const TEXT: &str = "autodesk.spec:spec.string-2.0.0";
    pub const YES_NO: &str = "autodesk.spec:spec.bool-1.0.0";
    pub const MATERIAL: &str = "autodesk.spec:spec.reference.material-1.0.0";
    pub const ELECTRICAL_VOLTAGE: &str = "autodesk.spec.aec.electrical:voltage-2.0.0";
    pub const ELECTRICAL_CURRENT: &str = "autodesk.spec.aec.electrical:current-2.0.0";
    pub const ELECTRICAL_APPARENT_POWER: &str = "autodesk.spec.aec.electrical:apparentPower-2.0.0";
    pub const ELECTRICAL_POWER: &str = "autodesk.spec.aec.electrical:power-2.0.0";
}

/// Common display unit identifiers
pub mod unit_ids {
    pub const GENERAL: &str = "autodesk.unit.unit:general-1.0.1";
    pub const FEET: &str = "autodesk.unit.unit:feet-1.0.1";
    pub const INCHES: &str = "autodesk.unit.unit:inches-1.0.1";
    pub const MILLIMETERS: &str = "autodesk.unit.unit:millimeters-1.0.1";
    pub const METERS: &str = "autodesk.unit.unit:meters-1.0.1";
    pub const VOLTS: &str = "autodesk.unit.unit:volts-1.0.1";
    pub const KILOVOLTS: &str = "autodesk.unit.unit:kilovolts-1.0.1";
    pub const AMPERES: &str = "autodesk.unit.unit:amperes-1.0.1";
    pub const VOLT_AMPERES: &str = "autodesk.unit.unit:voltAmperes-1.0.1";
    pub const WATTS: &str = "autodesk.unit.unit:watts-1.0.1";
}

/// Scale factors from display units to internal units
///
/// Internal units are feet for length and kg·ft²/s³-based units for
/// electrical potential and power.
pub mod scales {
    /// Square feet per square metre
    const FT2_PER_M2: f64 = 1.0 / 0.09290304;

    pub const GENERAL: f64 = 1.0;
    pub const FEET: f64 = 1.0;
    pub const INCHES: f64 = 1.0 / 12.0;
    pub const MILLIMETERS: f64 = 1.0 / 304.8;
    pub const METERS: f64 = 1.0 / 0.3048;
    pub const VOLTS: f64 = FT2_PER_M2;
    pub const KILOVOLTS: f64 = 1000.0 * FT2_PER_M2;
    pub const AMPERES: f64 = 1.0;
    pub const VOLT_AMPERES: f64 = FT2_PER_M2;
    pub const WATTS: f64 = FT2_PER_M2;
}

/// In-memory unit service
///
/// Maps data types to their format unit and format units to a linear scale
/// into internal units.
#[derive(Clone, Debug, Default)]
pub struct UnitTable {
    formats: FxHashMap<DataTypeId, UnitId>,
    scales: FxHashMap<UnitId, f64>,
    labels: FxHashMap<DataTypeId, String>,
}

impl UnitTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table preloaded with the usual project formats
    pub fn project_defaults() -> Self {
        Self::new()
            .with_unit(unit_ids::GENERAL, scales::GENERAL)
            .with_unit(unit_ids::FEET, scales::FEET)
            .with_unit(unit_ids::INCHES, scales::INCHES)
            .with_unit(unit_ids::MILLIMETERS, scales::MILLIMETERS)
            .with_unit(unit_ids::METERS, scales::METERS)
            .with_unit(unit_ids::VOLTS, scales::VOLTS)
            .with_unit(unit_ids::KILOVOLTS, scales::KILOVOLTS)
            .with_unit(unit_ids::AMPERES, scales::AMPERES)
            .with_unit(unit_ids::VOLT_AMPERES, scales::VOLT_AMPERES)
            .with_unit(unit_ids::WATTS, scales::WATTS)
            .with_format(specs::LENGTH, unit_ids::FEET)
            .with_format(specs::NUMBER, unit_ids::GENERAL)
            .with_format(specs::ELECTRICAL_VOLTAGE, unit_ids::VOLTS)
            .with_format(specs::ELECTRICAL_CURRENT, unit_ids::AMPERES)
            .with_format(specs::ELECTRICAL_APPARENT_POWER, unit_ids::VOLT_AMPERES)
            .with_format(specs::ELECTRICAL_POWER, unit_ids::WATTS)
            .with_label(specs::ELECTRICAL_VOLTAGE, "Electrical Potential")
            .with_label(specs::ELECTRICAL_CURRENT, "Current")
            .with_label(specs::ELECTRICAL_APPARENT_POWER, "Apparent Power")
            .with_label(specs::LENGTH, "Length")
            .with_label(specs::YES_NO, "Yes/No")
    }

    /// Register a unit with its scale to internal units
    pub fn with_unit(mut self, unit: impl Into<UnitId>, scale: f64) -> Self {
        self.scales.insert(unit.into(), scale);
        self
    }

    /// Set the format unit used for a data type
    pub fn with_format(mut self, data_type: impl Into<DataTypeId>, unit: impl Into<UnitId>) -> Self {
        self.formats.insert(data_type.into(), unit.into());
        self
    }

    /// Set the display label of a data type
    pub fn with_label(mut self, data_type: impl Into<DataTypeId>, label: impl Into<String>) -> Self {
        self.labels.insert(data_type.into(), label.into());
        self
    }

    /// Scale of a registered unit
    pub fn scale(&self, unit: &UnitId) -> Option<f64> {
        self.scales.get(unit).copied()
    }
}

impl UnitService for UnitTable {
    fn format_unit(&self, data_type: &DataTypeId) -> Result<UnitId> {
        self.formats.get(data_type).cloned().ok_or_else(|| {
            MappingError::unit_conversion(
                data_type.as_str(),
                "no format unit configured for this data type",
            )
        })
    }

    fn to_internal(&self, value: f64, unit: &UnitId) -> Result<f64> {
        let scale = self.scale(unit).ok_or_else(|| {
            MappingError::unit_conversion(unit.as_str(), "unknown unit")
        })?;
        Ok(value * scale)
    }

    fn label(&self, data_type: &DataTypeId) -> String {
        self.labels
            .get(data_type)
            .cloned()
            .unwrap_or_else(|| data_type.short_name().to_string())
    }
}
