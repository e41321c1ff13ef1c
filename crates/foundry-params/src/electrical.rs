// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Electrical value coercion
//!
//! Turns text or numbers into a value for an electrical parameter. Voltage
//! targets get a nominal-voltage heuristic: text mentioning any voltage in a
//! band collapses to the band's nominal value. The result is expressed in
//! the target's format unit and converted to internal units before writing.

use crate::context::CoercionContext;
use crate::numeric;
use foundry_model::{MappingError, Parameter, Result, UnitService, ValueKind};
use memchr::memmem;

/// A nominal voltage and the readings that collapse onto it
#[derive(Clone, Debug, PartialEq)]
pub struct VoltageBand {
    nominal: u32,
    candidates: Vec<u32>,
    needles: Vec<String>,
}

impl VoltageBand {
    pub fn new(nominal: u32, candidates: impl IntoIterator<Item = u32>) -> Self {
        let candidates: Vec<u32> = candidates.into_iter().collect();
        let needles = candidates.iter().map(|c| c.to_string()).collect();
        Self {
            nominal,
            candidates,
            needles,
        }
    }

    pub fn nominal(&self) -> u32 {
        self.nominal
    }

    pub fn candidates(&self) -> &[u32] {
        &self.candidates
    }

    /// Check if `text` contains the decimal rendering of any candidate
    pub fn matches(&self, text: &str) -> bool {
        let haystack = text.as_bytes();
        self.needles
            .iter()
            .any(|needle| memmem::find(haystack, needle.as_bytes()).is_some())
    }
}

/// Ordered set of voltage bands; the first matching band wins
#[derive(Clone, Debug, PartialEq)]
pub struct VoltageBands {
    bands: Vec<VoltageBand>,
}

impl VoltageBands {
    pub fn new(bands: Vec<VoltageBand>) -> Self {
        Self { bands }
    }

    /// 240V family (225-245 and 208) and 120V family (107-121)
    pub fn nominal() -> Self {
        Self::new(vec![
            VoltageBand::new(240, (225..=245).chain(std::iter::once(208))),
            VoltageBand::new(120, 107..=121),
        ])
    }

    pub fn bands(&self) -> &[VoltageBand] {
        &self.bands
    }

    /// Nominal voltage for `text`, if any band matches
    pub fn classify(&self, text: &str) -> Option<u32> {
        self.bands
            .iter()
            .find(|band| band.matches(text))
            .map(VoltageBand::nominal)
    }
}

impl Default for VoltageBands {
    fn default() -> Self {
        Self::nominal()
    }
}

/// Check if the target is a voltage parameter (name contains "voltage")
pub fn is_voltage_target(target: &Parameter) -> bool {
    target.name.to_lowercase().contains("voltage")
}

/// Check if the context can feed an electrical target
pub fn can_coerce(context: &CoercionContext) -> bool {
    if !context.target_data_type().is_electrical() {
        return false;
    }

    match context.source_kind() {
        ValueKind::Text => context
            .source_text()
            .is_some_and(numeric::can_extract_double),
        ValueKind::Double | ValueKind::Integer => true,
        _ => false,
    }
}

/// Raw number in the target's format unit
pub fn raw_value(context: &CoercionContext, bands: &VoltageBands) -> Result<f64> {
    match context.source_kind() {
        ValueKind::Text => {
            let text = context.source_text().unwrap_or_default();
            let voltage = is_voltage_target(context.target());

            if voltage {
                if let Some(nominal) = bands.classify(text) {
                    log::debug!("'{}' collapsed to nominal {}V", text, nominal);
                    return Ok(f64::from(nominal));
                }
            }

            match numeric::extract_double(text) {
                Ok(value) => Ok(value),
                Err(_) if voltage => numeric::extract_loose_double(text).map_err(|_| {
                    MappingError::argument(format!("cannot convert '{}' to a voltage", text))
                }),
                Err(_) => Err(MappingError::argument(format!(
                    "cannot convert '{}' to a number",
                    text
                ))),
            }
        }
        ValueKind::Double | ValueKind::Integer => Ok(context
            .source_value()
            .and_then(|v| v.as_double())
            .unwrap_or(0.0)),
        other => Err(MappingError::argument(format!(
            "unsupported source value type '{}' for an electrical target",
            other
        ))),
    }
}

/// Convert a raw value from the target's format unit to internal units
pub fn to_internal(units: &dyn UnitService, target: &Parameter, raw: f64) -> Result<f64> {
    let wrap = |err: MappingError| MappingError::unit_conversion(target.name.clone(), err.to_string());

    let unit = units.format_unit(&target.data_type).map_err(wrap)?;
    units.to_internal(raw, &unit).map_err(wrap)
}

/// Full electrical coercion: raw value, then internal units
pub fn coerce(context: &CoercionContext, bands: &VoltageBands, units: &dyn UnitService) -> Result<f64> {
    let raw = raw_value(context, bands)?;
    to_internal(units, context.target(), raw)
}
