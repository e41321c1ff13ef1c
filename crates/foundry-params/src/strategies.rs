// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coercion strategies
//!
//! Each strategy answers two questions about a [`CoercionContext`]: can it
//! handle the context (`can_map`, a pure predicate), and if so, write the
//! value into the target's slot for the active type (`map`). `map` writes at
//! most once and returns a typed error instead of writing a bad value.

use crate::context::CoercionContext;
use crate::electrical::{self, VoltageBands};
use crate::numeric;
use foundry_model::{
    ActiveType, MappingError, MappingPolicy, Parameter, ParameterValue, Result, StorageKind,
    UnitService, ValueKind,
};
use std::sync::Arc;

/// A mapping policy
///
/// Strategies are stateless: one instance may be asked about many contexts
/// and caches nothing between calls.
pub trait MappingStrategy: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Check if this strategy can handle the context
    fn can_map(&self, context: &CoercionContext) -> bool;

    /// Write the source value into the target for the active type
    fn map(&self, context: &CoercionContext, active: &mut ActiveType<'_>) -> Result<Parameter>;

    /// Whether the strategy needs source parameter metadata (not a bare value)
    fn requires_source_parameter(&self) -> bool {
        false
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Write into the target, adding the target name to host rejections
fn write_target(active: &mut ActiveType<'_>, target: &Parameter, value: ParameterValue) -> Result<Parameter> {
    active.set_value(target, value).map_err(|err| match err {
        MappingError::InvalidOperation(msg) => MappingError::invalid_operation(format!(
            "cannot write '{}' for type '{}': {}",
            target.name,
            active.family_type(),
            msg
        )),
        other => other,
    })?;
    Ok(target.clone())
}

/// Storage coercion rules: same storage, or bool→int, int→double, numeric text→number
fn storage_compatible(kind: ValueKind, text: Option<&str>, target: StorageKind) -> bool {
    match (kind, target) {
        (ValueKind::None, _) => false,
        (ValueKind::Bool, StorageKind::Integer) => true,
        (ValueKind::Integer, StorageKind::Double) => true,
        (ValueKind::Text, StorageKind::Double) => text.is_some_and(numeric::can_extract_double),
        (ValueKind::Text, StorageKind::Integer) => text.is_some_and(numeric::can_extract_integer),
        (kind, target) => kind.storage() == target,
    }
}

/// Convert `value` to what a `target` slot stores
fn coerce_to_storage(value: &ParameterValue, target: StorageKind) -> Result<ParameterValue> {
    match value {
        ParameterValue::Bool(b) if target == StorageKind::Integer => {
            Ok(ParameterValue::Integer(i32::from(*b)))
        }
        // A double only ever lands in a double slot
        ParameterValue::Double(d) if target == StorageKind::Double => Ok(ParameterValue::Double(*d)),
        ParameterValue::Double(d) => Err(MappingError::argument(format!(
            "double value {} cannot be written to a {} parameter",
            d, target
        ))),
        ParameterValue::Integer(i) if target == StorageKind::Double => {
            Ok(ParameterValue::Double(f64::from(*i)))
        }
        ParameterValue::Integer(i) => Ok(ParameterValue::Integer(*i)),
        ParameterValue::Text(text) => match target {
            StorageKind::Double => numeric::extract_double(text)
                .map(ParameterValue::Double)
                .map_err(|_| MappingError::argument(format!("cannot convert '{}' to a double", text))),
            StorageKind::Integer => numeric::extract_integer(text)
                .map(ParameterValue::Integer)
                .map_err(|_| MappingError::argument(format!("cannot convert '{}' to an integer", text))),
            _ => Ok(ParameterValue::Text(text.clone())),
        },
        ParameterValue::ElementId(id) if target == StorageKind::ElementId => {
            Ok(ParameterValue::ElementId(*id))
        }
        other => Err(MappingError::argument(format!(
            "unsupported source value type '{}' for a {} parameter",
            other.kind(),
            target
        ))),
    }
}

// ============================================================================
// Strict
// ============================================================================

/// Storage kinds must be identical; the value is written unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictStrategy;

impl StrictStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl MappingStrategy for StrictStrategy {
    fn name(&self) -> &str {
        MappingPolicy::Strict.name()
    }

    fn can_map(&self, context: &CoercionContext) -> bool {
        context.source_kind().storage() == context.target_storage()
    }

    fn map(&self, context: &CoercionContext, active: &mut ActiveType<'_>) -> Result<Parameter> {
        let value = context.require_value()?;
        if value.storage_kind() != context.target_storage() {
            return Err(MappingError::argument(format!(
                "{} value {} does not match {} storage of '{}'",
                value.kind(),
                value,
                context.target_storage(),
                context.target().name
            )));
        }
        write_target(active, context.target(), value.clone().into_storage())
    }
}

// ============================================================================
// Storage type coercion
// ============================================================================

/// Coerce between storage kinds
///
/// Uses the source parameter's declared storage when there is one, otherwise
/// the runtime kind of the bare value.
#[derive(Clone, Copy, Debug, Default)]
pub struct StorageTypeCoercion;

impl StorageTypeCoercion {
    pub fn new() -> Self {
        Self
    }
}

impl MappingStrategy for StorageTypeCoercion {
    fn name(&self) -> &str {
        MappingPolicy::StorageTypeCoercion.name()
    }

    fn can_map(&self, context: &CoercionContext) -> bool {
        storage_compatible(
            context.source_kind(),
            context.source_text(),
            context.target_storage(),
        )
    }

    fn map(&self, context: &CoercionContext, active: &mut ActiveType<'_>) -> Result<Parameter> {
        let value = coerce_to_storage(context.require_value()?, context.target_storage())?;
        write_target(active, context.target(), value)
    }
}

// ============================================================================
// Simple coercion
// ============================================================================

/// Storage coercion decided from the runtime kind of the value alone
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleCoercion;

impl SimpleCoercion {
    pub fn new() -> Self {
        Self
    }
}

impl MappingStrategy for SimpleCoercion {
    fn name(&self) -> &str {
        MappingPolicy::SimpleCoercion.name()
    }

    fn can_map(&self, context: &CoercionContext) -> bool {
        storage_compatible(
            context.value_kind(),
            context.source_text(),
            context.target_storage(),
        )
    }

    fn map(&self, context: &CoercionContext, active: &mut ActiveType<'_>) -> Result<Parameter> {
        let value = coerce_to_storage(context.require_value()?, context.target_storage())?;
        write_target(active, context.target(), value)
    }
}

// ============================================================================
// Electrical coercion
// ============================================================================

/// Numeric extraction, nominal voltage collapse and unit conversion
#[derive(Clone, Debug, Default)]
pub struct ElectricalCoercion {
    bands: VoltageBands,
}

impl ElectricalCoercion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom voltage bands
    pub fn with_bands(bands: VoltageBands) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &VoltageBands {
        &self.bands
    }

    /// Map using a unit service the caller already holds
    pub fn map_with_units(
        &self,
        context: &CoercionContext,
        active: &mut ActiveType<'_>,
        units: &dyn UnitService,
    ) -> Result<Parameter> {
        let internal = electrical::coerce(context, &self.bands, units)?;
        write_target(active, context.target(), ParameterValue::Double(internal))
    }
}

impl MappingStrategy for ElectricalCoercion {
    fn name(&self) -> &str {
        MappingPolicy::ElectricalCoercion.name()
    }

    fn can_map(&self, context: &CoercionContext) -> bool {
        electrical::can_coerce(context)
    }

    fn map(&self, context: &CoercionContext, active: &mut ActiveType<'_>) -> Result<Parameter> {
        let units = active.units();
        self.map_with_units(context, active, units.as_ref())
    }
}

// ============================================================================
// Chain
// ============================================================================

/// Ordered strategies; the first member that can map does the mapping
pub struct ChainStrategy {
    name: String,
    members: Vec<Arc<dyn MappingStrategy>>,
}

impl ChainStrategy {
    pub fn new(members: Vec<Arc<dyn MappingStrategy>>) -> Self {
        let name = members
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join(" > ");
        Self { name, members }
    }

    pub fn members(&self) -> &[Arc<dyn MappingStrategy>] {
        &self.members
    }
}

impl MappingStrategy for ChainStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_map(&self, context: &CoercionContext) -> bool {
        self.members.iter().any(|m| m.can_map(context))
    }

    fn map(&self, context: &CoercionContext, active: &mut ActiveType<'_>) -> Result<Parameter> {
        let mut last_error = None;

        for member in &self.members {
            if !member.can_map(context) {
                continue;
            }
            match member.map(context, active) {
                Ok(parameter) => return Ok(parameter),
                Err(err) => {
                    log::debug!("{} failed, trying next: {}", member.name(), err);
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MappingError::NoSuitableStrategy {
            from: context.source_name(),
            to: context.target().name.clone(),
        }))
    }

    fn requires_source_parameter(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| m.requires_source_parameter())
    }
}
