// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fluent parameter value mapper
//!
//! ```ignore
//! use foundry_params::ParameterValueMapper;
//!
//! let mut mapper = ParameterValueMapper::new(&mut document)
//!     .source_value("208V")
//!     .target(&voltage);
//! mapper.map_coercively_to_electrical()?;
//! ```

use crate::context::CoercionContext;
use crate::electrical::VoltageBands;
use crate::labels::LabelCache;
use crate::strategies::{ElectricalCoercion, MappingStrategy, StrictStrategy};
use foundry_model::{
    ActiveType, FamilyDocument, MappingError, MappingPolicy, Parameter, ParameterValue, Result,
    UnitService,
};
use std::sync::Arc;

enum Source {
    Value(ParameterValue),
    /// Parameter and the value it held when it was set as the source
    Parameter(Parameter, Option<ParameterValue>),
}

/// Builder that maps one source onto one target in a single document
///
/// The unit service is fetched once when the mapper is created and reused
/// for labels and electrical unit conversion. Terminal calls never panic:
/// every failure comes back as [`MappingError::Mapping`] naming both sides
/// with their type labels.
pub struct ParameterValueMapper<'d> {
    document: &'d mut dyn FamilyDocument,
    units: Arc<dyn UnitService>,
    labels: LabelCache,
    bands: VoltageBands,
    source: Option<Source>,
    target: Option<Parameter>,
}

impl<'d> ParameterValueMapper<'d> {
    pub fn new(document: &'d mut dyn FamilyDocument) -> Self {
        let units = document.units();
        Self {
            document,
            units,
            labels: LabelCache::new(),
            bands: VoltageBands::nominal(),
            source: None,
            target: None,
        }
    }

    /// Use custom voltage bands for electrical mapping
    pub fn with_bands(mut self, bands: VoltageBands) -> Self {
        self.bands = bands;
        self
    }

    /// Map a bare value
    pub fn source_value(mut self, value: impl Into<ParameterValue>) -> Self {
        self.source = Some(Source::Value(value.into()));
        self
    }

    /// Map from a parameter; its current value is read immediately
    pub fn source_parameter(mut self, parameter: &Parameter) -> Self {
        let value = self.document.current_value(parameter);
        self.source = Some(Source::Parameter(parameter.clone(), value));
        self
    }

    pub fn target(mut self, parameter: &Parameter) -> Self {
        self.target = Some(parameter.clone());
        self
    }

    /// Drop cached data type labels after unit settings change
    pub fn invalidate_labels(&mut self) {
        self.labels.invalidate();
    }

    /// Copy the value only if source and target share a data type
    ///
    /// Bare values have no data type, so their storage kind must match the
    /// target's instead.
    pub fn map_strictly(&mut self) -> Result<Parameter> {
        let outcome = self.strict();
        outcome.map_err(|err| self.failure(err))
    }

    /// Coerce into an electrical target, with the nominal voltage heuristic
    pub fn map_coercively_to_electrical(&mut self) -> Result<Parameter> {
        let outcome = self.electrical();
        outcome.map_err(|err| self.failure(err))
    }

    fn strict(&mut self) -> Result<Parameter> {
        let context = self.context()?;
        if let Some(source) = context.source_data_type() {
            if source != context.target_data_type() {
                return Err(context.cannot_map(MappingPolicy::Strict.name()));
            }
        }
        self.apply(&StrictStrategy, &context)
    }

    fn electrical(&mut self) -> Result<Parameter> {
        let context = self.context()?;
        let strategy = ElectricalCoercion::with_bands(self.bands.clone());
        if !strategy.can_map(&context) {
            return Err(context.cannot_map(strategy.name()));
        }
        let units = Arc::clone(&self.units);
        let mut active = ActiveType::current(&mut *self.document)?;
        strategy.map_with_units(&context, &mut active, units.as_ref())
    }

    fn context(&self) -> Result<CoercionContext> {
        let target = self
            .target
            .clone()
            .ok_or_else(|| MappingError::argument("no target parameter set"))?;

        match &self.source {
            Some(Source::Value(value)) => Ok(CoercionContext::for_value(value.clone(), target)),
            Some(Source::Parameter(parameter, value)) => Ok(CoercionContext::for_parameter(
                parameter.clone(),
                value.clone(),
                target,
            )),
            None => Err(MappingError::argument("no source set")),
        }
    }

    fn apply(&mut self, strategy: &dyn MappingStrategy, context: &CoercionContext) -> Result<Parameter> {
        if !strategy.can_map(context) {
            return Err(context.cannot_map(strategy.name()));
        }
        let mut active = ActiveType::current(&mut *self.document)?;
        strategy.map(context, &mut active)
    }

    /// Wrap `err` as "cannot map X (type) to Y (type)"
    fn failure(&mut self, err: MappingError) -> MappingError {
        let units = self.units.as_ref();

        let from = match &self.source {
            Some(Source::Parameter(parameter, _)) => format!(
                "{} ({})",
                parameter.name,
                self.labels.label(units, &parameter.data_type)
            ),
            Some(Source::Value(value)) => format!("{} ({})", value, value.kind()),
            None => "<no source>".to_string(),
        };
        let to = match &self.target {
            Some(target) => format!(
                "{} ({})",
                target.name,
                self.labels.label(units, &target.data_type)
            ),
            None => "<no target>".to_string(),
        };

        log::debug!("Mapping {} to {} failed: {}", from, to, err);
        MappingError::mapping(from, to, err)
    }
}
