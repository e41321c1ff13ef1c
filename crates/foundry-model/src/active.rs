// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Explicit handle on the current family type

use crate::{FamilyDocument, FamilyType, MappingError, Parameter, ParameterValue, Result, UnitService};
use std::sync::Arc;

/// A family type that has been made current
///
/// Holding an `ActiveType` borrows the document mutably, so nothing else can
/// switch the current type while it is alive. Create one per family type,
/// do all of that type's reads and writes through it, then drop it.
pub struct ActiveType<'d> {
    document: &'d mut dyn FamilyDocument,
    family_type: FamilyType,
}

impl<'d> ActiveType<'d> {
    /// Switch the document to `family_type`
    ///
    /// This is the expensive host transition; it happens exactly once.
    pub fn activate(document: &'d mut dyn FamilyDocument, family_type: &FamilyType) -> Result<Self> {
        log::debug!(
            "Activating family type '{}' in '{}'",
            family_type,
            document.title()
        );
        document.set_current_type(family_type)?;

        Ok(Self {
            document,
            family_type: family_type.clone(),
        })
    }

    /// Wrap whatever type is already current, without switching
    pub fn current(document: &'d mut dyn FamilyDocument) -> Result<Self> {
        let family_type = document.current_type().ok_or_else(|| {
            MappingError::invalid_operation(format!(
                "'{}' has no current family type",
                document.title()
            ))
        })?;

        Ok(Self {
            document,
            family_type,
        })
    }

    /// The active family type
    pub fn family_type(&self) -> &FamilyType {
        &self.family_type
    }

    /// Read-only access to the underlying document
    pub fn document(&self) -> &dyn FamilyDocument {
        &*self.document
    }

    /// Look up a family parameter by name
    pub fn parameter(&self, name: &str) -> Option<Parameter> {
        self.document.parameter(name)
    }

    /// Value of `parameter` under the active type
    pub fn value(&self, parameter: &Parameter) -> Option<ParameterValue> {
        self.document.current_value(parameter)
    }

    /// Write `value` into `parameter`'s slot for the active type
    pub fn set_value(&mut self, parameter: &Parameter, value: ParameterValue) -> Result<()> {
        log::trace!(
            "[{}] {} <- {}",
            self.family_type,
            parameter.name,
            value
        );
        self.document.set_current_value(parameter, value)
    }

    /// Unit service of the document
    pub fn units(&self) -> Arc<dyn UnitService> {
        self.document.units()
    }
}
