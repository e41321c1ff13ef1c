// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for host document access
//!
//! These traits define what a host binding must provide for the mapping
//! engine to read and write family parameters.

use crate::{DataTypeId, FamilyType, Parameter, ParameterValue, Result, UnitId};
use std::sync::Arc;

/// Unit lookup and conversion service
///
/// Parameters are displayed in a format unit chosen per data type, while
/// the document stores values in its internal unit system.
pub trait UnitService: Send + Sync {
    /// Get the display/format unit configured for a data type
    fn format_unit(&self, data_type: &DataTypeId) -> Result<UnitId>;

    /// Convert a value expressed in `unit` to internal units
    fn to_internal(&self, value: f64, unit: &UnitId) -> Result<f64>;

    /// Human-readable label for a data type
    fn label(&self, data_type: &DataTypeId) -> String {
        data_type.short_name().to_string()
    }
}

/// Family document with a type table
///
/// A family document holds an ordered, non-empty list of family types and
/// exactly one current type. Value reads and writes act on the current
/// type only. Switching the current type is expensive, so callers should
/// switch once per type and do all of that type's work before moving on;
/// [`ActiveType`](crate::ActiveType) encodes that discipline.
///
/// The document is not safe for concurrent mutation and is used from a
/// single thread.
pub trait FamilyDocument {
    /// Document title, used in messages
    fn title(&self) -> &str;

    /// Check if the document is open in family-editing mode
    fn is_family_document(&self) -> bool;

    /// Family types in host order
    fn family_types(&self) -> Vec<FamilyType>;

    /// The current family type, if any
    fn current_type(&self) -> Option<FamilyType>;

    /// Make a family type current
    fn set_current_type(&mut self, family_type: &FamilyType) -> Result<()>;

    /// Look up a family parameter by name
    fn parameter(&self, name: &str) -> Option<Parameter>;

    /// Value of a parameter under the current type
    ///
    /// Returns `None` when the slot holds no value.
    fn current_value(&self, parameter: &Parameter) -> Option<ParameterValue>;

    /// Write a parameter value under the current type
    ///
    /// Fails with `InvalidOperation` if the parameter is formula-driven or
    /// the value does not fit its storage kind.
    fn set_current_value(&mut self, parameter: &Parameter, value: ParameterValue) -> Result<()>;

    /// Unit service of this document
    fn units(&self) -> Arc<dyn UnitService>;

    /// Open a transaction; writes are held until commit
    fn begin_transaction(&mut self, name: &str) -> Result<()>;

    /// Commit the open transaction
    fn commit_transaction(&mut self) -> Result<()>;

    /// Discard every write made since the transaction opened
    fn rollback_transaction(&mut self) -> Result<()>;
}

/// Run `f` inside a document transaction
///
/// Commits when `f` succeeds and rolls back when it fails, so a batch that
/// fails partway leaves the document as it was before the call.
pub fn with_transaction<T, F>(document: &mut dyn FamilyDocument, name: &str, f: F) -> Result<T>
where
    F: FnOnce(&mut dyn FamilyDocument) -> Result<T>,
{
    document.begin_transaction(name)?;

    match f(&mut *document) {
        Ok(value) => {
            document.commit_transaction()?;
            Ok(value)
        }
        Err(err) => {
            log::warn!("Rolling back '{}' in '{}': {}", name, document.title(), err);
            if let Err(rollback) = document.rollback_transaction() {
                log::error!("Rollback of '{}' failed: {}", name, rollback);
            }
            Err(err)
        }
    }
}
