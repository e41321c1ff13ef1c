// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory FamilyDocument implementation

use crate::units::UnitTable;
use foundry_model::{
    FamilyDocument, FamilyType, MappingError, Parameter, ParameterValue, Result, UnitService,
};
use rustc_hash::FxHashMap;
use std::cell::Cell;
use std::sync::Arc;

/// Type name -> parameter name -> value
type ValueTable = FxHashMap<String, FxHashMap<String, ParameterValue>>;

struct Transaction {
    name: String,
    values: ValueTable,
    current: Option<usize>,
}

/// Family document backed by plain tables
///
/// Behaves like a host family document: writes go to the current type,
/// formula-driven parameters and mismatched storage kinds are rejected, and
/// a rolled-back transaction restores every value written since it opened.
pub struct MemoryFamilyDocument {
    title: String,
    family_editing: bool,
    types: Vec<FamilyType>,
    parameters: Vec<Parameter>,
    values: ValueTable,
    current: Option<usize>,
    units: Arc<dyn UnitService>,
    require_transactions: bool,
    transaction: Option<Transaction>,
    switches: usize,
    unit_lookups: Cell<usize>,
}

impl MemoryFamilyDocument {
    /// Create an empty family document with the default unit table
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            family_editing: true,
            types: Vec::new(),
            parameters: Vec::new(),
            values: FxHashMap::default(),
            current: None,
            units: Arc::new(UnitTable::project_defaults()),
            require_transactions: false,
            transaction: None,
            switches: 0,
            unit_lookups: Cell::new(0),
        }
    }

    /// Add a family type; the first one added becomes current
    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.types.push(FamilyType::new(name));
        if self.current.is_none() {
            self.current = Some(0);
        }
        self
    }

    /// Add a family parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Seed a value for one type
    pub fn with_value(
        mut self,
        type_name: &str,
        parameter: &str,
        value: impl Into<ParameterValue>,
    ) -> Self {
        self.values
            .entry(type_name.to_string())
            .or_default()
            .insert(parameter.to_string(), value.into().into_storage());
        self
    }

    /// Make a type current without counting it as a switch
    pub fn with_current(mut self, type_name: &str) -> Self {
        self.current = self.type_index(type_name);
        self
    }

    /// Replace the unit service
    pub fn with_units(mut self, units: Arc<dyn UnitService>) -> Self {
        self.units = units;
        self
    }

    /// Toggle family-editing mode
    pub fn with_family_editing(mut self, enabled: bool) -> Self {
        self.family_editing = enabled;
        self
    }

    /// Reject writes made outside a transaction
    pub fn requiring_transactions(mut self) -> Self {
        self.require_transactions = true;
        self
    }

    /// Stored value for a type and parameter name
    pub fn value(&self, type_name: &str, parameter: &str) -> Option<&ParameterValue> {
        self.values.get(type_name)?.get(parameter)
    }

    /// Values of one parameter across all types, in type order
    pub fn column(&self, parameter: &str) -> Vec<Option<ParameterValue>> {
        self.types
            .iter()
            .map(|t| self.value(&t.name, parameter).cloned())
            .collect()
    }

    /// Number of times the current type was switched
    pub fn type_switches(&self) -> usize {
        self.switches
    }

    /// Number of times the unit service was requested
    pub fn unit_lookups(&self) -> usize {
        self.unit_lookups.get()
    }

    /// Name of the open transaction
    pub fn open_transaction(&self) -> Option<&str> {
        self.transaction.as_ref().map(|t| t.name.as_str())
    }

    fn type_index(&self, name: &str) -> Option<usize> {
        self.types.iter().position(|t| t.name == name)
    }

    fn current_name(&self) -> Option<&str> {
        self.current
            .and_then(|index| self.types.get(index))
            .map(|t| t.name.as_str())
    }
}

impl FamilyDocument for MemoryFamilyDocument {
    fn title(&self) -> &str {
        &self.title
    }

    fn is_family_document(&self) -> bool {
        self.family_editing
    }

    fn family_types(&self) -> Vec<FamilyType> {
        self.types.clone()
    }

    fn current_type(&self) -> Option<FamilyType> {
        self.current.and_then(|index| self.types.get(index)).cloned()
    }

    fn set_current_type(&mut self, family_type: &FamilyType) -> Result<()> {
        let index = self.type_index(&family_type.name).ok_or_else(|| {
            MappingError::invalid_operation(format!(
                "family type '{}' not found in '{}'",
                family_type, self.title
            ))
        })?;
        self.current = Some(index);
        self.switches += 1;
        Ok(())
    }

    fn parameter(&self, name: &str) -> Option<Parameter> {
        self.parameters.iter().find(|p| p.name == name).cloned()
    }

    fn current_value(&self, parameter: &Parameter) -> Option<ParameterValue> {
        let type_name = self.current_name()?;
        self.value(type_name, &parameter.name).cloned()
    }

    fn set_current_value(&mut self, parameter: &Parameter, value: ParameterValue) -> Result<()> {
        if self.require_transactions && self.transaction.is_none() {
            return Err(MappingError::invalid_operation(format!(
                "'{}' cannot be modified outside a transaction",
                self.title
            )));
        }

        let type_name = self
            .current_name()
            .ok_or_else(|| {
                MappingError::invalid_operation(format!("'{}' has no current family type", self.title))
            })?
            .to_string();

        let defined = self
            .parameters
            .iter()
            .find(|p| p.name == parameter.name)
            .ok_or_else(|| {
                MappingError::invalid_operation(format!(
                    "parameter '{}' is not defined in '{}'",
                    parameter.name, self.title
                ))
            })?;

        if defined.is_formula_driven() {
            return Err(MappingError::invalid_operation(format!(
                "parameter '{}' is determined by a formula",
                defined.name
            )));
        }

        if value.is_none() || value.storage_kind() != defined.storage {
            return Err(MappingError::invalid_operation(format!(
                "parameter '{}' stores {} but got a {} value",
                defined.name,
                defined.storage,
                value.kind()
            )));
        }

        self.values
            .entry(type_name)
            .or_default()
            .insert(parameter.name.clone(), value.into_storage());
        Ok(())
    }

    fn units(&self) -> Arc<dyn UnitService> {
        self.unit_lookups.set(self.unit_lookups.get() + 1);
        Arc::clone(&self.units)
    }

    fn begin_transaction(&mut self, name: &str) -> Result<()> {
        if let Some(open) = &self.transaction {
            return Err(MappingError::invalid_operation(format!(
                "cannot start '{}' while '{}' is open",
                name, open.name
            )));
        }
        self.transaction = Some(Transaction {
            name: name.to_string(),
            values: self.values.clone(),
            current: self.current,
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.transaction
            .take()
            .map(|_| ())
            .ok_or_else(|| MappingError::invalid_operation("no open transaction to commit"))
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let transaction = self
            .transaction
            .take()
            .ok_or_else(|| MappingError::invalid_operation("no open transaction to roll back"))?;
        self.values = transaction.values;
        self.current = transaction.current;
        Ok(())
    }
}
