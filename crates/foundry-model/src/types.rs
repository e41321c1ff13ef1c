// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for family parameter data
//!
//! This module defines the value, parameter and type-table row types used
//! throughout the mapping engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe element identifier
///
/// Wraps the raw host element id stored in entity-reference parameters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct ElementId(pub i64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for ElementId {
    fn from(id: i64) -> Self {
        ElementId(id)
    }
}

/// Primitive representation of a parameter's stored value
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub enum StorageKind {
    /// Slot stores nothing
    #[default]
    None,
    /// 32-bit integer (also backs yes/no parameters)
    Integer,
    /// Floating point, in internal units
    Double,
    /// Text
    String,
    /// Reference to another element
    ElementId,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageKind::None => "None",
            StorageKind::Integer => "Integer",
            StorageKind::Double => "Double",
            StorageKind::String => "String",
            StorageKind::ElementId => "ElementId",
        };
        f.write_str(name)
    }
}

/// Runtime kind of a value
///
/// Finer than [`StorageKind`]: booleans are their own kind even though the
/// host stores them as integers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ValueKind {
    None,
    Bool,
    Integer,
    Double,
    Text,
    ElementId,
}

impl ValueKind {
    /// Storage kind used to hold a value of this kind
    pub fn storage(&self) -> StorageKind {
        match self {
            ValueKind::None => StorageKind::None,
            ValueKind::Bool | ValueKind::Integer => StorageKind::Integer,
            ValueKind::Double => StorageKind::Double,
            ValueKind::Text => StorageKind::String,
            ValueKind::ElementId => StorageKind::ElementId,
        }
    }

    /// Human-readable name, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::None => "none",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Double => "double",
            ValueKind::Text => "text",
            ValueKind::ElementId => "element id",
        }
    }
}

impl From<StorageKind> for ValueKind {
    fn from(storage: StorageKind) -> Self {
        match storage {
            StorageKind::None => ValueKind::None,
            StorageKind::Integer => ValueKind::Integer,
            StorageKind::Double => ValueKind::Double,
            StorageKind::String => ValueKind::Text,
            StorageKind::ElementId => ValueKind::ElementId,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value held by (or destined for) a parameter slot
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum ParameterValue {
    /// No value
    #[default]
    None,
    /// Yes/no value
    Bool(bool),
    /// Integer value
    Integer(i32),
    /// Floating point value
    Double(f64),
    /// Text value
    Text(String),
    /// Element reference
    ElementId(ElementId),
}

impl ParameterValue {
    /// Runtime kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            ParameterValue::None => ValueKind::None,
            ParameterValue::Bool(_) => ValueKind::Bool,
            ParameterValue::Integer(_) => ValueKind::Integer,
            ParameterValue::Double(_) => ValueKind::Double,
            ParameterValue::Text(_) => ValueKind::Text,
            ParameterValue::ElementId(_) => ValueKind::ElementId,
        }
    }

    /// Storage kind that can hold this value
    pub fn storage_kind(&self) -> StorageKind {
        self.kind().storage()
    }

    /// Convert to the representation the host stores (booleans become 1/0)
    pub fn into_storage(self) -> ParameterValue {
        match self {
            ParameterValue::Bool(b) => ParameterValue::Integer(i32::from(b)),
            other => other,
        }
    }

    /// Check if this is the empty value
    pub fn is_none(&self) -> bool {
        matches!(self, ParameterValue::None)
    }

    /// Check if this value is absent or an empty string
    pub fn is_blank(&self) -> bool {
        match self {
            ParameterValue::None => true,
            ParameterValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Try to get as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as float (integers widen)
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(d) => Some(*d),
            ParameterValue::Integer(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            ParameterValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as element reference
    pub fn as_element_id(&self) -> Option<ElementId> {
        match self {
            ParameterValue::ElementId(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::None => f.write_str("<none>"),
            ParameterValue::Bool(b) => write!(f, "{}", b),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Double(d) => write!(f, "{}", d),
            ParameterValue::Text(s) => write!(f, "'{}'", s),
            ParameterValue::ElementId(id) => write!(f, "{}", id),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Double(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

impl From<ElementId> for ParameterValue {
    fn from(value: ElementId) -> Self {
        ParameterValue::ElementId(value)
    }
}

/// Semantic data type (spec) identifier
///
/// For example `autodesk.spec.aec.electrical:voltage-2.0.0`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct DataTypeId(pub String);

impl DataTypeId {
    /// Marker shared by every electrical spec identifier
    pub const ELECTRICAL_MARKER: &'static str = ".electrical:";

    pub fn new(id: impl Into<String>) -> Self {
        DataTypeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this spec belongs to the electrical unit family
    pub fn is_electrical(&self) -> bool {
        self.0.contains(Self::ELECTRICAL_MARKER)
    }

    /// Short name without namespace and version (`voltage` for the example above)
    pub fn short_name(&self) -> &str {
        let tail = self.0.rsplit(':').next().unwrap_or(&self.0);
        tail.split('-').next().unwrap_or(tail)
    }
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DataTypeId {
    fn from(id: &str) -> Self {
        DataTypeId(id.to_string())
    }
}

/// Display/format unit identifier
///
/// For example `autodesk.unit.unit:volts-1.0.1`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        UnitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        UnitId(id.to_string())
    }
}

/// A named, typed value slot of a family
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, unique within a family
    pub name: String,
    /// Semantic data type
    pub data_type: DataTypeId,
    /// Primitive storage
    pub storage: StorageKind,
    /// Value is driven by a formula and cannot be written
    #[serde(default)]
    pub formula: bool,
}

impl Parameter {
    /// Create a new writable parameter
    pub fn new(name: impl Into<String>, data_type: impl Into<DataTypeId>, storage: StorageKind) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            storage,
            formula: false,
        }
    }

    /// Mark the parameter as formula-driven
    pub fn with_formula(mut self) -> Self {
        self.formula = true;
        self
    }

    pub fn is_formula_driven(&self) -> bool {
        self.formula
    }

    /// `Name (data type)`, the form used in mapping messages
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.data_type)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One named row ("family type") of a document's type table
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FamilyType {
    pub name: String,
}

impl FamilyType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for FamilyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
