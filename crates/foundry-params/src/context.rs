// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Immutable snapshot of a single mapping request

use foundry_model::{
    ActiveType, DataTypeId, MappingError, Parameter, ParameterValue, StorageKind, ValueKind,
};

/// What a mapping reads from
#[derive(Clone, Debug, PartialEq)]
pub enum MappingSource {
    /// A bare value with no parameter metadata
    Value(ParameterValue),
    /// Another parameter, read under the active type
    Parameter(Parameter),
}

impl From<ParameterValue> for MappingSource {
    fn from(value: ParameterValue) -> Self {
        MappingSource::Value(value)
    }
}

impl From<Parameter> for MappingSource {
    fn from(parameter: Parameter) -> Self {
        MappingSource::Parameter(parameter)
    }
}

impl From<&Parameter> for MappingSource {
    fn from(parameter: &Parameter) -> Self {
        MappingSource::Parameter(parameter.clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
enum SourceSnapshot {
    Value(ParameterValue),
    Parameter {
        parameter: Parameter,
        value: Option<ParameterValue>,
    },
}

/// Everything a strategy may look at when deciding and performing a mapping
///
/// Built fresh for every mapping call. Unit conversion goes through the
/// [`ActiveType`] handed to `map`, so the context itself holds no document.
#[derive(Clone, Debug, PartialEq)]
pub struct CoercionContext {
    source: SourceSnapshot,
    target: Parameter,
}

impl CoercionContext {
    /// Context for a bare value
    pub fn for_value(value: ParameterValue, target: Parameter) -> Self {
        Self {
            source: SourceSnapshot::Value(value),
            target,
        }
    }

    /// Context for a source parameter and its value under the active type
    pub fn for_parameter(source: Parameter, value: Option<ParameterValue>, target: Parameter) -> Self {
        Self {
            source: SourceSnapshot::Parameter {
                parameter: source,
                value,
            },
            target,
        }
    }

    /// Snapshot `source` as seen by the active type
    pub fn capture(active: &ActiveType<'_>, source: &MappingSource, target: &Parameter) -> Self {
        match source {
            MappingSource::Value(value) => Self::for_value(value.clone(), target.clone()),
            MappingSource::Parameter(parameter) => {
                Self::for_parameter(parameter.clone(), active.value(parameter), target.clone())
            }
        }
    }

    /// Source parameter, if the source is one
    pub fn source_parameter(&self) -> Option<&Parameter> {
        match &self.source {
            SourceSnapshot::Parameter { parameter, .. } => Some(parameter),
            SourceSnapshot::Value(_) => None,
        }
    }

    /// Source value; `None` when a source parameter has no value
    pub fn source_value(&self) -> Option<&ParameterValue> {
        match &self.source {
            SourceSnapshot::Value(value) => Some(value),
            SourceSnapshot::Parameter { value, .. } => value.as_ref(),
        }
    }

    /// Runtime kind of the source value alone
    pub fn value_kind(&self) -> ValueKind {
        self.source_value()
            .map(ParameterValue::kind)
            .unwrap_or(ValueKind::None)
    }

    /// Kind of the source: the parameter's storage when there is one,
    /// otherwise the value's runtime kind
    pub fn source_kind(&self) -> ValueKind {
        match &self.source {
            SourceSnapshot::Parameter { parameter, .. } => ValueKind::from(parameter.storage),
            SourceSnapshot::Value(value) => value.kind(),
        }
    }

    /// Source text, if the source value is text
    pub fn source_text(&self) -> Option<&str> {
        self.source_value().and_then(ParameterValue::as_text)
    }

    /// Source data type, only known for parameter sources
    pub fn source_data_type(&self) -> Option<&DataTypeId> {
        self.source_parameter().map(|p| &p.data_type)
    }

    pub fn target(&self) -> &Parameter {
        &self.target
    }

    pub fn target_storage(&self) -> StorageKind {
        self.target.storage
    }

    pub fn target_data_type(&self) -> &DataTypeId {
        &self.target.data_type
    }

    /// Name used for the source in messages
    pub fn source_name(&self) -> String {
        match &self.source {
            SourceSnapshot::Parameter { parameter, .. } => parameter.name.clone(),
            SourceSnapshot::Value(value) => format!("value {}", value),
        }
    }

    /// Type used for the source in messages: data type or runtime kind
    pub fn source_type_name(&self) -> String {
        match &self.source {
            SourceSnapshot::Parameter { parameter, .. } => parameter.data_type.to_string(),
            SourceSnapshot::Value(value) => value.kind().name().to_string(),
        }
    }

    /// Source value, or an argument error naming the empty source
    pub(crate) fn require_value(&self) -> foundry_model::Result<&ParameterValue> {
        self.source_value().ok_or_else(|| {
            MappingError::argument(format!(
                "source '{}' has no value to map onto '{}'",
                self.source_name(),
                self.target.name
            ))
        })
    }

    /// Failure describing both sides and the policy that declined
    pub fn cannot_map(&self, policy: &str) -> MappingError {
        MappingError::CannotMap {
            from: self.source_name(),
            from_type: self.source_type_name(),
            to: self.target.name.clone(),
            to_type: self.target.data_type.to_string(),
            policy: policy.to_string(),
        }
    }
}
