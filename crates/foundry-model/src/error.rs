// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for parameter mapping operations

use thiserror::Error;

/// Result type alias for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors that can occur while mapping parameter values
///
/// A strategy answering "no" from `can_map` is not an error. It only becomes
/// [`MappingError::CannotMap`] once the dispatcher turns it into a failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Bad input: missing parameter, unsupported value kind, wrong document
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// No numeric token could be extracted from the text
    #[error("Cannot extract a number from '{0}'")]
    Parse(String),

    /// Policy name not present in the registry
    #[error("Unknown mapping policy '{name}'. Valid policies: {}", .known.join(", "))]
    UnknownPolicy { name: String, known: Vec<String> },

    /// The host rejected the operation (formula-driven target, no current type, ...)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Unit lookup or conversion failed
    #[error("Unit conversion failed for '{parameter}': {message}")]
    UnitConversion { parameter: String, message: String },

    /// The requested strategy cannot handle the source/target pair
    #[error("Cannot map {from} ({from_type}) to {to} ({to_type}) using {policy}")]
    CannotMap {
        from: String,
        from_type: String,
        to: String,
        to_type: String,
        policy: String,
    },

    /// Every member of a strategy chain declined
    #[error("No suitable strategy found to map {from} to {to}")]
    NoSuitableStrategy { from: String, to: String },

    /// Failure surfaced by the fluent mapper, with the inner cause
    #[error("Cannot map {from} to {to}: {inner}")]
    Mapping {
        from: String,
        to: String,
        #[source]
        inner: Box<MappingError>,
    },
}

impl MappingError {
    /// Create an argument error
    pub fn argument(msg: impl Into<String>) -> Self {
        MappingError::Argument(msg.into())
    }

    /// Create a parse error for the offending text
    pub fn parse(text: impl Into<String>) -> Self {
        MappingError::Parse(text.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        MappingError::InvalidOperation(msg.into())
    }

    /// Create a unit conversion error
    pub fn unit_conversion(parameter: impl Into<String>, msg: impl Into<String>) -> Self {
        MappingError::UnitConversion {
            parameter: parameter.into(),
            message: msg.into(),
        }
    }

    /// Wrap an error with the source and target descriptions
    pub fn mapping(from: impl Into<String>, to: impl Into<String>, inner: MappingError) -> Self {
        MappingError::Mapping {
            from: from.into(),
            to: to.into(),
            inner: Box::new(inner),
        }
    }

    /// Whether this error belongs to the argument family
    pub fn is_argument(&self) -> bool {
        matches!(
            self,
            MappingError::Argument(_) | MappingError::Parse(_) | MappingError::UnknownPolicy { .. }
        )
    }

    /// Innermost error, looking through [`MappingError::Mapping`] wrappers
    pub fn root(&self) -> &MappingError {
        match self {
            MappingError::Mapping { inner, .. } => inner.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_policy_lists_names() {
        let err = MappingError::UnknownPolicy {
            name: "Fuzzy".to_string(),
            known: vec!["Strict".to_string(), "SimpleCoercion".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown mapping policy 'Fuzzy'. Valid policies: Strict, SimpleCoercion"
        );
        assert!(err.is_argument());
    }

    #[test]
    fn test_mapping_wraps_inner() {
        let err = MappingError::mapping(
            "Voltage (text)",
            "Load Voltage (voltage)",
            MappingError::parse("n/a"),
        );
        assert_eq!(
            err.to_string(),
            "Cannot map Voltage (text) to Load Voltage (voltage): Cannot extract a number from 'n/a'"
        );
        assert_eq!(err.root(), &MappingError::Parse("n/a".to_string()));
        assert!(!err.is_argument());
    }
}
