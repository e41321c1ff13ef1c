// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping policies and declarative remap records

use crate::MappingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in mapping policies, in order of strictness
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub enum MappingPolicy {
    /// Storage kinds must match exactly
    Strict,
    /// Coerce between storage kinds (bool→int, int→double, text→number)
    #[default]
    StorageTypeCoercion,
    /// Numeric extraction plus unit conversion into electrical parameters
    ElectricalCoercion,
    /// Storage coercion driven only by the runtime kind of a bare value
    SimpleCoercion,
}

impl MappingPolicy {
    /// All built-in policies in registration order
    pub const ALL: [MappingPolicy; 4] = [
        MappingPolicy::Strict,
        MappingPolicy::StorageTypeCoercion,
        MappingPolicy::ElectricalCoercion,
        MappingPolicy::SimpleCoercion,
    ];

    /// Registry name of the policy
    pub fn name(&self) -> &'static str {
        match self {
            MappingPolicy::Strict => "Strict",
            MappingPolicy::StorageTypeCoercion => "StorageTypeCoercion",
            MappingPolicy::ElectricalCoercion => "ElectricalCoercion",
            MappingPolicy::SimpleCoercion => "SimpleCoercion",
        }
    }

    /// Case-insensitive lookup
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl FromStr for MappingPolicy {
    type Err = MappingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| MappingError::UnknownPolicy {
            name: s.to_string(),
            known: Self::ALL.iter().map(|p| p.name().to_string()).collect(),
        })
    }
}

impl fmt::Display for MappingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_policy() -> String {
    MappingPolicy::default().name().to_string()
}

/// Declarative request to move one parameter's values onto another
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemapDataRecord {
    /// Name of the parameter currently holding the values
    pub current_name: String,
    /// Name of the parameter receiving them
    pub new_name: String,
    /// Registry name of the policy to use
    #[serde(default = "default_policy")]
    pub policy: String,
    /// Set once the record has been applied
    #[serde(default)]
    pub processed: bool,
}

impl RemapDataRecord {
    /// Create a record using the default policy
    pub fn new(current_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            current_name: current_name.into(),
            new_name: new_name.into(),
            policy: default_policy(),
            processed: false,
        }
    }

    /// Use a specific policy
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = policy.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse_case_insensitive() {
        assert_eq!(MappingPolicy::parse("strict"), Some(MappingPolicy::Strict));
        assert_eq!(
            MappingPolicy::parse("ELECTRICALCOERCION"),
            Some(MappingPolicy::ElectricalCoercion)
        );
        assert_eq!(MappingPolicy::parse("fuzzy"), None);
    }

    #[test]
    fn test_policy_from_str_error_lists_names() {
        let err = "fuzzy".parse::<MappingPolicy>().unwrap_err();
        match err {
            MappingError::UnknownPolicy { name, known } => {
                assert_eq!(name, "fuzzy");
                assert_eq!(known.len(), 4);
                assert!(known.contains(&"SimpleCoercion".to_string()));
            }
            other => panic!("Expected UnknownPolicy, got {:?}", other),
        }
    }

    #[test]
    fn test_record_defaults() {
        let record: RemapDataRecord =
            serde_json::from_str(r#"{"current_name":"Volts","new_name":"Voltage"}"#).unwrap();
        assert_eq!(record.policy, "StorageTypeCoercion");
        assert!(!record.processed);
        assert_eq!(record, RemapDataRecord::new("Volts", "Voltage"));
    }

    #[test]
    fn test_record_with_policy() {
        let record = RemapDataRecord::new("A", "B").with_policy("Strict");
        assert_eq!(record.policy, "Strict");
    }
}
