// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Strategy Registry - Policy name dispatch
//!
//! Resolves a policy name to a registered [`MappingStrategy`], binds it to a
//! freshly captured [`CoercionContext`] and, through [`map_value`], turns a
//! negative `can_map` into a descriptive [`MappingError::CannotMap`].

use crate::context::{CoercionContext, MappingSource};
use crate::strategies::{
    ChainStrategy, ElectricalCoercion, MappingStrategy, SimpleCoercion, StorageTypeCoercion,
    StrictStrategy,
};
use foundry_model::{
    ActiveType, FamilyDocument, MappingError, MappingPolicy, Parameter, Result,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Registry of mapping strategies by name
///
/// Names are matched case-insensitively. Registering a strategy under a name
/// that already exists replaces the earlier one in place.
pub struct StrategyRegistry {
    /// Strategies in registration order
    strategies: Vec<Arc<dyn MappingStrategy>>,
    /// Lowercased name -> index into `strategies`
    index: FxHashMap<String, usize>,
}

impl StrategyRegistry {
    /// Create a registry without any strategies
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Create a registry with the built-in policies registered
    ///
    /// - `Strict`
    /// - `StorageTypeCoercion`
    /// - `ElectricalCoercion`
    /// - `SimpleCoercion`
    pub fn with_default_strategies() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StrictStrategy::new()));
        registry.register(Arc::new(StorageTypeCoercion::new()));
        registry.register(Arc::new(ElectricalCoercion::new()));
        registry.register(Arc::new(SimpleCoercion::new()));
        registry
    }

    /// Register a strategy under its own name
    pub fn register(&mut self, strategy: Arc<dyn MappingStrategy>) {
        let key = strategy.name().to_lowercase();
        match self.index.get(&key) {
            Some(&slot) => self.strategies[slot] = strategy,
            None => {
                self.index.insert(key, self.strategies.len());
                self.strategies.push(strategy);
            }
        }
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    /// Check if a name is registered
    pub fn has_strategy(&self, name: &str) -> bool {
        self.index.contains_key(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Look up a strategy by name
    pub fn strategy(&self, name: &str) -> Result<Arc<dyn MappingStrategy>> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&slot| Arc::clone(&self.strategies[slot]))
            .ok_or_else(|| MappingError::UnknownPolicy {
                name: name.to_string(),
                known: self.names(),
            })
    }

    /// First-match chain over the named strategies
    pub fn chain(&self, names: &[&str]) -> Result<ChainStrategy> {
        let members = names
            .iter()
            .map(|name| self.strategy(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(ChainStrategy::new(members))
    }

    /// Resolve `policy` and bind it to a snapshot of the mapping request
    ///
    /// Strategies that introspect the source parameter's metadata cannot be
    /// used with a bare value; asking for one is an argument error.
    pub fn get_strategy(
        &self,
        policy: &str,
        active: &ActiveType<'_>,
        source: &MappingSource,
        target: &Parameter,
    ) -> Result<BoundStrategy> {
        let strategy = self.strategy(policy)?;

        if strategy.requires_source_parameter() {
            if let MappingSource::Value(value) = source {
                return Err(MappingError::argument(format!(
                    "policy '{}' needs a source parameter, got value {}",
                    strategy.name(),
                    value
                )));
            }
        }

        let context = CoercionContext::capture(active, source, target);
        log::debug!(
            "Resolved {} for {} -> {} [{}]",
            strategy.name(),
            context.source_name(),
            target.name,
            active.family_type()
        );

        Ok(BoundStrategy { strategy, context })
    }

    /// Map `source` onto `target` for the active type
    ///
    /// Without a policy, parameter sources use `StorageTypeCoercion` and
    /// bare values use `SimpleCoercion`. Both policies accept either source.
    pub fn map_value(
        &self,
        active: &mut ActiveType<'_>,
        source: &MappingSource,
        target: &Parameter,
        policy: Option<&str>,
    ) -> Result<Parameter> {
        let policy = policy.unwrap_or_else(|| default_policy(source).name());
        let bound = self.get_strategy(policy, active, source, target)?;

        if !bound.can_map() {
            let err = bound.context().cannot_map(bound.name());
            log::warn!("{}", err);
            return Err(err);
        }

        bound.map(active)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_default_strategies()
    }
}

/// Policy used when the caller names none
pub fn default_policy(source: &MappingSource) -> MappingPolicy {
    match source {
        MappingSource::Parameter(_) => MappingPolicy::StorageTypeCoercion,
        MappingSource::Value(_) => MappingPolicy::SimpleCoercion,
    }
}

/// A strategy together with the context it was resolved for
pub struct BoundStrategy {
    strategy: Arc<dyn MappingStrategy>,
    context: CoercionContext,
}

impl BoundStrategy {
    pub fn name(&self) -> &str {
        self.strategy.name()
    }

    pub fn strategy(&self) -> &Arc<dyn MappingStrategy> {
        &self.strategy
    }

    pub fn context(&self) -> &CoercionContext {
        &self.context
    }

    pub fn can_map(&self) -> bool {
        self.strategy.can_map(&self.context)
    }

    pub fn map(&self, active: &mut ActiveType<'_>) -> Result<Parameter> {
        self.strategy.map(&self.context, active)
    }
}

/// Resolve a built-in policy against the document's current type
pub fn get_strategy(
    document: &mut dyn FamilyDocument,
    policy: &str,
    source: &MappingSource,
    target: &Parameter,
) -> Result<BoundStrategy> {
    let active = ActiveType::current(document)?;
    StrategyRegistry::with_default_strategies().get_strategy(policy, &active, source, target)
}

/// Map a value or parameter onto `target` for the document's current type
pub fn map_value(
    document: &mut dyn FamilyDocument,
    source: impl Into<MappingSource>,
    target: &Parameter,
    policy: Option<&str>,
) -> Result<Parameter> {
    let source = source.into();
    let mut active = ActiveType::current(document)?;
    StrategyRegistry::with_default_strategies().map_value(&mut active, &source, target, policy)
}

/// Names of the built-in policies
pub fn get_all_strategies() -> Vec<String> {
    StrategyRegistry::with_default_strategies().names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFamilyDocument;
    use crate::units::specs;
    use foundry_model::{ParameterValue, StorageKind};

    fn document() -> MemoryFamilyDocument {
        MemoryFamilyDocument::new("Panel.rfa")
            .with_type("100A")
            .with_parameter(Parameter::new("Mark", specs::TEXT, StorageKind::String))
            .with_parameter(Parameter::new("Poles", specs::INTEGER, StorageKind::Integer))
            .with_parameter(Parameter::new("Rating", specs::TEXT, StorageKind::String))
            .with_parameter(Parameter::new("Width", specs::LENGTH, StorageKind::Double))
            .with_value("100A", "Rating", "42")
            .with_value("100A", "Poles", 3)
    }

    fn param(doc: &MemoryFamilyDocument, name: &str) -> Parameter {
        doc.parameter(name).unwrap()
    }

    #[test]
    fn test_default_names() {
        let registry = StrategyRegistry::with_default_strategies();
        assert_eq!(
            registry.names(),
            vec![
                "Strict",
                "StorageTypeCoercion",
                "ElectricalCoercion",
                "SimpleCoercion"
            ]
        );
        assert_eq!(get_all_strategies(), registry.names());
        assert_eq!(registry.len(), MappingPolicy::ALL.len());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = StrategyRegistry::with_default_strategies();
        assert_eq!(registry.strategy("strict").unwrap().name(), "Strict");
        assert_eq!(registry.strategy(" ELECTRICALCOERCION ").unwrap().name(), "ElectricalCoercion");
        assert!(registry.has_strategy("simplecoercion"));
        assert!(!StrategyRegistry::new().has_strategy("Strict"));
    }

    #[test]
    fn test_unknown_policy_lists_registered_names() {
        let mut doc = document();
        let target = param(&doc, "Mark");
        let source = MappingSource::Value("x".into());
        let err = get_strategy(&mut doc, "nonexistent", &source, &target)
            .err()
            .unwrap();

        match &err {
            MappingError::UnknownPolicy { name, known } => {
                assert_eq!(name, "nonexistent");
                assert!(!known.is_empty());
                assert_eq!(known, &get_all_strategies());
            }
            other => panic!("Expected UnknownPolicy, got {:?}", other),
        }
        assert!(err.is_argument());
        for name in get_all_strategies() {
            assert!(err.to_string().contains(&name));
        }
    }

    /// Copies only between parameters of the same data type
    struct SameDataType;

    impl MappingStrategy for SameDataType {
        fn name(&self) -> &str {
            "SameDataType"
        }

        fn can_map(&self, context: &CoercionContext) -> bool {
            context.source_data_type() == Some(context.target_data_type())
        }

        fn map(&self, context: &CoercionContext, active: &mut ActiveType<'_>) -> Result<Parameter> {
            StrictStrategy.map(context, active)
        }

        fn requires_source_parameter(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_value_source_rejected_by_parameter_only_policy() {
        let mut registry = StrategyRegistry::with_default_strategies();
        registry.register(Arc::new(SameDataType));

        let mut doc = document();
        let target = param(&doc, "Mark");
        let mut active = ActiveType::current(&mut doc).unwrap();
        let err = registry
            .map_value(&mut active, &MappingSource::Value("A-1".into()), &target, Some("SameDataType"))
            .unwrap_err();
        assert!(err.is_argument());
        assert_eq!(doc.value("100A", "Mark"), None);
    }

    #[test]
    fn test_storage_coercion_accepts_bare_values() {
        let mut doc = document();
        let poles = param(&doc, "Poles");
        map_value(&mut doc, ParameterValue::Bool(true), &poles, Some("StorageTypeCoercion")).unwrap();
        assert_eq!(doc.value("100A", "Poles"), Some(&ParameterValue::Integer(1)));

        map_value(&mut doc, ParameterValue::Bool(false), &poles, Some("StorageTypeCoercion")).unwrap();
        assert_eq!(doc.value("100A", "Poles"), Some(&ParameterValue::Integer(0)));

        let width = param(&doc, "Width");
        map_value(&mut doc, ParameterValue::from(2), &width, Some("StorageTypeCoercion")).unwrap();
        assert_eq!(doc.value("100A", "Width"), Some(&ParameterValue::Double(2.0)));
    }

    #[test]
    fn test_default_policy_by_source() {
        assert_eq!(
            default_policy(&MappingSource::Value(1.into())),
            MappingPolicy::SimpleCoercion
        );

        let mut doc = document();
        let source = param(&doc, "Rating");
        let target = param(&doc, "Poles");
        map_value(&mut doc, &source, &target, None).unwrap();
        assert_eq!(doc.value("100A", "Poles"), Some(&ParameterValue::Integer(42)));

        let mark = param(&doc, "Mark");
        map_value(&mut doc, ParameterValue::from("A-7"), &mark, None).unwrap();
        assert_eq!(doc.value("100A", "Mark"), Some(&ParameterValue::from("A-7")));
    }

    #[test]
    fn test_cannot_map_is_descriptive_and_writes_nothing() {
        let mut doc = document();
        let source = param(&doc, "Rating");
        let target = param(&doc, "Poles");
        let err = map_value(&mut doc, &source, &target, Some("strict")).unwrap_err();

        match &err {
            MappingError::CannotMap {
                from,
                from_type,
                to,
                to_type,
                policy,
            } => {
                assert_eq!(from, "Rating");
                assert_eq!(from_type, specs::TEXT);
                assert_eq!(to, "Poles");
                assert_eq!(to_type, specs::INTEGER);
                assert_eq!(policy, "Strict");
            }
            other => panic!("Expected CannotMap, got {:?}", other),
        }
        assert_eq!(doc.value("100A", "Poles"), Some(&ParameterValue::Integer(3)));
    }

    #[test]
    fn test_map_value_is_idempotent() {
        let mut doc = document();
        let source = param(&doc, "Rating");
        let target = param(&doc, "Width");

        for policy in ["StorageTypeCoercion", "SimpleCoercion"] {
            map_value(&mut doc, &source, &target, Some(policy)).unwrap();
            let first = doc.value("100A", "Width").cloned();
            map_value(&mut doc, &source, &target, Some(policy)).unwrap();
            assert_eq!(doc.value("100A", "Width").cloned(), first);
            assert_eq!(first, Some(ParameterValue::Double(42.0)));
        }

        let mark = param(&doc, "Mark");
        map_value(&mut doc, &source, &mark, Some("Strict")).unwrap();
        map_value(&mut doc, &source, &mark, Some("Strict")).unwrap();
        assert_eq!(doc.value("100A", "Mark"), Some(&ParameterValue::from("42")));
    }

    #[test]
    fn test_registry_chain() {
        let registry = StrategyRegistry::with_default_strategies();
        let chain = registry.chain(&["strict", "StorageTypeCoercion"]).unwrap();
        assert_eq!(chain.name(), "Strict > StorageTypeCoercion");

        let mut doc = document();
        let source = param(&doc, "Poles");
        let target = param(&doc, "Width");
        let mut active = ActiveType::current(&mut doc).unwrap();
        let ctx = CoercionContext::capture(&active, &MappingSource::from(&source), &target);
        assert!(chain.can_map(&ctx));
        chain.map(&ctx, &mut active).unwrap();
        assert_eq!(doc.value("100A", "Width"), Some(&ParameterValue::Double(3.0)));

        assert!(registry.chain(&["Strict", "Fuzzy"]).is_err());
    }

    #[test]
    fn test_register_custom_chain() {
        let mut registry = StrategyRegistry::new();
        registry.register(Arc::new(StrictStrategy));
        let chain = ChainStrategy::new(vec![Arc::new(StrictStrategy), Arc::new(SimpleCoercion)]);
        registry.register(Arc::new(chain));
        assert_eq!(registry.names(), vec!["Strict", "Strict > SimpleCoercion"]);

        // Re-registering replaces in place
        registry.register(Arc::new(StrictStrategy));
        assert_eq!(registry.len(), 2);

        let mut doc = document();
        let target = param(&doc, "Width");
        let mut active = ActiveType::current(&mut doc).unwrap();
        registry
            .map_value(
                &mut active,
                &MappingSource::Value("1.5".into()),
                &target,
                Some("strict > simplecoercion"),
            )
            .unwrap();
        assert_eq!(doc.value("100A", "Width"), Some(&ParameterValue::Double(1.5)));
    }
}
