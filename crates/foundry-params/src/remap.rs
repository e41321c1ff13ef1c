// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-type batch remap
//!
//! Moves the values of one family parameter onto another for every family
//! type. Each type is activated exactly once, in the order the document
//! reports, and all of that type's work is done before moving on. A failure
//! for any type aborts the remaining types; run the batch inside
//! [`with_transaction`](foundry_model::with_transaction) to discard the
//! writes already made.

use crate::context::CoercionContext;
use crate::registry::StrategyRegistry;
use crate::strategies::{MappingStrategy, SimpleCoercion};
use foundry_model::{
    ActiveType, FamilyDocument, MappingError, MappingPolicy, Parameter, ParameterValue,
    RemapDataRecord, Result,
};

/// Remap `old` onto `new` with storage type coercion
///
/// Types where `old` has no value get `default`, or are left untouched when
/// there is no default.
pub fn remap(
    document: &mut dyn FamilyDocument,
    old: &Parameter,
    new: &Parameter,
    default: Option<ParameterValue>,
) -> Result<Parameter> {
    let registry = StrategyRegistry::with_default_strategies();
    remap_with_policy(
        document,
        &registry,
        old,
        new,
        MappingPolicy::StorageTypeCoercion.name(),
        default,
    )
}

/// Remap `old` onto `new` with a named policy from `registry`
///
/// The default goes through `policy` as well when the policy accepts bare
/// values and can map it, so an electrical default is converted to internal
/// units like the remapped values. Otherwise it is written with
/// `SimpleCoercion`, as a value already in internal units.
pub fn remap_with_policy(
    document: &mut dyn FamilyDocument,
    registry: &StrategyRegistry,
    old: &Parameter,
    new: &Parameter,
    policy: &str,
    default: Option<ParameterValue>,
) -> Result<Parameter> {
    check_preconditions(document, old, new)?;
    let strategy = registry.strategy(policy)?;
    let default = default
        .filter(|value| !value.is_none())
        .map(|value| CoercionContext::for_value(value, new.clone()));
    let fallback = SimpleCoercion;
    let default_strategy: &dyn MappingStrategy = match &default {
        Some(context) if !strategy.requires_source_parameter() && strategy.can_map(context) => {
            strategy.as_ref()
        }
        _ => &fallback,
    };
    let types = document.family_types();

    log::debug!(
        "Remapping '{}' -> '{}' using {} across {} types in '{}'",
        old.name,
        new.name,
        strategy.name(),
        types.len(),
        document.title()
    );

    for family_type in &types {
        let mut active = ActiveType::activate(document, family_type)?;

        match active.value(old).filter(|value| !value.is_none()) {
            Some(value) => {
                let context = CoercionContext::for_parameter(old.clone(), Some(value), new.clone());
                apply(strategy.as_ref(), &context, &mut active)?;
            }
            None => match &default {
                Some(context) => apply(default_strategy, context, &mut active)?,
                None => log::trace!("[{}] '{}' has no value, skipped", family_type, old.name),
            },
        }
    }

    Ok(new.clone())
}

/// Remap `old` onto `new`, writing `default` wherever `old` is blank
///
/// Blank means no value or empty text. Present values go through a
/// `Strict > StorageTypeCoercion` chain, so matching storage is copied as-is
/// and anything else is coerced.
pub fn remap_coalesce(
    document: &mut dyn FamilyDocument,
    old: &Parameter,
    new: &Parameter,
    default: ParameterValue,
) -> Result<Parameter> {
    if default.is_none() {
        return Err(MappingError::argument(format!(
            "coalescing '{}' into '{}' needs a default value",
            old.name, new.name
        )));
    }
    check_preconditions(document, old, new)?;

    let registry = StrategyRegistry::with_default_strategies();
    let chain = registry.chain(&[
        MappingPolicy::Strict.name(),
        MappingPolicy::StorageTypeCoercion.name(),
    ])?;
    let types = document.family_types();

    log::debug!(
        "Coalescing '{}' -> '{}' across {} types in '{}'",
        old.name,
        new.name,
        types.len(),
        document.title()
    );

    for family_type in &types {
        let mut active = ActiveType::activate(document, family_type)?;

        match active.value(old).filter(|value| !value.is_blank()) {
            Some(value) => {
                let context = CoercionContext::for_parameter(old.clone(), Some(value), new.clone());
                apply(&chain, &context, &mut active)?;
            }
            None => {
                let context = CoercionContext::for_value(default.clone(), new.clone());
                apply(&SimpleCoercion, &context, &mut active)?;
            }
        }
    }

    Ok(new.clone())
}

/// Run a declarative remap record
///
/// Looks both parameters up by name and remaps with the record's policy.
/// Returns `Ok(None)` for a record that was already processed; a successful
/// run marks the record processed.
pub fn remap_record(
    document: &mut dyn FamilyDocument,
    registry: &StrategyRegistry,
    record: &mut RemapDataRecord,
) -> Result<Option<Parameter>> {
    if record.processed {
        log::debug!(
            "Skipping processed record '{}' -> '{}'",
            record.current_name,
            record.new_name
        );
        return Ok(None);
    }

    let old = lookup(document, &record.current_name)?;
    let new = lookup(document, &record.new_name)?;
    let parameter = remap_with_policy(document, registry, &old, &new, &record.policy, None)?;
    record.processed = true;
    Ok(Some(parameter))
}

fn lookup(document: &dyn FamilyDocument, name: &str) -> Result<Parameter> {
    document.parameter(name).ok_or_else(|| {
        MappingError::argument(format!(
            "parameter '{}' is not defined in '{}'",
            name,
            document.title()
        ))
    })
}

fn check_preconditions(document: &dyn FamilyDocument, old: &Parameter, new: &Parameter) -> Result<()> {
    if !document.is_family_document() {
        return Err(MappingError::argument(format!(
            "'{}' is not a family document",
            document.title()
        )));
    }
    lookup(document, &old.name)?;
    lookup(document, &new.name)?;
    Ok(())
}

/// Map one type's value, failing when the strategy declines
fn apply(
    strategy: &dyn MappingStrategy,
    context: &CoercionContext,
    active: &mut ActiveType<'_>,
) -> Result<()> {
    if !strategy.can_map(context) {
        let err = context.cannot_map(strategy.name());
        log::warn!("[{}] {}", active.family_type(), err);
        return Err(err);
    }
    strategy.map(context, active)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFamilyDocument;
    use crate::units::{scales, specs};
    use approx::assert_relative_eq;
    use foundry_model::{with_transaction, StorageKind};

    fn param(name: &str, spec: &str, storage: StorageKind) -> Parameter {
        Parameter::new(name, spec, storage)
    }

    fn three_types() -> MemoryFamilyDocument {
        MemoryFamilyDocument::new("Breaker.rfa")
            .with_type("15A")
            .with_type("20A")
            .with_type("30A")
    }

    fn column(doc: &MemoryFamilyDocument, name: &str) -> Vec<Option<ParameterValue>> {
        doc.column(name)
    }

    #[test]
    fn test_remap_fills_default() {
        let old = param("Old Poles", specs::INTEGER, StorageKind::Integer);
        let new = param("Poles", specs::INTEGER, StorageKind::Integer);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Poles", 10)
            .with_value("30A", "Old Poles", 20);

        let result = remap(&mut doc, &old, &new, Some(5.into())).unwrap();
        assert_eq!(result, new);
        assert_eq!(
            column(&doc, "Poles"),
            vec![Some(10.into()), Some(5.into()), Some(20.into())]
        );
    }

    #[test]
    fn test_electrical_default_converted_like_values() {
        let old = param("Volts", specs::TEXT, StorageKind::String);
        let new = param("Voltage", specs::ELECTRICAL_VOLTAGE, StorageKind::Double);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Volts", "208V")
            .with_value("30A", "Volts", "277");
        let registry = StrategyRegistry::with_default_strategies();

        remap_with_policy(&mut doc, &registry, &old, &new, "ElectricalCoercion", Some("115".into()))
            .unwrap();

        let stored: Vec<f64> = column(&doc, "Voltage")
            .into_iter()
            .map(|v| v.and_then(|v| v.as_double()).unwrap())
            .collect();
        assert_relative_eq!(stored[0], 240.0 * scales::VOLTS);
        assert_relative_eq!(stored[1], 120.0 * scales::VOLTS);
        assert_relative_eq!(stored[2], 277.0 * scales::VOLTS);
    }

    #[test]
    fn test_default_falls_back_to_simple_coercion() {
        let old = param("Old Width", specs::LENGTH, StorageKind::Double);
        let new = param("Width", specs::LENGTH, StorageKind::Double);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Width", 1.5);
        let registry = StrategyRegistry::with_default_strategies();

        // Strict cannot take an integer into a double slot; the default is coerced instead
        remap_with_policy(&mut doc, &registry, &old, &new, "Strict", Some(2.into())).unwrap();
        assert_eq!(
            column(&doc, "Width"),
            vec![Some(1.5.into()), Some(2.0.into()), Some(2.0.into())]
        );
    }

    #[test]
    fn test_remap_without_default_leaves_slot_untouched() {
        let old = param("Old Poles", specs::INTEGER, StorageKind::Integer);
        let new = param("Poles", specs::INTEGER, StorageKind::Integer);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Poles", 10)
            .with_value("20A", "Poles", 99)
            .with_value("30A", "Old Poles", 20);

        remap(&mut doc, &old, &new, None).unwrap();
        assert_eq!(
            column(&doc, "Poles"),
            vec![Some(10.into()), Some(99.into()), Some(20.into())]
        );
    }

    #[test]
    fn test_remap_switches_each_type_once() {
        let old = param("Old Width", specs::LENGTH, StorageKind::Double);
        let new = param("Width", specs::LENGTH, StorageKind::Double);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Width", 1.0)
            .with_value("20A", "Old Width", 2.0)
            .with_value("30A", "Old Width", 3.0);

        remap(&mut doc, &old, &new, None).unwrap();
        assert_eq!(doc.type_switches(), 3);
        assert_eq!(
            column(&doc, "Width"),
            vec![Some(1.0.into()), Some(2.0.into()), Some(3.0.into())]
        );
    }

    #[test]
    fn test_coalesce_treats_empty_text_as_absent() {
        let old = param("Old Rating", specs::TEXT, StorageKind::String);
        let new = param("Rating", specs::INTEGER, StorageKind::Integer);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Rating", "10")
            .with_value("20A", "Old Rating", "")
            .with_value("30A", "Old Rating", "20");

        remap_coalesce(&mut doc, &old, &new, "5".into()).unwrap();
        assert_eq!(
            column(&doc, "Rating"),
            vec![Some(10.into()), Some(5.into()), Some(20.into())]
        );
        assert_eq!(doc.type_switches(), 3);
    }

    #[test]
    fn test_coalesce_copies_matching_storage() {
        let old = param("Old Mark", specs::TEXT, StorageKind::String);
        let new = param("Mark", specs::TEXT, StorageKind::String);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Mark", "A")
            .with_value("30A", "Old Mark", "C");

        remap_coalesce(&mut doc, &old, &new, "-".into()).unwrap();
        assert_eq!(
            column(&doc, "Mark"),
            vec![Some("A".into()), Some("-".into()), Some("C".into())]
        );
    }

    #[test]
    fn test_coalesce_requires_default() {
        let old = param("Old Mark", specs::TEXT, StorageKind::String);
        let new = param("Mark", specs::TEXT, StorageKind::String);
        let mut doc = three_types().with_parameter(old.clone()).with_parameter(new.clone());

        let err = remap_coalesce(&mut doc, &old, &new, ParameterValue::None).unwrap_err();
        assert!(err.is_argument());
        assert_eq!(doc.type_switches(), 0);
    }

    #[test]
    fn test_preconditions() {
        let old = param("Old Mark", specs::TEXT, StorageKind::String);
        let new = param("Mark", specs::TEXT, StorageKind::String);

        let mut project = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_family_editing(false);
        let err = remap(&mut project, &old, &new, None).unwrap_err();
        assert!(err.is_argument());
        assert!(err.to_string().contains("Breaker.rfa"));
        assert_eq!(project.type_switches(), 0);

        let mut missing = three_types().with_parameter(old.clone());
        let err = remap(&mut missing, &old, &new, None).unwrap_err();
        assert!(err.is_argument());
        assert!(err.to_string().contains("Mark"));
    }

    #[test]
    fn test_failure_aborts_remaining_types() {
        let old = param("Old Rating", specs::TEXT, StorageKind::String);
        let new = param("Rating", specs::INTEGER, StorageKind::Integer);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Rating", "15")
            .with_value("20A", "Old Rating", "twenty")
            .with_value("30A", "Old Rating", "30");

        let err = remap(&mut doc, &old, &new, None).unwrap_err();
        assert!(matches!(err, MappingError::CannotMap { .. }));
        assert_eq!(column(&doc, "Rating"), vec![Some(15.into()), None, None]);
        assert_eq!(doc.type_switches(), 2);
    }

    #[test]
    fn test_transaction_discards_whole_batch() {
        let old = param("Old Rating", specs::TEXT, StorageKind::String);
        let new = param("Rating", specs::INTEGER, StorageKind::Integer);
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Rating", "15")
            .with_value("20A", "Old Rating", "20")
            .with_value("30A", "Old Rating", "thirty")
            .requiring_transactions();

        let result = with_transaction(&mut doc, "Remap Rating", |doc| {
            remap(doc, &old, &new, None)
        });

        assert!(result.is_err());
        assert_eq!(column(&doc, "Rating"), vec![None, None, None]);
        assert_eq!(doc.open_transaction(), None);
    }

    #[test]
    fn test_formula_target_propagates() {
        let old = param("Old Area", specs::NUMBER, StorageKind::Double);
        let new = param("Area", specs::NUMBER, StorageKind::Double).with_formula();
        let mut doc = three_types()
            .with_parameter(old.clone())
            .with_parameter(new.clone())
            .with_value("15A", "Old Area", 1.0);

        let err = remap(&mut doc, &old, &new, None).unwrap_err();
        assert!(matches!(err, MappingError::InvalidOperation(_)));
    }

    #[test]
    fn test_remap_record() {
        let mut doc = three_types()
            .with_parameter(param("Old Mark", specs::TEXT, StorageKind::String))
            .with_parameter(param("Mark", specs::TEXT, StorageKind::String))
            .with_value("15A", "Old Mark", "A")
            .with_value("20A", "Old Mark", "B")
            .with_value("30A", "Old Mark", "C");
        let registry = StrategyRegistry::with_default_strategies();
        let mut record = RemapDataRecord::new("Old Mark", "Mark").with_policy("strict");

        let parameter = remap_record(&mut doc, &registry, &mut record).unwrap();
        assert_eq!(parameter.map(|p| p.name), Some("Mark".to_string()));
        assert!(record.processed);
        assert_eq!(
            column(&doc, "Mark"),
            vec![Some("A".into()), Some("B".into()), Some("C".into())]
        );

        // Already processed: nothing happens
        assert_eq!(remap_record(&mut doc, &registry, &mut record).unwrap(), None);
        assert_eq!(doc.type_switches(), 3);
    }

    #[test]
    fn test_remap_record_errors() {
        let mut doc = three_types().with_parameter(param("Mark", specs::TEXT, StorageKind::String));
        let registry = StrategyRegistry::with_default_strategies();

        let mut record = RemapDataRecord::new("Missing", "Mark");
        assert!(remap_record(&mut doc, &registry, &mut record).unwrap_err().is_argument());
        assert!(!record.processed);

        let mut record = RemapDataRecord::new("Mark", "Mark").with_policy("Fuzzy");
        let err = remap_record(&mut doc, &registry, &mut record).unwrap_err();
        assert!(matches!(err, MappingError::UnknownPolicy { .. }));
        assert!(!record.processed);
    }
}
