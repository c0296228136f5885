//! Property-based test generators using proptest.

use proptest::prelude::*;
use rowmodel_core::{Predicate, Value};

/// Strategy producing arbitrary scalar values.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9f64..1.0e9).prop_map(Value::Real),
        "[a-zA-Z0-9 ]{0,24}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Blob),
    ]
}

/// Strategy producing allow-list-valid identifiers.
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,15}"
}

#[derive(Debug, Clone)]
enum GeneratedCondition {
    Eq(Value),
    IsNull,
    In(Vec<Value>),
}

fn condition_strategy() -> impl Strategy<Value = GeneratedCondition> {
    prop_oneof![
        value_strategy().prop_map(GeneratedCondition::Eq),
        Just(GeneratedCondition::IsNull),
        proptest::collection::vec(value_strategy(), 1..5).prop_map(GeneratedCondition::In),
    ]
}

/// Strategy producing non-empty conjunctive predicates.
pub fn predicate_strategy() -> impl Strategy<Value = Predicate> {
    proptest::collection::vec((identifier_strategy(), condition_strategy()), 1..5).prop_map(
        |conditions| {
            let mut predicate = Predicate::new();
            for (column, condition) in conditions {
                predicate = match condition {
                    GeneratedCondition::Eq(value) => predicate.eq(&column, value),
                    GeneratedCondition::IsNull => predicate.is_null(&column),
                    GeneratedCondition::In(values) => predicate.any_of(&column, values),
                };
            }
            predicate
        },
    )
}
