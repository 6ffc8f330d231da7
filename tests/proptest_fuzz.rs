//! Property-based tests (fuzzing) for condition decoding and compilation.
//!
//! Uses proptest to generate random condition trees and malformed JSON, and
//! checks the compiler's structural guarantees plus clean-error behavior.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;
use serde_json::{json, Value};

use redis_repository::search::{
    Combinator, Condition, ConditionCompiler, ConditionGroup, ConditionNode, ConditionValue,
    Operator, QueryError, QueryFactory, QuerySpec, Scalar,
};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Scalars that survive a JSON round trip unchanged (no floats)
fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Null),
        any::<bool>().prop_map(Scalar::Bool),
        any::<i64>().prop_map(Scalar::Int),
        "[a-zA-Z0-9]{1,8}".prop_map(Scalar::Text),
    ]
}

/// Well-formed leaf: list value for in/nin, scalar otherwise
fn condition_strategy() -> impl Strategy<Value = Condition> {
    (
        "[a-z][a-z_]{0,7}",
        prop::sample::select(Operator::ALL.to_vec()),
        scalar_strategy(),
        prop::collection::vec(scalar_strategy(), 0..4),
    )
        .prop_map(|(field, operator, scalar, list)| {
            let value = if operator.takes_list() {
                ConditionValue::List(list)
            } else {
                ConditionValue::Scalar(scalar)
            };
            Condition::new(field, operator, value)
        })
}

fn combinator_strategy() -> impl Strategy<Value = Combinator> {
    prop_oneof![Just(Combinator::And), Just(Combinator::Or)]
}

/// Arbitrary well-formed condition trees
fn node_strategy() -> impl Strategy<Value = ConditionNode> {
    let leaf = condition_strategy().prop_map(ConditionNode::from);

    leaf.prop_recursive(
        4,  // depth
        32, // max nodes
        4,  // operands per group
        |inner| {
            (combinator_strategy(), prop::collection::vec(inner, 0..4))
                .prop_map(|(combinator, operands)| ConditionGroup::new(combinator, operands).into())
        },
    )
}

/// Arbitrary JSON values (mostly not condition-shaped)
fn arbitrary_json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        prop_oneof![
            Just("field".to_string()),
            Just("operator".to_string()),
            Just("eq".to_string()),
            Just("and".to_string()),
            ".*",
        ]
        .prop_map(Value::String),
    ];

    leaf.prop_recursive(
        4,  // depth
        64, // max nodes
        8,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("field".to_string()),
                        Just("operator".to_string()),
                        Just("value".to_string()),
                        Just("operands".to_string()),
                        Just("combinator".to_string()),
                        Just("result".to_string()),
                        "[a-z]{1,6}",
                    ],
                    inner,
                    0..6,
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

// =============================================================================
// Compiler properties
// =============================================================================

proptest! {
    /// Well-formed trees always compile
    #[test]
    fn prop_well_formed_tree_compiles(node in node_strategy()) {
        prop_assert!(ConditionCompiler::compile_node(&node).is_ok());
    }

    /// Every group is wrapped in exactly one pair of outer parentheses
    #[test]
    fn prop_group_is_parenthesized(node in node_strategy()) {
        if let ConditionNode::Group(_) = node {
            let compiled = ConditionCompiler::compile_node(&node).unwrap();
            prop_assert!(compiled.starts_with('('));
            prop_assert!(compiled.ends_with(')'));
        }
    }

    /// A group compiles to its operands' output joined by the keyword
    #[test]
    fn prop_group_joins_children(
        combinator in combinator_strategy(),
        operands in prop::collection::vec(node_strategy(), 0..4),
    ) {
        let children: Vec<String> = operands
            .iter()
            .map(|n| ConditionCompiler::compile_node(n).unwrap())
            .collect();
        let group: ConditionNode = ConditionGroup::new(combinator, operands).into();

        let expected = format!("({})", children.join(&format!(" {} ", combinator.keyword())));
        prop_assert_eq!(ConditionCompiler::compile_node(&group).unwrap(), expected);
    }

    /// Compilation is deterministic
    #[test]
    fn prop_compile_deterministic(node in node_strategy()) {
        prop_assert_eq!(
            ConditionCompiler::compile_node(&node).unwrap(),
            ConditionCompiler::compile_node(&node.clone()).unwrap()
        );
    }

    /// in / nin emit one clause per list element
    #[test]
    fn prop_set_operators_one_clause_per_value(
        values in prop::collection::vec("[a-z]{1,6}", 1..6),
        negate in any::<bool>(),
    ) {
        let condition = if negate {
            Condition::not_in("tag", values.clone())
        } else {
            Condition::is_in("tag", values.clone())
        };
        let compiled = ConditionCompiler::compile_node(&condition.into()).unwrap();
        prop_assert_eq!(compiled.matches("@tag:{").count(), values.len());
    }

    /// Set operators reject scalars; scalar operators reject lists
    #[test]
    fn prop_value_shape_mismatch_rejected(
        operator in prop::sample::select(Operator::ALL.to_vec()),
        scalar in scalar_strategy(),
    ) {
        let value = if operator.takes_list() {
            ConditionValue::Scalar(scalar)
        } else {
            ConditionValue::List(vec![scalar])
        };
        let result = ConditionCompiler::compile_node(&Condition::new("f", operator, value).into());
        prop_assert!(matches!(result, Err(QueryError::InvalidConditionFormat(_))));
    }
}

// =============================================================================
// Decoding properties
// =============================================================================

proptest! {
    /// Serialized trees decode back to the same tree
    #[test]
    fn prop_json_roundtrip(node in node_strategy()) {
        let json = serde_json::to_value(&node).unwrap();
        prop_assert_eq!(&ConditionNode::from_json(&json).unwrap(), &node);

        let via_serde: ConditionNode = serde_json::from_value(json).unwrap();
        prop_assert_eq!(via_serde, node);
    }

    /// Wrapping in `{ "result": ... }` never changes the decoded tree
    #[test]
    fn prop_result_wrapper_transparent(node in node_strategy(), depth in 1usize..4) {
        let mut json = serde_json::to_value(&node).unwrap();
        for _ in 0..depth {
            json = json!({ "result": json });
        }
        prop_assert_eq!(ConditionNode::from_json(&json).unwrap(), node);
    }

    /// Arbitrary JSON never panics the decoder
    #[test]
    fn fuzz_from_json_arbitrary(json in arbitrary_json_strategy()) {
        if let Ok(node) = ConditionNode::from_json(&json) {
            // Decoded trees may still carry mismatched value shapes
            let _ = ConditionCompiler::compile_node(&node);
        }
    }

    /// Unknown operator names are reported as unsupported
    #[test]
    fn fuzz_unknown_operator(name in "[a-z]{1,8}") {
        prop_assume!(name.parse::<Operator>().is_err());
        let json = json!({ "field": "f", "operator": name, "value": 1 });
        prop_assert!(matches!(
            ConditionNode::from_json(&json),
            Err(QueryError::UnsupportedOperator(_))
        ));
    }
}

// =============================================================================
// Factory properties
// =============================================================================

proptest! {
    /// Find queries always start with command, index and compiled query
    #[test]
    fn prop_find_query_prefix(
        node in node_strategy(),
        limit in prop::option::of(0u64..1000),
        offset in prop::option::of(0u64..1000),
    ) {
        let factory = QueryFactory::for_index("idx:fuzz");
        let mut spec = QuerySpec::new().filter(node.clone());
        spec.limit = limit;
        spec.offset = offset;

        let tokens = factory.build_find_query(&spec).unwrap();
        prop_assert_eq!(&tokens[0], "FT.SEARCH");
        prop_assert_eq!(&tokens[1], "idx:fuzz");
        prop_assert_eq!(tokens[2].clone(), ConditionCompiler::compile_node(&node).unwrap());

        let has_limit = tokens.iter().any(|t| t == "LIMIT");
        prop_assert_eq!(has_limit, limit.is_some());
    }
}
