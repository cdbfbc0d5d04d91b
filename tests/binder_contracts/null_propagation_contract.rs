//! Contract tests for null propagation and three-valued logic.

use proptest::prelude::*;

use filterbind::binder::{propagate_nulls, propagate_nulls_in_predicate, BoundExpression};
use filterbind::clause::{ClauseNode, UnaryOperatorKind};
use filterbind::executor::{evaluate, Bindings};
use filterbind::{DataType, Element, Value};

use crate::fixtures::{bind_filter, employee_catalog, enum_value, lit, op, prop};

fn truth_constant(value: Option<bool>) -> BoundExpression {
    match value {
        Some(b) => BoundExpression::boolean(b),
        None => BoundExpression::null_of(DataType::Bool),
    }
}

fn to_value(value: Option<bool>) -> Value {
    value.map_or(Value::Null, Value::Bool)
}

/// Expected three-valued AND: false dominates.
fn kleene_and(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

/// Expected three-valued OR: true dominates.
fn kleene_or(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn truth() -> impl Strategy<Value = Option<bool>> {
    prop_oneof![Just(Some(true)), Just(Some(false)), Just(None)]
}

/// Leaf predicates touching nullable members, paths and collections.
fn leaf() -> impl Strategy<Value = ClauseNode> {
    prop_oneof![
        Just(op("eq", prop("Name"), lit("Sam"))),
        Just(op("ne", prop("Name"), lit("Name1"))),
        Just(op("lt", prop("Salary"), lit(5000))),
        Just(op("ge", prop("ID"), lit(3))),
        Just(op("eq", prop("FavoriteSports/LikeMost"), lit("Pingpong"))),
        Just(op("has", prop("FavoriteSports/LikeMost"), lit("Basketball"))),
        Just(ClauseNode::call("contains", vec![prop("Name"), lit("am")])),
        Just(ClauseNode::any(
            prop("FavoriteSports/Like"),
            "x",
            op("eq", ClauseNode::range_variable("x"), lit("Pingpong")),
        )),
        Just(op(
            "gt",
            ClauseNode::count(prop("FavoriteSports/Like"), None),
            lit(1),
        )),
        Just(op("eq", prop("Birthday"), ClauseNode::null())),
    ]
}

fn predicate_tree() -> impl Strategy<Value = ClauseNode> {
    leaf().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| op("and", l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| op("or", l, r)),
            inner.prop_map(|n| ClauseNode::unary(UnaryOperatorKind::Not, n)),
        ]
    })
}

/// An employee with any subset of the nullable members present.
fn sparse_employee() -> impl Strategy<Value = Element> {
    (
        1..10i32,
        proptest::option::of(prop_oneof![Just("Sam"), Just("Name1"), Just("Pam")]),
        proptest::option::of(1000.0..9000.0f64),
        proptest::option::of((1..4i64, proptest::collection::vec(1..3i64, 0..3))),
    )
        .prop_map(|(id, name, salary, sports)| {
            let mut element = Element::new()
                .with("ID", id)
                .with("SkillSet", Value::Collection(vec![]))
                .with("Gender", enum_value("Gender", 0))
                .with("AccessLevel", enum_value("AccessLevel", 1));
            if let Some(name) = name {
                element = element.with("Name", name);
            }
            if let Some(salary) = salary {
                element = element.with("Salary", salary);
            }
            if let Some((like_most, like)) = sports {
                let sports = Element::new()
                    .with("LikeMost", enum_value("Sport", like_most))
                    .with(
                        "Like",
                        Value::Collection(like.into_iter().map(|v| enum_value("Sport", v)).collect()),
                    );
                element = element.with("FavoriteSports", sports);
            }
            element
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: `and`/`or` follow the three-valued truth tables.
    #[test]
    fn test_kleene_truth_tables(a in truth(), b in truth()) {
        let and = BoundExpression::and(truth_constant(a), truth_constant(b));
        let or = BoundExpression::or(truth_constant(a), truth_constant(b));
        prop_assert_eq!(evaluate(&and, &mut Bindings::new()).unwrap(), to_value(kleene_and(a, b)));
        prop_assert_eq!(evaluate(&or, &mut Bindings::new()).unwrap(), to_value(kleene_or(a, b)));
    }

    /// Property: rewriting a rewritten predicate changes nothing.
    #[test]
    fn test_rewrite_is_idempotent(tree in predicate_tree()) {
        let catalog = employee_catalog();
        let predicate = bind_filter(&catalog, tree).unwrap();
        let body = predicate.body().clone();
        prop_assert_eq!(propagate_nulls_in_predicate(body.clone()), body.clone());
        prop_assert_eq!(propagate_nulls(body.clone()), body);
    }

    /// Property: a bound predicate never fails on absent data and always
    /// yields a definite answer.
    #[test]
    fn test_absent_data_never_fails(tree in predicate_tree(), employee in sparse_employee()) {
        let catalog = employee_catalog();
        let predicate = bind_filter(&catalog, tree).unwrap();
        prop_assert!(predicate.matches(&employee).is_ok());
    }
}
