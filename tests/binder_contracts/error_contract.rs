//! Contract tests for binding errors.
//!
//! Every failure is terminal for the call and names what went wrong.

use filterbind::clause::{ClauseNode, FilterClause, UnaryOperatorKind};
use filterbind::{BindError, BinderConfig, BinderContext, DataType, FilterBinder};

use crate::fixtures::{bind_filter, employee_catalog, employee_type, lit, op, prop};

#[test]
fn test_missing_clause_and_context() {
    let catalog = employee_catalog();
    let binder = FilterBinder::new();
    let mut ctx = BinderContext::new(&catalog, employee_type());

    assert_eq!(binder.bind(None, Some(&mut ctx)), Err(BindError::MissingClause));

    let clause = FilterClause::new(lit(true));
    assert_eq!(binder.bind(Some(&clause), None), Err(BindError::MissingContext));
}

#[test]
fn test_unknown_member_names_type_and_member() {
    let catalog = employee_catalog();
    let err = bind_filter(&catalog, op("eq", prop("FavoriteSports/Hates"), lit("Golf"))).unwrap_err();
    assert_eq!(
        err,
        BindError::UnknownMember {
            type_name: "FavoriteSports".into(),
            member: "Hates".into(),
        }
    );
    assert_eq!(
        err.to_string(),
        "Unknown member 'Hates' on type 'FavoriteSports'"
    );
}

#[test]
fn test_unbound_variable() {
    let catalog = employee_catalog();
    let err = bind_filter(
        &catalog,
        op("eq", ClauseNode::range_variable("e"), lit(1)),
    )
    .unwrap_err();
    assert_eq!(err, BindError::UnboundVariable("e".into()));
}

#[test]
fn test_unknown_function() {
    let catalog = employee_catalog();
    let err = bind_filter(&catalog, ClauseNode::call("matchesPattern", vec![prop("Name")])).unwrap_err();
    assert_eq!(err, BindError::UnknownFunction("matchesPattern".into()));
}

#[test]
fn test_type_mismatch_reports_operation_and_operands() {
    let catalog = employee_catalog();
    let err = bind_filter(&catalog, op("lt", prop("Name"), lit("Sam"))).unwrap_err();
    assert_eq!(
        err,
        BindError::TypeMismatch {
            operation: "lt".into(),
            operands: vec!["String?".into(), "String".into()],
        }
    );
    assert_eq!(
        err.to_string(),
        "Type mismatch: cannot apply 'lt' to (String?, String)"
    );

    let err = bind_filter(&catalog, op("has", prop("Gender"), lit("Male"))).unwrap_err();
    assert!(matches!(err, BindError::TypeMismatch { operation, .. } if operation == "has"));

    let err = bind_filter(&catalog, op("eq", prop("Gender"), lit("Robot"))).unwrap_err();
    assert!(matches!(err, BindError::TypeMismatch { .. }));

    let err = bind_filter(
        &catalog,
        ClauseNode::unary(UnaryOperatorKind::Not, prop("Name")),
    )
    .unwrap_err();
    assert!(matches!(err, BindError::TypeMismatch { operation, .. } if operation == "not"));
}

#[test]
fn test_invalid_cast_yields_no_predicate() {
    let catalog = employee_catalog();
    let err = bind_filter(
        &catalog,
        op("eq", ClauseNode::cast(DataType::Date, prop("ID")), lit("2020-01-01")),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BindError::InvalidCast {
            from: "Int32".into(),
            to: "Date".into(),
        }
    );
}

#[test]
fn test_filter_type_mismatch() {
    let catalog = employee_catalog();
    let err = bind_filter(&catalog, prop("Name")).unwrap_err();
    assert_eq!(
        err,
        BindError::FilterTypeMismatch {
            actual: "String?".into(),
            expected: "Bool".into(),
        }
    );
}

#[test]
fn test_recursion_limit() {
    let catalog = employee_catalog();
    let binder = FilterBinder::new();
    let mut ctx = BinderContext::new(&catalog, employee_type())
        .with_config(BinderConfig::new().with_max_depth(16));

    let deep = (0..32).fold(lit(true), |acc, _| {
        ClauseNode::unary(UnaryOperatorKind::Not, acc)
    });
    let err = binder
        .bind(Some(&FilterClause::new(deep)), Some(&mut ctx))
        .unwrap_err();
    assert_eq!(err, BindError::RecursionLimitExceeded { limit: 16 });

    // The context is reusable after a failure.
    assert_eq!(ctx.depth(), 0);
    assert_eq!(ctx.scope_len(), 0);
    let shallow = FilterClause::new(op("eq", prop("ID"), lit(1)));
    assert!(binder.bind(Some(&shallow), Some(&mut ctx)).is_ok());
}

#[test]
fn test_nested_filter_does_not_see_outer_variables() {
    let catalog = employee_catalog();

    // The nested $it is a Skill, not an Employee.
    let nested = FilterClause::new(op("eq", prop("Name"), lit("Sam")));
    let err = bind_filter(
        &catalog,
        op("gt", ClauseNode::count(prop("SkillSet"), Some(nested)), lit(0)),
    )
    .unwrap_err();
    assert!(matches!(err, BindError::TypeMismatch { operation, .. } if operation == "/Name"));

    // A lambda variable of the enclosing clause is out of scope in the sub-filter.
    let nested = FilterClause::new(op(
        "eq",
        ClauseNode::range_variable("$it"),
        ClauseNode::range_variable("s"),
    ));
    let node = ClauseNode::any(
        prop("SkillSet"),
        "s",
        op("gt", ClauseNode::count(prop("SkillSet"), Some(nested)), lit(0)),
    );
    let err = bind_filter(&catalog, node).unwrap_err();
    assert_eq!(err, BindError::UnboundVariable("s".into()));
}
