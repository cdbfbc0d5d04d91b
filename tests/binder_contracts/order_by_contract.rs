//! Contract tests for the order-by binder.

use proptest::prelude::*;

use filterbind::binder::BoundExpression;
use filterbind::clause::{ClauseNode, Direction, OrderByClause, OrderByTerm};
use filterbind::{BindError, BinderConfig, BinderContext, OrderByBinder};

use crate::fixtures::{employee_catalog, employee_type, prop};

const SORTABLE: [&str; 5] = ["ID", "Name", "Salary", "Gender", "Birthday"];

fn selected_member(body: &BoundExpression) -> &str {
    match body {
        BoundExpression::MemberRead { member, .. } => member,
        other => panic!("Expected member read, got {other:?}"),
    }
}

fn term_strategy() -> impl Strategy<Value = (usize, bool)> {
    (0..SORTABLE.len(), any::<bool>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: selectors come out 1:1 with the terms, in input order and
    /// with their directions.
    #[test]
    fn test_terms_map_one_to_one(terms in proptest::collection::vec(term_strategy(), 1..6)) {
        let catalog = employee_catalog();
        let mut ctx = BinderContext::new(&catalog, employee_type());
        let clause = OrderByClause::new(
            terms
                .iter()
                .map(|(index, descending)| {
                    let node = prop(SORTABLE[*index]);
                    if *descending { OrderByTerm::desc(node) } else { OrderByTerm::asc(node) }
                })
                .collect(),
        );

        let selectors = OrderByBinder::new().bind(Some(&clause), Some(&mut ctx)).unwrap();
        prop_assert_eq!(selectors.len(), terms.len());
        for (selector, (index, descending)) in selectors.iter().zip(&terms) {
            prop_assert_eq!(selected_member(&selector.selector.body), SORTABLE[*index]);
            let expected = if *descending { Direction::Descending } else { Direction::Ascending };
            prop_assert_eq!(selector.direction, expected);
        }
    }
}

#[test]
fn test_stable_ordering_appends_key_after_user_terms() {
    let catalog = employee_catalog();
    let mut ctx = BinderContext::new(&catalog, employee_type())
        .with_config(BinderConfig::new().with_stable_ordering(true));
    let clause = OrderByClause::new(vec![
        OrderByTerm::desc(prop("Salary")),
        OrderByTerm::asc(prop("Name")),
    ]);

    let selectors = OrderByBinder::new().bind(Some(&clause), Some(&mut ctx)).unwrap();
    let members: Vec<&str> = selectors
        .iter()
        .map(|s| selected_member(&s.selector.body))
        .collect();
    assert_eq!(members, vec!["Salary", "Name", "ID"]);
    assert_eq!(selectors[2].direction, Direction::Ascending);
}

#[test]
fn test_non_orderable_selectors() {
    let catalog = employee_catalog();
    let mut ctx = BinderContext::new(&catalog, employee_type());
    for path in ["SkillSet", "FavoriteSports"] {
        let clause = OrderByClause::new(vec![OrderByTerm::asc(prop(path))]);
        let err = OrderByBinder::new()
            .bind(Some(&clause), Some(&mut ctx))
            .unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }), "{path}: {err}");
    }
}

#[test]
fn test_selector_evaluates_member() {
    let catalog = employee_catalog();
    let mut ctx = BinderContext::new(&catalog, employee_type());
    let clause = OrderByClause::new(vec![OrderByTerm::asc(ClauseNode::call(
        "tolower",
        vec![prop("Name")],
    ))]);
    let selectors = OrderByBinder::new().bind(Some(&clause), Some(&mut ctx)).unwrap();
    let sam = crate::fixtures::employees().remove(4);
    assert_eq!(
        filterbind::executor::invoke(&selectors[0].sort_key(), filterbind::Value::Element(sam))
            .unwrap(),
        filterbind::Value::String("sam".into())
    );
}
