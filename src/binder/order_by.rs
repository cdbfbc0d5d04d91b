//! Order-by binder: `$orderby` clause to ordered selectors.

use tracing::debug;

use crate::clause::{ClauseNode, Direction, OrderByClause};
use crate::error::{BindError, Result};
use crate::types::{DataType, TypeRef};

use super::context::BinderContext;
use super::expression::{BoundExpression, LambdaExpression, Parameter};
use super::node::bind_node;
use super::null_propagation::propagate_nulls;

/// A bound sort key: selector over the element plus its direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBySelector {
    pub selector: LambdaExpression,
    pub direction: Direction,
}

impl OrderBySelector {
    /// Returns the selector rewritten so that a path through an absent value
    /// yields null instead of failing. The bound selector is left as is.
    #[must_use]
    pub fn sort_key(&self) -> LambdaExpression {
        LambdaExpression::new(
            self.selector.parameter.clone(),
            propagate_nulls(self.selector.body.clone()),
        )
    }
}

/// Entry point binding an order-by clause into selectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderByBinder;

impl OrderByBinder {
    #[must_use]
    pub fn new() -> Self {
        OrderByBinder
    }

    /// Binds each term in input order.
    ///
    /// With stable ordering enabled, key members of the element type not
    /// already used as sort keys are appended ascending.
    ///
    /// # Errors
    ///
    /// Returns `MissingClause` or `MissingContext` for absent inputs,
    /// `TypeMismatch` for a selector that is not single-valued and orderable,
    /// and any error raised while binding a term.
    pub fn bind(
        &self,
        clause: Option<&OrderByClause>,
        context: Option<&mut BinderContext<'_>>,
    ) -> Result<Vec<OrderBySelector>> {
        let clause = clause.ok_or(BindError::MissingClause)?;
        let context = context.ok_or(BindError::MissingContext)?;

        let element_type = TypeRef::non_null(context.element_type().clone());
        debug!(
            element_type = %element_type,
            terms = clause.terms.len(),
            "Binding order-by clause"
        );

        let mut selectors = Vec::with_capacity(clause.terms.len());
        for term in &clause.terms {
            let selector = bind_selector(
                &term.expression,
                &clause.range_variable,
                &element_type,
                context,
            )?;
            selectors.push(OrderBySelector {
                selector,
                direction: term.direction,
            });
        }

        if context.config().ensure_stable_ordering {
            append_key_members(&mut selectors, clause, &element_type, context)?;
        }
        Ok(selectors)
    }
}

fn bind_selector(
    expression: &ClauseNode,
    range_variable: &str,
    element_type: &TypeRef,
    context: &mut BinderContext<'_>,
) -> Result<LambdaExpression> {
    let body = {
        let mut scope = context.push_scope(range_variable, element_type.clone())?;
        bind_node(expression, &mut scope)?
    };
    if !body.result_type().data_type.is_orderable() {
        return Err(BindError::type_mismatch("orderby", &[body.result_type()]));
    }
    Ok(LambdaExpression::new(
        Parameter::new(range_variable, element_type.clone()),
        body,
    ))
}

/// Returns the member a selector reads directly off its parameter, if any.
fn direct_member(selector: &LambdaExpression) -> Option<&str> {
    match &selector.body {
        BoundExpression::MemberRead { source, member, .. } => match source.as_ref() {
            BoundExpression::Parameter { name, .. } if name == &selector.parameter.name => {
                Some(member.as_str())
            }
            _ => None,
        },
        _ => None,
    }
}

fn append_key_members(
    selectors: &mut Vec<OrderBySelector>,
    clause: &OrderByClause,
    element_type: &TypeRef,
    context: &mut BinderContext<'_>,
) -> Result<()> {
    let DataType::Structured(type_name) = &element_type.data_type else {
        return Ok(());
    };
    for key in context.catalog().key_members(type_name) {
        if selectors.iter().any(|s| direct_member(&s.selector) == Some(key.as_str())) {
            continue;
        }
        let node = ClauseNode::range_variable(&clause.range_variable).member(&key);
        let selector = bind_selector(&node, &clause.range_variable, element_type, context)?;
        selectors.push(OrderBySelector {
            selector,
            direction: Direction::Ascending,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, MemberDef, StructuredTypeSchema};
    use crate::clause::OrderByTerm;
    use crate::config::BinderConfig;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .create_structured_type(
                StructuredTypeSchema::new(
                    "Person".into(),
                    vec![
                        MemberDef::new("ID".into(), DataType::Int32, false).unwrap(),
                        MemberDef::new("Name".into(), DataType::String, true).unwrap(),
                        MemberDef::new("Age".into(), DataType::Int32, true).unwrap(),
                        MemberDef::new(
                            "Tags".into(),
                            DataType::collection_of(DataType::String),
                            false,
                        )
                        .unwrap(),
                    ],
                    vec!["ID".into()],
                )
                .unwrap(),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_terms_keep_order_and_direction() {
        let catalog = catalog();
        let mut ctx = BinderContext::new(&catalog, DataType::Structured("Person".into()));
        let clause = OrderByClause::new(vec![
            OrderByTerm::desc(ClauseNode::property("Age")),
            OrderByTerm::asc(ClauseNode::property("Name")),
        ]);

        let selectors = OrderByBinder::new().bind(Some(&clause), Some(&mut ctx)).unwrap();
        assert_eq!(selectors.len(), 2);
        assert_eq!(direct_member(&selectors[0].selector), Some("Age"));
        assert_eq!(selectors[0].direction, Direction::Descending);
        assert_eq!(direct_member(&selectors[1].selector), Some("Name"));
        assert_eq!(selectors[1].direction, Direction::Ascending);
    }

    #[test]
    fn test_collection_selector_is_rejected() {
        let catalog = catalog();
        let mut ctx = BinderContext::new(&catalog, DataType::Structured("Person".into()));
        let clause = OrderByClause::new(vec![OrderByTerm::asc(ClauseNode::property("Tags"))]);

        let err = OrderByBinder::new().bind(Some(&clause), Some(&mut ctx)).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { operation, .. } if operation == "orderby"));
    }

    #[test]
    fn test_stable_ordering_appends_missing_keys() {
        let catalog = catalog();
        let mut ctx = BinderContext::new(&catalog, DataType::Structured("Person".into()))
            .with_config(BinderConfig::new().with_stable_ordering(true));

        let clause = OrderByClause::new(vec![OrderByTerm::desc(ClauseNode::property("Age"))]);
        let selectors = OrderByBinder::new().bind(Some(&clause), Some(&mut ctx)).unwrap();
        assert_eq!(selectors.len(), 2);
        assert_eq!(direct_member(&selectors[1].selector), Some("ID"));
        assert_eq!(selectors[1].direction, Direction::Ascending);

        let clause = OrderByClause::new(vec![OrderByTerm::desc(ClauseNode::property("ID"))]);
        let selectors = OrderByBinder::new().bind(Some(&clause), Some(&mut ctx)).unwrap();
        assert_eq!(selectors.len(), 1);
    }

    #[test]
    fn test_sort_key_guards_without_touching_selector() {
        let catalog = catalog();
        let mut ctx = BinderContext::new(&catalog, DataType::Structured("Person".into()));
        let clause = OrderByClause::new(vec![OrderByTerm::asc(ClauseNode::call(
            "tolower",
            vec![ClauseNode::property("Name")],
        ))]);

        let selectors = OrderByBinder::new().bind(Some(&clause), Some(&mut ctx)).unwrap();
        assert_eq!(selectors[0].selector.body.shape(), "call");
        let key = selectors[0].sort_key();
        assert_eq!(key.body.shape(), "conditional");
        assert_eq!(key.parameter, selectors[0].selector.parameter);
    }

    #[test]
    fn test_missing_inputs() {
        let catalog = catalog();
        let mut ctx = BinderContext::new(&catalog, DataType::Structured("Person".into()));
        let binder = OrderByBinder::new();
        assert_eq!(
            binder.bind(None, Some(&mut ctx)).unwrap_err(),
            BindError::MissingClause
        );
        let clause = OrderByClause::new(vec![]);
        assert_eq!(binder.bind(Some(&clause), None).unwrap_err(), BindError::MissingContext);
    }
}
