//! Filter binder: `$filter` clause to a boolean predicate.

use tracing::debug;

use crate::clause::FilterClause;
use crate::error::{BindError, Result};
use crate::executor;
use crate::types::{DataType, Element, TypeRef, Value};

use super::context::BinderContext;
use super::expression::{BoundExpression, LambdaExpression, Parameter};
use super::node::bind_node;
use super::null_propagation::propagate_nulls_in_predicate;

/// Binds sub-filters met while binding another clause, such as the filter of
/// `Orders/$count($filter=Amount gt 10)`.
pub trait NestedFilterBinder {
    /// Binds `clause` over elements of `element_type` in a fresh scope stack.
    ///
    /// # Errors
    ///
    /// Returns any binding error of the nested clause.
    fn bind_nested(
        &self,
        clause: &FilterClause,
        element_type: &TypeRef,
        context: &mut BinderContext<'_>,
    ) -> Result<Predicate>;
}

/// Entry point binding a filter clause into a [`Predicate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterBinder;

impl FilterBinder {
    #[must_use]
    pub fn new() -> Self {
        FilterBinder
    }

    /// Binds a filter clause against the context's element type.
    ///
    /// The binder records itself as the context's active filter binder so
    /// nested sub-filters re-enter it.
    ///
    /// # Errors
    ///
    /// Returns `MissingClause` or `MissingContext` for absent inputs,
    /// `FilterTypeMismatch` if the clause is not boolean-valued, and any
    /// error raised while binding its nodes.
    pub fn bind<'a>(
        &'a self,
        clause: Option<&FilterClause>,
        context: Option<&mut BinderContext<'a>>,
    ) -> Result<Predicate> {
        let clause = clause.ok_or(BindError::MissingClause)?;
        let context = context.ok_or(BindError::MissingContext)?;

        context.set_filter_binder(self);

        let element_type = TypeRef::non_null(context.element_type().clone());
        debug!(
            element_type = %element_type,
            range_variable = %clause.range_variable,
            "Binding filter clause"
        );
        bind_predicate(clause, element_type, context)
    }
}

impl NestedFilterBinder for FilterBinder {
    fn bind_nested(
        &self,
        clause: &FilterClause,
        element_type: &TypeRef,
        context: &mut BinderContext<'_>,
    ) -> Result<Predicate> {
        let mut isolated = context.push_isolated()?;
        debug!(element_type = %element_type, "Binding nested filter clause");
        bind_predicate(clause, element_type.clone(), &mut isolated)
    }
}

/// Binds `clause` with its range variable typed as `parameter_type`, then
/// rewrites and verifies the body.
fn bind_predicate(
    clause: &FilterClause,
    parameter_type: TypeRef,
    context: &mut BinderContext<'_>,
) -> Result<Predicate> {
    let body = {
        let mut scope = context.push_scope(&clause.range_variable, parameter_type.clone())?;
        bind_node(&clause.expression, &mut scope)?
    };
    let body = propagate_nulls_in_predicate(body);

    let expected = TypeRef::non_null(DataType::Bool);
    if body.result_type() != &expected {
        return Err(BindError::FilterTypeMismatch {
            actual: body.result_type().to_string(),
            expected: expected.to_string(),
        });
    }

    let parameter = Parameter::new(&clause.range_variable, parameter_type);
    Ok(Predicate {
        lambda: LambdaExpression::new(parameter, body),
    })
}

/// A bound filter: one parameter, non-nullable boolean body.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    lambda: LambdaExpression,
}

impl Predicate {
    /// Returns the range variable parameter.
    #[must_use]
    pub fn parameter(&self) -> &Parameter {
        &self.lambda.parameter
    }

    /// Returns the predicate body.
    #[must_use]
    pub fn body(&self) -> &BoundExpression {
        &self.lambda.body
    }

    /// Returns the result type, always non-nullable `Bool`.
    #[must_use]
    pub fn result_type(&self) -> &TypeRef {
        self.lambda.result_type()
    }

    #[must_use]
    pub fn into_lambda(self) -> LambdaExpression {
        self.lambda
    }

    /// Tests an element against this predicate.
    ///
    /// # Errors
    ///
    /// Returns an evaluation error, e.g. `DivisionByZero`.
    pub fn matches(&self, element: &Element) -> Result<bool> {
        self.matches_value(Value::Element(element.clone()))
    }

    /// Tests an arbitrary value, for predicates over primitive collections.
    ///
    /// # Errors
    ///
    /// Returns an evaluation error, e.g. `DivisionByZero`.
    pub fn matches_value(&self, value: Value) -> Result<bool> {
        executor::invoke(&self.lambda, value).and_then(|result| executor::truth(&result))
    }
}
