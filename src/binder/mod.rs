//! Binder module for semantic analysis of query clauses.
//!
//! The binder turns a parsed clause tree into a typed expression graph:
//! - Range variables and members resolved against the schema catalog
//! - Operators and functions resolved with implicit promotion
//! - Null propagation so absent values fold to `false` in a predicate
//!
//! [`FilterBinder`] and [`OrderByBinder`] are the entry points.

mod context;
mod expression;
mod filter;
mod functions;
mod node;
mod null_propagation;
mod operators;
mod order_by;

pub use context::{BinderContext, ScopeFrame, ScopeGuard};
pub use expression::{
    ArithmeticOp, BoundExpression, ComparisonOp, LambdaExpression, LogicalOp, Parameter,
};
pub use filter::{FilterBinder, NestedFilterBinder, Predicate};
pub use functions::{resolve as resolve_function, BuiltinFunction, Signature};
pub use null_propagation::{propagate_nulls, propagate_nulls_in_predicate};
pub use order_by::{OrderByBinder, OrderBySelector};
