//! Clause trees handed to the binder by the query-language front end.

mod ast;

pub use ast::{
    BinaryOperatorKind, ClauseNode, Direction, FilterClause, LambdaKind, OrderByClause,
    OrderByTerm, UnaryOperatorKind, DEFAULT_RANGE_VARIABLE,
};
