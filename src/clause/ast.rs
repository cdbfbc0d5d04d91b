//! Clause tree definitions.
//!
//! These are produced by an external query-language front end; the binder only
//! reads them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DataType, TypeRef, Value};

/// Name the front end gives the implicit range variable of a clause.
pub const DEFAULT_RANGE_VARIABLE: &str = "$it";

/// A node of a parsed filter or order-by expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClauseNode {
    /// Constant with its declared type.
    Literal {
        value: Value,
        declared_type: TypeRef,
    },
    /// `source/member`.
    MemberAccess {
        source: Box<ClauseNode>,
        member: String,
    },
    /// Reference to a range variable (`$it`, or a lambda variable).
    RangeVariableRef(String),
    /// Binary operator application.
    BinaryOp {
        kind: BinaryOperatorKind,
        left: Box<ClauseNode>,
        right: Box<ClauseNode>,
    },
    /// Unary operator application.
    UnaryOp {
        kind: UnaryOperatorKind,
        operand: Box<ClauseNode>,
    },
    /// Call of a built-in function.
    FunctionCall { name: String, args: Vec<ClauseNode> },
    /// `cast(operand, target)`.
    Cast {
        target: DataType,
        operand: Box<ClauseNode>,
    },
    /// `source/any(var: body)` or `source/all(var: body)`.
    CollectionLambda {
        kind: LambdaKind,
        source: Box<ClauseNode>,
        range_variable: String,
        body: Box<ClauseNode>,
    },
    /// `source/$count`, optionally with a nested `$filter`.
    CollectionCount {
        source: Box<ClauseNode>,
        filter: Option<Box<FilterClause>>,
    },
}

impl ClauseNode {
    /// Creates a literal whose declared type is inferred from the value.
    ///
    /// Null becomes an untyped null literal. Structured and collection values
    /// need [`ClauseNode::typed_literal`].
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        let declared_type = value
            .data_type()
            .map_or_else(TypeRef::null, TypeRef::non_null);
        ClauseNode::Literal {
            value,
            declared_type,
        }
    }

    /// Creates a literal with an explicit declared type.
    #[must_use]
    pub fn typed_literal(value: Value, declared_type: TypeRef) -> Self {
        ClauseNode::Literal {
            value,
            declared_type,
        }
    }

    /// Creates an untyped null literal.
    #[must_use]
    pub fn null() -> Self {
        ClauseNode::literal(Value::Null)
    }

    /// Creates an enumeration literal.
    #[must_use]
    pub fn enum_literal(type_name: &str, value: i64) -> Self {
        ClauseNode::literal(Value::Enum {
            type_name: type_name.to_string(),
            value,
        })
    }

    /// Creates a range variable reference.
    #[must_use]
    pub fn range_variable(name: &str) -> Self {
        ClauseNode::RangeVariableRef(name.to_string())
    }

    /// Creates a member path rooted at the default range variable, e.g.
    /// `"Address/City"`.
    #[must_use]
    pub fn property(path: &str) -> Self {
        Self::path_from(ClauseNode::range_variable(DEFAULT_RANGE_VARIABLE), path)
    }

    /// Creates a member path rooted at the given source.
    #[must_use]
    pub fn path_from(source: ClauseNode, path: &str) -> Self {
        path.split('/').fold(source, ClauseNode::member)
    }

    /// Accesses a member of this node.
    #[must_use]
    pub fn member(self, member: &str) -> Self {
        ClauseNode::MemberAccess {
            source: Box::new(self),
            member: member.to_string(),
        }
    }

    /// Creates a binary operator node.
    #[must_use]
    pub fn binary(kind: BinaryOperatorKind, left: ClauseNode, right: ClauseNode) -> Self {
        ClauseNode::BinaryOp {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a unary operator node.
    #[must_use]
    pub fn unary(kind: UnaryOperatorKind, operand: ClauseNode) -> Self {
        ClauseNode::UnaryOp {
            kind,
            operand: Box::new(operand),
        }
    }

    /// Creates a function call node.
    #[must_use]
    pub fn call(name: &str, args: Vec<ClauseNode>) -> Self {
        ClauseNode::FunctionCall {
            name: name.to_string(),
            args,
        }
    }

    /// Creates a cast node.
    #[must_use]
    pub fn cast(target: DataType, operand: ClauseNode) -> Self {
        ClauseNode::Cast {
            target,
            operand: Box::new(operand),
        }
    }

    /// Creates an `any` lambda node.
    #[must_use]
    pub fn any(source: ClauseNode, range_variable: &str, body: ClauseNode) -> Self {
        ClauseNode::lambda(LambdaKind::Any, source, range_variable, body)
    }

    /// Creates an `all` lambda node.
    #[must_use]
    pub fn all(source: ClauseNode, range_variable: &str, body: ClauseNode) -> Self {
        ClauseNode::lambda(LambdaKind::All, source, range_variable, body)
    }

    fn lambda(kind: LambdaKind, source: ClauseNode, range_variable: &str, body: ClauseNode) -> Self {
        ClauseNode::CollectionLambda {
            kind,
            source: Box::new(source),
            range_variable: range_variable.to_string(),
            body: Box::new(body),
        }
    }

    /// Creates a `$count` node with an optional nested filter.
    #[must_use]
    pub fn count(source: ClauseNode, filter: Option<FilterClause>) -> Self {
        ClauseNode::CollectionCount {
            source: Box::new(source),
            filter: filter.map(Box::new),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperatorKind {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Flag-enumeration membership.
    Has,
}

impl BinaryOperatorKind {
    /// Parses an operator from its query-language keyword.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(BinaryOperatorKind::Eq),
            "ne" => Some(BinaryOperatorKind::Ne),
            "lt" => Some(BinaryOperatorKind::Lt),
            "le" => Some(BinaryOperatorKind::Le),
            "gt" => Some(BinaryOperatorKind::Gt),
            "ge" => Some(BinaryOperatorKind::Ge),
            "and" => Some(BinaryOperatorKind::And),
            "or" => Some(BinaryOperatorKind::Or),
            "add" => Some(BinaryOperatorKind::Add),
            "sub" => Some(BinaryOperatorKind::Sub),
            "mul" => Some(BinaryOperatorKind::Mul),
            "div" => Some(BinaryOperatorKind::Div),
            "mod" => Some(BinaryOperatorKind::Mod),
            "has" => Some(BinaryOperatorKind::Has),
            _ => None,
        }
    }

    /// Returns the query-language keyword of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperatorKind::Eq => "eq",
            BinaryOperatorKind::Ne => "ne",
            BinaryOperatorKind::Lt => "lt",
            BinaryOperatorKind::Le => "le",
            BinaryOperatorKind::Gt => "gt",
            BinaryOperatorKind::Ge => "ge",
            BinaryOperatorKind::And => "and",
            BinaryOperatorKind::Or => "or",
            BinaryOperatorKind::Add => "add",
            BinaryOperatorKind::Sub => "sub",
            BinaryOperatorKind::Mul => "mul",
            BinaryOperatorKind::Div => "div",
            BinaryOperatorKind::Mod => "mod",
            BinaryOperatorKind::Has => "has",
        }
    }
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperatorKind {
    Not,
    Negate,
}

impl UnaryOperatorKind {
    /// Returns the query-language keyword of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperatorKind::Not => "not",
            UnaryOperatorKind::Negate => "-",
        }
    }
}

/// Collection lambda quantifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LambdaKind {
    Any,
    All,
}

impl LambdaKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LambdaKind::Any => "any",
            LambdaKind::All => "all",
        }
    }
}

/// A `$filter` clause: the expression and the name of its range variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub expression: ClauseNode,
    pub range_variable: String,
}

impl FilterClause {
    /// Creates a filter clause over the default range variable.
    #[must_use]
    pub fn new(expression: ClauseNode) -> Self {
        FilterClause {
            expression,
            range_variable: DEFAULT_RANGE_VARIABLE.to_string(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// A single `$orderby` term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByTerm {
    pub expression: ClauseNode,
    pub direction: Direction,
}

impl OrderByTerm {
    #[must_use]
    pub fn asc(expression: ClauseNode) -> Self {
        OrderByTerm {
            expression,
            direction: Direction::Ascending,
        }
    }

    #[must_use]
    pub fn desc(expression: ClauseNode) -> Self {
        OrderByTerm {
            expression,
            direction: Direction::Descending,
        }
    }
}

/// An `$orderby` clause: ordered terms over one range variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByClause {
    pub terms: Vec<OrderByTerm>,
    pub range_variable: String,
}

impl OrderByClause {
    /// Creates an order-by clause over the default range variable.
    #[must_use]
    pub fn new(terms: Vec<OrderByTerm>) -> Self {
        OrderByClause {
            terms,
            range_variable: DEFAULT_RANGE_VARIABLE.to_string(),
        }
    }
}
