//! Bound expression definitions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::clause::LambdaKind;
use crate::types::{DataType, TypeRef, Value};

use super::functions::BuiltinFunction;

/// Typed expression graph produced by the binder.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpression {
    /// Literal value (constant).
    Constant { value: Value, result_type: TypeRef },

    /// Reference to a lambda parameter (a range variable).
    Parameter { name: String, result_type: TypeRef },

    /// Read of a member of a structured value.
    MemberRead {
        source: Box<BoundExpression>,
        member: String,
        result_type: TypeRef,
    },

    /// Binary comparison.
    Comparison {
        left: Box<BoundExpression>,
        op: ComparisonOp,
        right: Box<BoundExpression>,
        result_type: TypeRef,
    },

    /// Three-valued AND/OR.
    Logical {
        left: Box<BoundExpression>,
        op: LogicalOp,
        right: Box<BoundExpression>,
        result_type: TypeRef,
    },

    /// Arithmetic operations.
    Arithmetic {
        left: Box<BoundExpression>,
        op: ArithmeticOp,
        right: Box<BoundExpression>,
        result_type: TypeRef,
    },

    /// Flag-enumeration membership test.
    Has {
        value: Box<BoundExpression>,
        flag: Box<BoundExpression>,
        result_type: TypeRef,
    },

    /// Logical negation.
    Not {
        operand: Box<BoundExpression>,
        result_type: TypeRef,
    },

    /// Numeric negation.
    Negate {
        operand: Box<BoundExpression>,
        result_type: TypeRef,
    },

    /// IS NULL / IS NOT NULL.
    IsNull {
        operand: Box<BoundExpression>,
        negated: bool,
        result_type: TypeRef, // Always Bool
    },

    /// `operand` unless it is null, then `fallback`.
    Coalesce {
        operand: Box<BoundExpression>,
        fallback: Box<BoundExpression>,
        result_type: TypeRef,
    },

    /// Type conversion, implicit promotion or explicit cast.
    Convert {
        operand: Box<BoundExpression>,
        result_type: TypeRef,
    },

    /// `if test then if_true else if_false`.
    Conditional {
        test: Box<BoundExpression>,
        if_true: Box<BoundExpression>,
        if_false: Box<BoundExpression>,
        /// Set on guards inserted by the null-propagation rewriter.
        null_guard: bool,
        result_type: TypeRef,
    },

    /// Built-in function invocation.
    Call {
        function: BuiltinFunction,
        args: Vec<BoundExpression>,
        result_type: TypeRef,
    },

    /// `any`/`all` over a collection.
    Quantifier {
        kind: LambdaKind,
        source: Box<BoundExpression>,
        lambda: Box<LambdaExpression>,
        result_type: TypeRef,
    },

    /// Number of collection elements, optionally those matching a predicate.
    Count {
        source: Box<BoundExpression>,
        predicate: Option<Box<LambdaExpression>>,
        result_type: TypeRef,
    },
}

impl BoundExpression {
    /// Returns the result type of this expression.
    #[must_use]
    pub fn result_type(&self) -> &TypeRef {
        match self {
            BoundExpression::Constant { result_type, .. }
            | BoundExpression::Parameter { result_type, .. }
            | BoundExpression::MemberRead { result_type, .. }
            | BoundExpression::Comparison { result_type, .. }
            | BoundExpression::Logical { result_type, .. }
            | BoundExpression::Arithmetic { result_type, .. }
            | BoundExpression::Has { result_type, .. }
            | BoundExpression::Not { result_type, .. }
            | BoundExpression::Negate { result_type, .. }
            | BoundExpression::IsNull { result_type, .. }
            | BoundExpression::Coalesce { result_type, .. }
            | BoundExpression::Convert { result_type, .. }
            | BoundExpression::Conditional { result_type, .. }
            | BoundExpression::Call { result_type, .. }
            | BoundExpression::Quantifier { result_type, .. }
            | BoundExpression::Count { result_type, .. } => result_type,
        }
    }

    /// Returns a tag naming the shape of this node.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            BoundExpression::Constant { .. } => "constant",
            BoundExpression::Parameter { .. } => "parameter",
            BoundExpression::MemberRead { .. } => "member-read",
            BoundExpression::Comparison { .. }
            | BoundExpression::Logical { .. }
            | BoundExpression::Arithmetic { .. }
            | BoundExpression::Has { .. }
            | BoundExpression::Not { .. }
            | BoundExpression::Negate { .. }
            | BoundExpression::IsNull { .. }
            | BoundExpression::Coalesce { .. } => "operator",
            BoundExpression::Convert { .. } => "convert",
            BoundExpression::Conditional { .. } => "conditional",
            BoundExpression::Call { .. } => "call",
            BoundExpression::Quantifier { .. } => "quantifier",
            BoundExpression::Count { .. } => "count",
        }
    }

    /// Returns true if this is a null constant.
    #[must_use]
    pub fn is_null_constant(&self) -> bool {
        matches!(
            self,
            BoundExpression::Constant {
                value: Value::Null,
                ..
            }
        )
    }

    /// Creates a constant expression.
    #[must_use]
    pub fn constant(value: Value, result_type: TypeRef) -> Self {
        BoundExpression::Constant { value, result_type }
    }

    /// Creates a non-nullable boolean constant.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        BoundExpression::constant(Value::Bool(value), TypeRef::non_null(DataType::Bool))
    }

    /// Creates a typed null constant.
    #[must_use]
    pub fn null_of(data_type: DataType) -> Self {
        BoundExpression::constant(Value::Null, TypeRef::nullable(data_type))
    }

    /// Creates a comparison expression.
    #[must_use]
    pub fn comparison(left: BoundExpression, op: ComparisonOp, right: BoundExpression) -> Self {
        let nullable = left.result_type().nullable || right.result_type().nullable;
        BoundExpression::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
            result_type: TypeRef::non_null(DataType::Bool).with_nullable(nullable),
        }
    }

    /// Creates a logical AND/OR expression.
    #[must_use]
    pub fn logical(left: BoundExpression, op: LogicalOp, right: BoundExpression) -> Self {
        let nullable = left.result_type().nullable || right.result_type().nullable;
        BoundExpression::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
            result_type: TypeRef::non_null(DataType::Bool).with_nullable(nullable),
        }
    }

    /// Creates a logical AND expression.
    #[must_use]
    pub fn and(left: BoundExpression, right: BoundExpression) -> Self {
        BoundExpression::logical(left, LogicalOp::And, right)
    }

    /// Creates a logical OR expression.
    #[must_use]
    pub fn or(left: BoundExpression, right: BoundExpression) -> Self {
        BoundExpression::logical(left, LogicalOp::Or, right)
    }

    /// Creates a logical NOT expression.
    #[must_use]
    pub fn not(operand: BoundExpression) -> Self {
        let result_type = operand.result_type().clone();
        BoundExpression::Not {
            operand: Box::new(operand),
            result_type,
        }
    }

    /// Creates an IS NULL / IS NOT NULL test.
    #[must_use]
    pub fn is_null(operand: BoundExpression, negated: bool) -> Self {
        BoundExpression::IsNull {
            operand: Box::new(operand),
            negated,
            result_type: TypeRef::non_null(DataType::Bool),
        }
    }

    /// Creates a coalesce expression; the result is nullable only if the
    /// fallback is.
    #[must_use]
    pub fn coalesce(operand: BoundExpression, fallback: BoundExpression) -> Self {
        let result_type = operand
            .result_type()
            .clone()
            .with_nullable(fallback.result_type().nullable);
        BoundExpression::Coalesce {
            operand: Box::new(operand),
            fallback: Box::new(fallback),
            result_type,
        }
    }

    /// Creates a conversion to the given type.
    #[must_use]
    pub fn convert(operand: BoundExpression, result_type: TypeRef) -> Self {
        BoundExpression::Convert {
            operand: Box::new(operand),
            result_type,
        }
    }

    /// Creates a conditional expression typed after the `if_false` branch,
    /// made nullable when either branch is.
    #[must_use]
    pub fn conditional(
        test: BoundExpression,
        if_true: BoundExpression,
        if_false: BoundExpression,
    ) -> Self {
        let nullable = if_true.result_type().nullable || if_false.result_type().nullable;
        let result_type = if_false.result_type().clone().with_nullable(nullable);
        BoundExpression::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            null_guard: false,
            result_type,
        }
    }

    /// Creates `if test then null else node`, tagged as a null guard.
    #[must_use]
    pub fn null_guard(test: BoundExpression, node: BoundExpression) -> Self {
        let result_type = node.result_type().as_nullable();
        BoundExpression::Conditional {
            test: Box::new(test),
            if_true: Box::new(BoundExpression::null_of(result_type.data_type.clone())),
            if_false: Box::new(node),
            null_guard: true,
            result_type,
        }
    }
}

/// A lambda parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub data_type: TypeRef,
}

impl Parameter {
    #[must_use]
    pub fn new(name: &str, data_type: TypeRef) -> Self {
        Parameter {
            name: name.to_string(),
            data_type,
        }
    }
}

/// A single-parameter function.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpression {
    pub parameter: Parameter,
    pub body: BoundExpression,
}

impl LambdaExpression {
    #[must_use]
    pub fn new(parameter: Parameter, body: BoundExpression) -> Self {
        LambdaExpression { parameter, body }
    }

    /// Returns the result type of the body.
    #[must_use]
    pub fn result_type(&self) -> &TypeRef {
        self.body.result_type()
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Equal (eq).
    Eq,
    /// Not equal (ne).
    Ne,
    /// Less than (lt).
    Lt,
    /// Less than or equal (le).
    Le,
    /// Greater than (gt).
    Gt,
    /// Greater than or equal (ge).
    Ge,
}

impl ComparisonOp {
    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Ge => "ge",
        }
    }

    /// Applies this operator to the ordering of its operands.
    #[must_use]
    pub fn test(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Eq => ordering == Ordering::Equal,
            ComparisonOp::Ne => ordering != Ordering::Equal,
            ComparisonOp::Lt => ordering == Ordering::Less,
            ComparisonOp::Le => ordering != Ordering::Greater,
            ComparisonOp::Gt => ordering == Ordering::Greater,
            ComparisonOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Mul => "mul",
            ArithmeticOp::Div => "div",
            ArithmeticOp::Mod => "mod",
        }
    }
}
