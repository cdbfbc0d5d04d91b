//! Error types for clause binding and evaluation.

use thiserror::Error;

/// Result type alias using [`BindError`].
pub type Result<T> = std::result::Result<T, BindError>;

/// Error types for binding clause trees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    // ==================== Entry Point Errors ====================
    /// The clause to bind was not supplied.
    #[error("Missing clause: a filter or order-by clause is required")]
    MissingClause,

    /// The binder context was not supplied.
    #[error("Missing context: a binder context is required")]
    MissingContext,

    // ==================== Semantic Errors ====================
    /// A range variable was referenced outside any enclosing scope.
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),

    /// Member lookup miss on a type.
    #[error("Unknown member '{member}' on type '{type_name}'")]
    UnknownMember { type_name: String, member: String },

    /// Function table lookup miss.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Operator or function applied to incompatible operand types.
    #[error("Type mismatch: cannot apply '{operation}' to ({})", .operands.join(", "))]
    TypeMismatch {
        operation: String,
        operands: Vec<String>,
    },

    /// Disallowed explicit conversion.
    #[error("Invalid cast from {from} to {to}")]
    InvalidCast { from: String, to: String },

    /// The bound filter body is not boolean-valued.
    #[error("Filter type mismatch: expected {expected}, got {actual}")]
    FilterTypeMismatch { actual: String, expected: String },

    /// Nesting depth exceeded the configured bound.
    #[error("Recursion limit exceeded: nesting deeper than {limit}")]
    RecursionLimitExceeded { limit: usize },

    // ==================== Catalog Errors ====================
    /// Schema definition errors (duplicate type, unknown key member, etc.).
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Catalog persistence errors.
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// Configuration loading errors.
    #[error("Config error: {0}")]
    ConfigError(String),

    // ==================== Evaluation Errors ====================
    /// Member read on an absent value.
    #[error("Null dereference reading member '{0}'")]
    NullDereference(String),

    /// Absent argument passed to a function that dereferences it.
    #[error("Null argument passed to '{0}'")]
    NullArgument(String),

    /// Division by zero in expression evaluation.
    #[error("Division by zero")]
    DivisionByZero,

    /// General evaluation failure.
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

impl BindError {
    /// Creates a type mismatch error from displayable operand types.
    pub(crate) fn type_mismatch<T: std::fmt::Display>(operation: &str, operands: &[T]) -> Self {
        BindError::TypeMismatch {
            operation: operation.to_string(),
            operands: operands.iter().map(ToString::to_string).collect(),
        }
    }
}
