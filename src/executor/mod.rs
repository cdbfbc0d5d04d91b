//! Executor module: reference evaluation of bound expressions.
//!
//! Evaluation follows the raw graph semantics: member reads, function calls,
//! quantifiers and counts fail on an absent operand, while operators are
//! lifted and turn an absent operand into null. A graph that went through
//! null propagation therefore never fails on absent data.
//!
//! The physical operators pull elements one at a time.

mod builtins;
mod filter;
mod scan;
mod sort;

use crate::binder::{ArithmeticOp, BoundExpression, ComparisonOp, LambdaExpression, LogicalOp};
use crate::clause::LambdaKind;
use crate::error::{BindError, Result};
use crate::types::{DataType, Element, Value};

pub use filter::FilterOperator;
pub use scan::ScanOperator;
pub use sort::sort_elements;

/// Trait for physical operators in the execution pipeline.
pub trait PhysicalOperator {
    /// Returns the next element, or None if exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation of a predicate fails.
    fn next(&mut self) -> Result<Option<Element>>;
}

/// Drains an operator into a vector.
///
/// # Errors
///
/// Returns the first error raised by the operator.
pub fn collect(operator: &mut dyn PhysicalOperator) -> Result<Vec<Element>> {
    let mut elements = Vec::new();
    while let Some(element) = operator.next()? {
        elements.push(element);
    }
    Ok(elements)
}

/// Values bound to lambda parameters, innermost last.
#[derive(Debug, Default)]
pub struct Bindings {
    frames: Vec<(String, Value)>,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, shadowing outer bindings of the same name.
    pub fn push(&mut self, name: &str, value: Value) {
        self.frames.push((name.to_string(), value));
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Looks up a parameter, innermost binding first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }
}

/// Invokes a lambda with one argument.
///
/// # Errors
///
/// Returns any evaluation error of the body.
pub fn invoke(lambda: &LambdaExpression, argument: Value) -> Result<Value> {
    let mut bindings = Bindings::new();
    bindings.push(&lambda.parameter.name, argument);
    evaluate(&lambda.body, &mut bindings)
}

/// Interprets a predicate result: null counts as false.
///
/// # Errors
///
/// Returns `Evaluation` for a non-boolean value.
pub fn truth(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        other => Err(BindError::Evaluation(format!(
            "Expected a boolean, got {other:?}"
        ))),
    }
}

/// Evaluates a bound expression.
///
/// # Errors
///
/// Returns `NullDereference` or `NullArgument` when a dereferencing node meets
/// an absent operand, `DivisionByZero` for integral division by zero, and
/// `Evaluation` for overflow or ill-typed input.
pub fn evaluate(expr: &BoundExpression, bindings: &mut Bindings) -> Result<Value> {
    match expr {
        BoundExpression::Constant { value, .. } => Ok(value.clone()),

        BoundExpression::Parameter { name, .. } => bindings
            .lookup(name)
            .cloned()
            .ok_or_else(|| BindError::Evaluation(format!("Unbound parameter '{name}'"))),

        BoundExpression::MemberRead { source, member, .. } => {
            match evaluate(source, bindings)? {
                Value::Element(element) => Ok(element.member(member).clone()),
                Value::Null => Err(BindError::NullDereference(member.clone())),
                other => Err(BindError::Evaluation(format!(
                    "Cannot read member '{member}' of {other:?}"
                ))),
            }
        }

        BoundExpression::Comparison {
            left, op, right, ..
        } => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            Ok(compare(*op, &left, &right))
        }

        BoundExpression::Logical {
            left, op, right, ..
        } => evaluate_logical(*op, left, right, bindings),

        BoundExpression::Arithmetic {
            left, op, right, ..
        } => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            if left.is_null() || right.is_null() {
                return Ok(Value::Null);
            }
            arithmetic(*op, &left, &right)
        }

        BoundExpression::Has { value, flag, .. } => {
            let value = evaluate(value, bindings)?;
            let flag = evaluate(flag, bindings)?;
            match (value.as_int64(), flag.as_int64()) {
                (Some(value), Some(flag)) => Ok(Value::Bool(value & flag == flag)),
                _ => Ok(Value::Null),
            }
        }

        BoundExpression::Not { operand, .. } => match evaluate(operand, bindings)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            Value::Null => Ok(Value::Null),
            other => Err(BindError::Evaluation(format!("Cannot apply 'not' to {other:?}"))),
        },

        BoundExpression::Negate { operand, .. } => negate(evaluate(operand, bindings)?),

        BoundExpression::IsNull {
            operand, negated, ..
        } => {
            let value = evaluate(operand, bindings)?;
            Ok(Value::Bool(value.is_null() != *negated))
        }

        BoundExpression::Coalesce {
            operand, fallback, ..
        } => match evaluate(operand, bindings)? {
            Value::Null => evaluate(fallback, bindings),
            value => Ok(value),
        },

        BoundExpression::Convert {
            operand,
            result_type,
        } => {
            let value = evaluate(operand, bindings)?;
            Ok(convert_value(value, &result_type.data_type))
        }

        BoundExpression::Conditional {
            test,
            if_true,
            if_false,
            ..
        } => {
            if evaluate(test, bindings)? == Value::Bool(true) {
                evaluate(if_true, bindings)
            } else {
                evaluate(if_false, bindings)
            }
        }

        BoundExpression::Call { function, args, .. } => {
            let values = args
                .iter()
                .map(|arg| evaluate(arg, bindings))
                .collect::<Result<Vec<_>>>()?;
            if values.iter().any(Value::is_null) {
                return Err(BindError::NullArgument(function.name().to_string()));
            }
            builtins::invoke(*function, &values)
        }

        BoundExpression::Quantifier {
            kind,
            source,
            lambda,
            ..
        } => {
            let items = collection(evaluate(source, bindings)?, kind.as_str())?;
            for item in items {
                let holds = apply(lambda, item, bindings)?;
                match kind {
                    LambdaKind::Any if holds => return Ok(Value::Bool(true)),
                    LambdaKind::All if !holds => return Ok(Value::Bool(false)),
                    _ => {}
                }
            }
            Ok(Value::Bool(*kind == LambdaKind::All))
        }

        BoundExpression::Count {
            source, predicate, ..
        } => {
            let items = collection(evaluate(source, bindings)?, "$count")?;
            let count = match predicate {
                None => items.len(),
                Some(lambda) => {
                    let mut matched = 0;
                    for item in items {
                        if apply(lambda, item, bindings)? {
                            matched += 1;
                        }
                    }
                    matched
                }
            };
            i64::try_from(count)
                .map(Value::Int64)
                .map_err(|_| BindError::Evaluation(format!("Count {count} out of range")))
        }
    }
}

/// Evaluates a lambda body for one item and interprets it as a predicate.
fn apply(lambda: &LambdaExpression, item: Value, bindings: &mut Bindings) -> Result<bool> {
    bindings.push(&lambda.parameter.name, item);
    let result = evaluate(&lambda.body, bindings);
    bindings.pop();
    truth(&result?)
}

fn collection(value: Value, operation: &str) -> Result<Vec<Value>> {
    match value {
        Value::Collection(items) => Ok(items),
        Value::Null => Err(BindError::NullDereference(operation.to_string())),
        other => Err(BindError::Evaluation(format!(
            "Cannot apply '{operation}' to {other:?}"
        ))),
    }
}

/// Three-valued AND/OR; the right operand is skipped once the left decides.
fn evaluate_logical(
    op: LogicalOp,
    left: &BoundExpression,
    right: &BoundExpression,
    bindings: &mut Bindings,
) -> Result<Value> {
    let dominant = op == LogicalOp::Or;
    let left = kleene(evaluate(left, bindings)?)?;
    if left == Some(dominant) {
        return Ok(Value::Bool(dominant));
    }
    let right = kleene(evaluate(right, bindings)?)?;
    Ok(match (left, right) {
        (_, Some(r)) if r == dominant => Value::Bool(dominant),
        (Some(_), Some(_)) => Value::Bool(!dominant),
        _ => Value::Null,
    })
}

fn kleene(value: Value) -> Result<Option<bool>> {
    match value {
        Value::Bool(b) => Ok(Some(b)),
        Value::Null => Ok(None),
        other => Err(BindError::Evaluation(format!(
            "Expected a boolean, got {other:?}"
        ))),
    }
}

/// Lifted comparison: null if either side is absent.
fn compare(op: ComparisonOp, left: &Value, right: &Value) -> Value {
    if left.is_null() || right.is_null() {
        return Value::Null;
    }
    match left.compare(right) {
        Some(ordering) => Value::Bool(op.test(ordering)),
        // Unordered floats (NaN)
        None => Value::Bool(op == ComparisonOp::Ne),
    }
}

fn arithmetic(op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int32(a), Value::Int32(b)) => {
            let result = integral(op, i64::from(*a), i64::from(*b))?;
            i32::try_from(result)
                .map(Value::Int32)
                .map_err(|_| overflow(op))
        }
        (Value::Int64(a), Value::Int64(b)) => integral(op, *a, *b).map(Value::Int64),
        (Value::Float32(a), Value::Float32(b)) => Ok(Value::Float32(floating(op, *a, *b))),
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(floating(op, *a, *b))),
        _ => Err(BindError::Evaluation(format!(
            "Cannot apply '{}' to {left:?} and {right:?}",
            op.as_str()
        ))),
    }
}

fn integral(op: ArithmeticOp, a: i64, b: i64) -> Result<i64> {
    if matches!(op, ArithmeticOp::Div | ArithmeticOp::Mod) && b == 0 {
        return Err(BindError::DivisionByZero);
    }
    let result = match op {
        ArithmeticOp::Add => a.checked_add(b),
        ArithmeticOp::Sub => a.checked_sub(b),
        ArithmeticOp::Mul => a.checked_mul(b),
        ArithmeticOp::Div => a.checked_div(b),
        ArithmeticOp::Mod => a.checked_rem(b),
    };
    result.ok_or_else(|| overflow(op))
}

fn floating<T>(op: ArithmeticOp, a: T, b: T) -> T
where
    T: std::ops::Add<Output = T>
        + std::ops::Sub<Output = T>
        + std::ops::Mul<Output = T>
        + std::ops::Div<Output = T>
        + std::ops::Rem<Output = T>,
{
    match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Sub => a - b,
        ArithmeticOp::Mul => a * b,
        ArithmeticOp::Div => a / b,
        ArithmeticOp::Mod => a % b,
    }
}

fn overflow(op: ArithmeticOp) -> BindError {
    BindError::Evaluation(format!("Arithmetic overflow in '{}'", op.as_str()))
}

fn negate(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int32(i) => i
            .checked_neg()
            .map(Value::Int32)
            .ok_or_else(|| BindError::Evaluation("Arithmetic overflow in '-'".into())),
        Value::Int64(i) => i
            .checked_neg()
            .map(Value::Int64)
            .ok_or_else(|| BindError::Evaluation("Arithmetic overflow in '-'".into())),
        Value::Float32(f) => Ok(Value::Float32(-f)),
        Value::Float64(f) => Ok(Value::Float64(-f)),
        other => Err(BindError::Evaluation(format!("Cannot negate {other:?}"))),
    }
}

/// Converts a value to `target`. Values that do not fit convert to null.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn convert_value(value: Value, target: &DataType) -> Value {
    if value.data_type().as_ref() == Some(target) {
        return value;
    }
    match (value, target) {
        (Value::Int32(i), DataType::Int64) => Value::Int64(i64::from(i)),
        (Value::Int32(i), DataType::Float32) => Value::Float32(i as f32),
        (Value::Int32(i), DataType::Float64) => Value::Float64(f64::from(i)),
        (Value::Int64(i), DataType::Int32) => i32::try_from(i).map_or(Value::Null, Value::Int32),
        (Value::Int64(i), DataType::Float32) => Value::Float32(i as f32),
        (Value::Int64(i), DataType::Float64) => Value::Float64(i as f64),
        (Value::Float32(f), DataType::Float64) => Value::Float64(f64::from(f)),
        (Value::Float32(f), DataType::Int32 | DataType::Int64) => float_to_integral(f64::from(f), target),
        (Value::Float64(f), DataType::Int32 | DataType::Int64) => float_to_integral(f, target),
        (Value::Float64(f), DataType::Float32) => Value::Float32(f as f32),
        (Value::DateTimeOffset(d), DataType::Date) => Value::Date(d.date_naive()),
        (Value::Enum { value, .. }, DataType::Int64) => Value::Int64(value),
        (Value::Enum { value, .. }, DataType::Int32) => {
            i32::try_from(value).map_or(Value::Null, Value::Int32)
        }
        (value, DataType::String) => display_string(&value).map_or(Value::Null, Value::String),
        // Structured and collection values carry no type of their own; the
        // binder only allows casting them to their own type.
        (value @ Value::Element(_), DataType::Structured(_))
        | (value @ Value::Collection(_), DataType::Collection(_)) => value,
        _ => Value::Null,
    }
}

/// Truncates toward zero; out-of-range and non-finite values become null.
#[allow(clippy::cast_precision_loss)]
fn float_to_integral(f: f64, target: &DataType) -> Value {
    let truncated = f.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Value::Null;
    }
    let i = truncated as i64;
    match target {
        DataType::Int32 => i32::try_from(i).map_or(Value::Null, Value::Int32),
        _ => Value::Int64(i),
    }
}

fn display_string(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Int32(i) => Some(i.to_string()),
        Value::Int64(i) => Some(i.to_string()),
        Value::Float32(f) => Some(f.to_string()),
        Value::Float64(f) => Some(f.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Value::DateTimeOffset(d) => Some(d.to_rfc3339()),
        _ => None,
    }
}
