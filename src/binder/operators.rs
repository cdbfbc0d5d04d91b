//! Operator resolution for binary and unary clause nodes.

use crate::catalog::{ConversionTable, SchemaCatalog};
use crate::clause::{BinaryOperatorKind, UnaryOperatorKind};
use crate::error::{BindError, Result};
use crate::types::{DataType, TypeRef, Value};

use super::expression::{ArithmeticOp, BoundExpression, ComparisonOp, LogicalOp};

/// Converts `expr` to `target`, keeping its nullability.
///
/// A null constant is retyped in place instead of wrapped.
pub(crate) fn promote(expr: BoundExpression, target: &DataType) -> BoundExpression {
    if &expr.result_type().data_type == target {
        return expr;
    }
    if expr.is_null_constant() {
        return BoundExpression::null_of(target.clone());
    }
    let nullable = expr.result_type().nullable;
    BoundExpression::convert(expr, TypeRef::non_null(target.clone()).with_nullable(nullable))
}

/// Binds a binary operator over already bound operands.
pub(crate) fn bind_binary(
    kind: BinaryOperatorKind,
    left: BoundExpression,
    right: BoundExpression,
    catalog: &dyn SchemaCatalog,
) -> Result<BoundExpression> {
    match kind {
        BinaryOperatorKind::Eq => bind_equality(ComparisonOp::Eq, left, right, catalog),
        BinaryOperatorKind::Ne => bind_equality(ComparisonOp::Ne, left, right, catalog),
        BinaryOperatorKind::Lt => bind_ordering(ComparisonOp::Lt, left, right, catalog),
        BinaryOperatorKind::Le => bind_ordering(ComparisonOp::Le, left, right, catalog),
        BinaryOperatorKind::Gt => bind_ordering(ComparisonOp::Gt, left, right, catalog),
        BinaryOperatorKind::Ge => bind_ordering(ComparisonOp::Ge, left, right, catalog),
        BinaryOperatorKind::And => bind_logical(LogicalOp::And, left, right),
        BinaryOperatorKind::Or => bind_logical(LogicalOp::Or, left, right),
        BinaryOperatorKind::Add => bind_arithmetic(ArithmeticOp::Add, left, right, catalog),
        BinaryOperatorKind::Sub => bind_arithmetic(ArithmeticOp::Sub, left, right, catalog),
        BinaryOperatorKind::Mul => bind_arithmetic(ArithmeticOp::Mul, left, right, catalog),
        BinaryOperatorKind::Div => bind_arithmetic(ArithmeticOp::Div, left, right, catalog),
        BinaryOperatorKind::Mod => bind_arithmetic(ArithmeticOp::Mod, left, right, catalog),
        BinaryOperatorKind::Has => bind_has(left, right, catalog),
    }
}

/// Binds a unary operator over an already bound operand.
pub(crate) fn bind_unary(kind: UnaryOperatorKind, operand: BoundExpression) -> Result<BoundExpression> {
    let operand_type = operand.result_type().clone();
    match kind {
        UnaryOperatorKind::Not => {
            let operand = match operand_type.data_type {
                DataType::Bool => operand,
                DataType::Null => promote(operand, &DataType::Bool),
                _ => return Err(BindError::type_mismatch(kind.as_str(), &[operand_type])),
            };
            Ok(BoundExpression::not(operand))
        }
        UnaryOperatorKind::Negate => {
            if !operand_type.data_type.is_numeric() {
                return Err(BindError::type_mismatch(kind.as_str(), &[operand_type]));
            }
            Ok(BoundExpression::Negate {
                operand: Box::new(operand),
                result_type: operand_type,
            })
        }
    }
}

fn mismatch(operation: &str, left: &BoundExpression, right: &BoundExpression) -> BindError {
    BindError::type_mismatch(operation, &[left.result_type(), right.result_type()])
}

/// `eq`/`ne`. A null literal on either side turns the comparison into an
/// absence test.
fn bind_equality(
    op: ComparisonOp,
    left: BoundExpression,
    right: BoundExpression,
    catalog: &dyn SchemaCatalog,
) -> Result<BoundExpression> {
    let negated = op == ComparisonOp::Ne;
    match (left.is_null_constant(), right.is_null_constant()) {
        (true, true) => return Ok(BoundExpression::boolean(!negated)),
        (true, false) => return Ok(BoundExpression::is_null(right, negated)),
        (false, true) => return Ok(BoundExpression::is_null(left, negated)),
        (false, false) => {}
    }

    let (left, right) = resolve_enum_literals(op.as_str(), left, right, catalog)?;
    let operand_type = comparison_type(&left, &right, false, catalog.conversions())
        .ok_or_else(|| mismatch(op.as_str(), &left, &right))?;
    Ok(BoundExpression::comparison(
        promote(left, &operand_type),
        op,
        promote(right, &operand_type),
    ))
}

/// `lt`/`le`/`gt`/`ge` over numbers, dates and same-type enums.
fn bind_ordering(
    op: ComparisonOp,
    left: BoundExpression,
    right: BoundExpression,
    catalog: &dyn SchemaCatalog,
) -> Result<BoundExpression> {
    let (left, right) = resolve_enum_literals(op.as_str(), left, right, catalog)?;
    let operand_type = comparison_type(&left, &right, true, catalog.conversions())
        .ok_or_else(|| mismatch(op.as_str(), &left, &right))?;
    Ok(BoundExpression::comparison(
        promote(left, &operand_type),
        op,
        promote(right, &operand_type),
    ))
}

/// Returns the type both comparison operands are converted to.
fn comparison_type(
    left: &BoundExpression,
    right: &BoundExpression,
    ordering: bool,
    conversions: &ConversionTable,
) -> Option<DataType> {
    let comparable = |data_type: &DataType| {
        if ordering {
            data_type.is_numeric()
                || matches!(
                    data_type,
                    DataType::Date | DataType::DateTimeOffset | DataType::Enum(_)
                )
        } else {
            data_type.is_primitive() || matches!(data_type, DataType::Enum(_))
        }
    };

    let l = &left.result_type().data_type;
    let r = &right.result_type().data_type;
    let target = match (l, r) {
        (DataType::Null, DataType::Null) => return None,
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        _ if l.is_numeric() && r.is_numeric() => conversions.common_type(l, r)?,
        _ if l == r => l.clone(),
        _ => return None,
    };
    comparable(&target).then_some(target)
}

/// Replaces a string literal compared against an enumeration with the named
/// enumeration member.
fn resolve_enum_literals(
    operation: &str,
    left: BoundExpression,
    right: BoundExpression,
    catalog: &dyn SchemaCatalog,
) -> Result<(BoundExpression, BoundExpression)> {
    if let DataType::Enum(name) = &left.result_type().data_type {
        if let Some(right) = enum_from_literal(operation, name, &left, &right, catalog)? {
            return Ok((left, right));
        }
    }
    if let DataType::Enum(name) = &right.result_type().data_type {
        if let Some(left) = enum_from_literal(operation, name, &right, &left, catalog)? {
            return Ok((left, right));
        }
    }
    Ok((left, right))
}

fn enum_from_literal(
    operation: &str,
    enum_name: &str,
    enum_side: &BoundExpression,
    literal: &BoundExpression,
    catalog: &dyn SchemaCatalog,
) -> Result<Option<BoundExpression>> {
    let BoundExpression::Constant {
        value: Value::String(member),
        ..
    } = literal
    else {
        return Ok(None);
    };
    let value = catalog
        .enum_type(enum_name)
        .and_then(|schema| schema.value_of(member))
        .ok_or_else(|| mismatch(operation, enum_side, literal))?;
    Ok(Some(BoundExpression::constant(
        Value::Enum {
            type_name: enum_name.to_string(),
            value,
        },
        TypeRef::non_null(DataType::Enum(enum_name.to_string())),
    )))
}

fn bind_logical(
    op: LogicalOp,
    left: BoundExpression,
    right: BoundExpression,
) -> Result<BoundExpression> {
    let accepts = |e: &BoundExpression| {
        matches!(e.result_type().data_type, DataType::Bool | DataType::Null)
    };
    if !accepts(&left) || !accepts(&right) {
        let operation = match op {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        };
        return Err(mismatch(operation, &left, &right));
    }
    Ok(BoundExpression::logical(
        promote(left, &DataType::Bool),
        op,
        promote(right, &DataType::Bool),
    ))
}

fn bind_arithmetic(
    op: ArithmeticOp,
    left: BoundExpression,
    right: BoundExpression,
    catalog: &dyn SchemaCatalog,
) -> Result<BoundExpression> {
    let l = &left.result_type().data_type;
    let r = &right.result_type().data_type;
    let target = match (l, r) {
        (DataType::Null, other) | (other, DataType::Null) if other.is_numeric() => {
            Some(other.clone())
        }
        _ if l.is_numeric() && r.is_numeric() => catalog.conversions().common_type(l, r),
        _ => None,
    };
    let Some(target) = target else {
        return Err(mismatch(op.as_str(), &left, &right));
    };

    let nullable = left.result_type().nullable || right.result_type().nullable;
    Ok(BoundExpression::Arithmetic {
        left: Box::new(promote(left, &target)),
        op,
        right: Box::new(promote(right, &target)),
        result_type: TypeRef::non_null(target).with_nullable(nullable),
    })
}

/// `value has flag`: the value must be a flags enumeration.
fn bind_has(
    left: BoundExpression,
    right: BoundExpression,
    catalog: &dyn SchemaCatalog,
) -> Result<BoundExpression> {
    let DataType::Enum(name) = &left.result_type().data_type else {
        return Err(mismatch("has", &left, &right));
    };
    let is_flags = catalog.enum_type(name).is_some_and(|schema| schema.is_flags);
    if !is_flags {
        return Err(mismatch("has", &left, &right));
    }

    let flag = match enum_from_literal("has", name, &left, &right, catalog)? {
        Some(flag) => flag,
        None if right.result_type().data_type == left.result_type().data_type => right,
        None => return Err(mismatch("has", &left, &right)),
    };

    let nullable = left.result_type().nullable || flag.result_type().nullable;
    Ok(BoundExpression::Has {
        value: Box::new(left),
        flag: Box::new(flag),
        result_type: TypeRef::non_null(DataType::Bool).with_nullable(nullable),
    })
}
