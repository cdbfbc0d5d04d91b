//! Node binders: one clause node to one bound expression.

use crate::catalog::SchemaCatalog;
use crate::clause::{ClauseNode, FilterClause, LambdaKind};
use crate::error::{BindError, Result};
use crate::types::{DataType, TypeRef, Value};

use super::context::BinderContext;
use super::expression::{BoundExpression, LambdaExpression, Parameter};
use super::filter::{FilterBinder, NestedFilterBinder};
use super::functions;
use super::operators::{bind_binary, bind_unary, promote};

/// Binds a clause node and its children.
///
/// # Errors
///
/// Returns the first binding error met in the subtree.
pub(crate) fn bind_node(node: &ClauseNode, context: &mut BinderContext<'_>) -> Result<BoundExpression> {
    let mut context = context.descend()?;
    match node {
        ClauseNode::Literal {
            value,
            declared_type,
        } => Ok(BoundExpression::constant(value.clone(), declared_type.clone())),

        ClauseNode::RangeVariableRef(name) => {
            let result_type = context.resolve_range_variable(name)?.clone();
            Ok(BoundExpression::Parameter {
                name: name.clone(),
                result_type,
            })
        }

        ClauseNode::MemberAccess { source, member } => {
            let source = bind_node(source, &mut context)?;
            bind_member_read(source, member, context.catalog())
        }

        ClauseNode::BinaryOp { kind, left, right } => {
            let left = bind_node(left, &mut context)?;
            let right = bind_node(right, &mut context)?;
            bind_binary(*kind, left, right, context.catalog())
        }

        ClauseNode::UnaryOp { kind, operand } => {
            let operand = bind_node(operand, &mut context)?;
            bind_unary(*kind, operand)
        }

        ClauseNode::FunctionCall { name, args } => {
            let args = args
                .iter()
                .map(|arg| bind_node(arg, &mut context))
                .collect::<Result<Vec<_>>>()?;
            bind_call(name, args, context.catalog())
        }

        ClauseNode::Cast { target, operand } => {
            let operand = bind_node(operand, &mut context)?;
            bind_cast(operand, target, context.catalog())
        }

        ClauseNode::CollectionLambda {
            kind,
            source,
            range_variable,
            body,
        } => bind_lambda(*kind, source, range_variable, body, &mut context),

        ClauseNode::CollectionCount { source, filter } => {
            bind_count(source, filter.as_deref(), &mut context)
        }
    }
}

fn bind_member_read(
    source: BoundExpression,
    member: &str,
    catalog: &dyn SchemaCatalog,
) -> Result<BoundExpression> {
    let source_type = source.result_type();
    let DataType::Structured(type_name) = &source_type.data_type else {
        return Err(BindError::type_mismatch(&format!("/{member}"), &[source_type]));
    };
    let definition = catalog
        .member(type_name, member)
        .ok_or_else(|| BindError::UnknownMember {
            type_name: type_name.clone(),
            member: member.to_string(),
        })?;

    let result_type =
        TypeRef::non_null(definition.data_type.clone()).with_nullable(definition.nullable || source_type.nullable);
    Ok(BoundExpression::MemberRead {
        source: Box::new(source),
        member: member.to_string(),
        result_type,
    })
}

fn bind_call(
    name: &str,
    args: Vec<BoundExpression>,
    catalog: &dyn SchemaCatalog,
) -> Result<BoundExpression> {
    let arg_types: Vec<TypeRef> = args.iter().map(|arg| arg.result_type().clone()).collect();
    let (function, signature) = functions::resolve(name, &arg_types, catalog.conversions())?;

    let nullable = arg_types.iter().any(|t| t.nullable);
    let args = args
        .into_iter()
        .zip(&signature.params)
        .map(|(arg, param)| promote(arg, param))
        .collect();
    Ok(BoundExpression::Call {
        function,
        args,
        result_type: TypeRef::non_null(signature.result).with_nullable(nullable),
    })
}

/// Explicit conversion. The result is always nullable: a value that does not
/// fit the target converts to null.
fn bind_cast(
    operand: BoundExpression,
    target: &DataType,
    catalog: &dyn SchemaCatalog,
) -> Result<BoundExpression> {
    if operand.is_null_constant() {
        return Ok(BoundExpression::null_of(target.clone()));
    }

    let from = &operand.result_type().data_type;
    let allowed = match from {
        DataType::Enum(_) => target.is_integral() || from == target,
        _ => catalog.conversions().can_cast(from, target),
    };
    if !allowed {
        return Err(BindError::InvalidCast {
            from: from.to_string(),
            to: target.to_string(),
        });
    }
    Ok(BoundExpression::convert(operand, TypeRef::nullable(target.clone())))
}

/// Binds the source of a collection node and returns its element type.
fn bind_collection_source(
    operation: &str,
    source: &ClauseNode,
    context: &mut BinderContext<'_>,
) -> Result<(BoundExpression, TypeRef)> {
    let source = bind_node(source, context)?;
    let element_type = source
        .result_type()
        .data_type
        .element_type()
        .cloned()
        .ok_or_else(|| BindError::type_mismatch(operation, &[source.result_type()]))?;
    Ok((source, element_type))
}

fn bind_lambda(
    kind: LambdaKind,
    source: &ClauseNode,
    range_variable: &str,
    body: &ClauseNode,
    context: &mut BinderContext<'_>,
) -> Result<BoundExpression> {
    let (source, element_type) = bind_collection_source(kind.as_str(), source, context)?;

    let body = {
        let mut scope = context.push_scope(range_variable, element_type.clone())?;
        bind_node(body, &mut scope)?
    };
    let body_type = body.result_type().data_type.clone();
    let body = match body_type {
        DataType::Bool => body,
        DataType::Null => promote(body, &DataType::Bool),
        _ => {
            return Err(BindError::type_mismatch(
                kind.as_str(),
                &[source.result_type(), body.result_type()],
            ))
        }
    };

    let result_type = TypeRef::non_null(DataType::Bool).with_nullable(source.result_type().nullable);
    Ok(BoundExpression::Quantifier {
        kind,
        source: Box::new(source),
        lambda: Box::new(LambdaExpression::new(
            Parameter::new(range_variable, element_type),
            body,
        )),
        result_type,
    })
}

fn bind_count(
    source: &ClauseNode,
    filter: Option<&FilterClause>,
    context: &mut BinderContext<'_>,
) -> Result<BoundExpression> {
    let (source, element_type) = bind_collection_source("$count", source, context)?;

    let predicate = match filter {
        Some(clause) => {
            let predicate = match context.active_filter_binder() {
                Some(binder) => binder.bind_nested(clause, &element_type, context)?,
                None => FilterBinder::new().bind_nested(clause, &element_type, context)?,
            };
            Some(Box::new(predicate.into_lambda()))
        }
        None => None,
    };

    let result_type = TypeRef::non_null(DataType::Int64).with_nullable(source.result_type().nullable);
    Ok(BoundExpression::Count {
        source: Box::new(source),
        predicate,
        result_type,
    })
}
