//! Null-propagation rewriter.
//!
//! Member reads, function calls, quantifiers and counts fail at evaluation
//! when the value they dereference is absent. The rewriter guards each such
//! node whose operand is nullable:
//!
//! ```text
//! if <operand is null> then null else <node>
//! ```
//!
//! Operators are already lifted, so the guarded null flows up as unknown and
//! is folded to `false` at the top of a predicate.
//!
//! Rewriting is idempotent: guards the rewriter inserts carry a tag, so a
//! second pass strips and rebuilds them instead of wrapping them again.

use tracing::trace;

use crate::types::DataType;

use super::expression::{BoundExpression, LambdaExpression};

/// Rewrites a bound graph so absent values yield null instead of failing.
#[must_use]
pub fn propagate_nulls(expr: BoundExpression) -> BoundExpression {
    match expr {
        BoundExpression::Constant { .. } | BoundExpression::Parameter { .. } => expr,

        BoundExpression::Conditional {
            if_false,
            null_guard: true,
            ..
        } => propagate_nulls(*if_false),
        BoundExpression::Conditional {
            test,
            if_true,
            if_false,
            null_guard: false,
            result_type,
        } => BoundExpression::Conditional {
            test: Box::new(propagate_nulls(*test)),
            if_true: Box::new(propagate_nulls(*if_true)),
            if_false: Box::new(propagate_nulls(*if_false)),
            null_guard: false,
            result_type,
        },

        BoundExpression::MemberRead {
            source,
            member,
            result_type,
        } => guard(BoundExpression::MemberRead {
            source: Box::new(propagate_nulls(*source)),
            member,
            result_type,
        }),

        BoundExpression::Call {
            function,
            args,
            result_type,
        } => guard(BoundExpression::Call {
            function,
            args: args.into_iter().map(propagate_nulls).collect(),
            result_type,
        }),

        BoundExpression::Quantifier {
            kind,
            source,
            lambda,
            result_type,
        } => guard(BoundExpression::Quantifier {
            kind,
            source: Box::new(propagate_nulls(*source)),
            lambda: Box::new(rewrite_predicate_lambda(*lambda)),
            result_type,
        }),

        BoundExpression::Count {
            source,
            predicate,
            result_type,
        } => guard(BoundExpression::Count {
            source: Box::new(propagate_nulls(*source)),
            predicate: predicate.map(|lambda| Box::new(rewrite_predicate_lambda(*lambda))),
            result_type,
        }),

        BoundExpression::Comparison {
            left,
            op,
            right,
            result_type,
        } => BoundExpression::Comparison {
            left: Box::new(propagate_nulls(*left)),
            op,
            right: Box::new(propagate_nulls(*right)),
            result_type,
        },
        BoundExpression::Logical {
            left,
            op,
            right,
            result_type,
        } => BoundExpression::Logical {
            left: Box::new(propagate_nulls(*left)),
            op,
            right: Box::new(propagate_nulls(*right)),
            result_type,
        },
        BoundExpression::Arithmetic {
            left,
            op,
            right,
            result_type,
        } => BoundExpression::Arithmetic {
            left: Box::new(propagate_nulls(*left)),
            op,
            right: Box::new(propagate_nulls(*right)),
            result_type,
        },
        BoundExpression::Has {
            value,
            flag,
            result_type,
        } => BoundExpression::Has {
            value: Box::new(propagate_nulls(*value)),
            flag: Box::new(propagate_nulls(*flag)),
            result_type,
        },
        BoundExpression::Not {
            operand,
            result_type,
        } => BoundExpression::Not {
            operand: Box::new(propagate_nulls(*operand)),
            result_type,
        },
        BoundExpression::Negate {
            operand,
            result_type,
        } => BoundExpression::Negate {
            operand: Box::new(propagate_nulls(*operand)),
            result_type,
        },
        BoundExpression::IsNull {
            operand,
            negated,
            result_type,
        } => BoundExpression::IsNull {
            operand: Box::new(propagate_nulls(*operand)),
            negated,
            result_type,
        },
        BoundExpression::Coalesce {
            operand,
            fallback,
            result_type,
        } => BoundExpression::Coalesce {
            operand: Box::new(propagate_nulls(*operand)),
            fallback: Box::new(propagate_nulls(*fallback)),
            result_type,
        },
        BoundExpression::Convert {
            operand,
            result_type,
        } => BoundExpression::Convert {
            operand: Box::new(propagate_nulls(*operand)),
            result_type,
        },
    }
}

/// Rewrites a predicate body and folds unknown to `false`.
///
/// The fold `coalesce(body, false)` is applied only when the rewritten body
/// is a nullable boolean.
#[must_use]
pub fn propagate_nulls_in_predicate(body: BoundExpression) -> BoundExpression {
    let body = propagate_nulls(body);
    let result_type = body.result_type();
    if result_type.nullable && result_type.data_type == DataType::Bool {
        BoundExpression::coalesce(body, BoundExpression::boolean(false))
    } else {
        body
    }
}

fn rewrite_predicate_lambda(lambda: LambdaExpression) -> LambdaExpression {
    LambdaExpression::new(lambda.parameter, propagate_nulls_in_predicate(lambda.body))
}

/// Builds the absence test for the operands `node` dereferences, or None if
/// none of them is nullable.
fn null_test(node: &BoundExpression) -> Option<BoundExpression> {
    let operands: Vec<&BoundExpression> = match node {
        BoundExpression::MemberRead { source, .. }
        | BoundExpression::Quantifier { source, .. }
        | BoundExpression::Count { source, .. } => vec![source.as_ref()],
        BoundExpression::Call { args, .. } => args.iter().collect(),
        _ => return None,
    };

    operands
        .into_iter()
        .filter(|operand| operand.result_type().nullable)
        .map(|operand| BoundExpression::is_null(operand.clone(), false))
        .reduce(BoundExpression::or)
}

fn guard(node: BoundExpression) -> BoundExpression {
    let Some(test) = null_test(&node) else {
        return node;
    };
    trace!(shape = node.shape(), "Guarding nullable dereference");
    BoundExpression::null_guard(test, node)
}
