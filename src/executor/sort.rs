//! Multi-key sort driven by order-by selectors.

use std::cmp::Ordering;

use crate::binder::{LambdaExpression, OrderBySelector};
use crate::clause::Direction;
use crate::error::Result;
use crate::executor::invoke;
use crate::types::{Element, Value};

/// Sorts elements by the selectors, first selector most significant.
///
/// The sort is stable. Absent keys, including keys read through an absent
/// value, order lowest, so they come first ascending and last descending.
///
/// # Errors
///
/// Returns the first error raised while evaluating a sort key, e.g.
/// `DivisionByZero`.
pub fn sort_elements(elements: Vec<Element>, selectors: &[OrderBySelector]) -> Result<Vec<Element>> {
    let sort_keys: Vec<LambdaExpression> = selectors.iter().map(OrderBySelector::sort_key).collect();
    let mut keyed = elements
        .into_iter()
        .map(|element| {
            let keys = sort_keys
                .iter()
                .map(|key| invoke(key, Value::Element(element.clone())))
                .collect::<Result<Vec<_>>>()?;
            Ok((keys, element))
        })
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, selectors));
    Ok(keyed.into_iter().map(|(_, element)| element).collect())
}

fn compare_keys(a: &[Value], b: &[Value], selectors: &[OrderBySelector]) -> Ordering {
    for ((va, vb), selector) in a.iter().zip(b).zip(selectors) {
        let ordering = match (va.is_null(), vb.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => va.compare(vb).unwrap_or(Ordering::Equal),
        };

        if ordering != Ordering::Equal {
            return match selector.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
        }
    }
    Ordering::Equal
}
