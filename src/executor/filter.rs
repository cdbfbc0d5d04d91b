//! Filter operator for `$filter` predicates.

use crate::binder::Predicate;
use crate::error::Result;
use crate::executor::PhysicalOperator;
use crate::types::Element;

/// Yields the child's elements the predicate accepts.
pub struct FilterOperator {
    child: Box<dyn PhysicalOperator>,
    predicate: Predicate,
}

impl FilterOperator {
    /// Creates a new filter operator with the given child and predicate.
    #[must_use]
    pub fn new(child: Box<dyn PhysicalOperator>, predicate: Predicate) -> Self {
        FilterOperator { child, predicate }
    }
}

impl PhysicalOperator for FilterOperator {
    fn next(&mut self) -> Result<Option<Element>> {
        while let Some(element) = self.child.next()? {
            if self.predicate.matches(&element)? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }
}
