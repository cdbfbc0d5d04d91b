//! Scan operator over an in-memory element set.

use crate::error::Result;
use crate::executor::PhysicalOperator;
use crate::types::Element;

/// Yields each element of a set in order.
pub struct ScanOperator {
    elements: std::vec::IntoIter<Element>,
}

impl ScanOperator {
    /// Creates a new scan operator over the given elements.
    #[must_use]
    pub fn new(elements: Vec<Element>) -> Self {
        ScanOperator {
            elements: elements.into_iter(),
        }
    }
}

impl PhysicalOperator for ScanOperator {
    fn next(&mut self) -> Result<Option<Element>> {
        Ok(self.elements.next())
    }
}
