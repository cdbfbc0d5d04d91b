//! filterbind - semantic binder for query clauses
//!
//! Turns parsed `$filter` and `$orderby` clause trees into typed expression
//! graphs over a schema catalog, with null propagation so that absent values
//! fold to `false` in predicates. A reference evaluator runs the bound graphs
//! over in-memory elements.

pub mod binder;
pub mod catalog;
pub mod clause;
pub mod config;
pub mod error;
pub mod executor;
pub mod types;

pub use binder::{
    BinderContext, BoundExpression, FilterBinder, OrderByBinder, OrderBySelector, Predicate,
};
pub use catalog::{Catalog, SchemaCatalog};
pub use clause::{ClauseNode, FilterClause, OrderByClause};
pub use config::BinderConfig;
pub use error::{BindError, Result};
pub use types::{DataType, Element, TypeRef, Value};

use executor::{FilterOperator, PhysicalOperator, ScanOperator};

/// Filters and sorts `elements` of `element_type` by the given clauses.
///
/// Either clause may be omitted. Elements keep their input order when no
/// order-by clause is given.
///
/// # Errors
///
/// Returns any binding error of the clauses and any evaluation error met
/// while filtering or sorting.
pub fn apply_clauses(
    catalog: &dyn SchemaCatalog,
    element_type: DataType,
    config: BinderConfig,
    filter: Option<&FilterClause>,
    order_by: Option<&OrderByClause>,
    elements: Vec<Element>,
) -> Result<Vec<Element>> {
    let filter_binder = FilterBinder::new();
    let mut context = BinderContext::new(catalog, element_type).with_config(config);

    let mut operator: Box<dyn PhysicalOperator> = Box::new(ScanOperator::new(elements));
    if let Some(clause) = filter {
        let predicate = filter_binder.bind(Some(clause), Some(&mut context))?;
        operator = Box::new(FilterOperator::new(operator, predicate));
    }
    let elements = executor::collect(operator.as_mut())?;

    match order_by {
        Some(clause) => {
            let selectors = OrderByBinder::new().bind(Some(clause), Some(&mut context))?;
            executor::sort_elements(elements, &selectors)
        }
        None => Ok(elements),
    }
}
