//! Binder contract tests.

mod catalog_contract;
mod error_contract;
mod null_propagation_contract;
mod order_by_contract;
