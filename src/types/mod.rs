//! Data types and runtime values.

mod value;

pub use value::{DataType, Element, TypeRef, Value};
