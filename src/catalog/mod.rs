//! Catalog of the types a query may reference.

mod conversion;
mod schema;

pub use conversion::{Conversion, ConversionTable};
pub use schema::{
    Catalog, EnumMember, EnumTypeSchema, MemberDef, SchemaCatalog, StructuredTypeSchema,
};
