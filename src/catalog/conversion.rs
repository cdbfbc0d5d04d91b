//! Promotion and cast tables.
//!
//! Which widenings are implicit and which conversions need an explicit cast is
//! configuration, not a universal rule: hosts may replace the default table
//! through [`Catalog::with_conversions`](super::Catalog::with_conversions).

use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// A single directed conversion between two data types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub from: DataType,
    pub to: DataType,
}

impl Conversion {
    #[must_use]
    pub fn new(from: DataType, to: DataType) -> Self {
        Conversion { from, to }
    }
}

/// Implicit promotion and explicit cast rules between primitive types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionTable {
    /// Widenings applied implicitly when operand types differ. Order matters:
    /// earlier targets are preferred when searching for a common type.
    pub implicit: Vec<Conversion>,
    /// Additional conversions allowed only through an explicit cast.
    pub explicit: Vec<Conversion>,
}

impl Default for ConversionTable {
    fn default() -> Self {
        use DataType::{Bool, Date, DateTimeOffset, Float32, Float64, Int32, Int64, String};

        let implicit = vec![
            Conversion::new(Int32, Int64),
            Conversion::new(Int32, Float32),
            Conversion::new(Int32, Float64),
            Conversion::new(Int64, Float32),
            Conversion::new(Int64, Float64),
            Conversion::new(Float32, Float64),
        ];

        let mut explicit = vec![
            Conversion::new(Int64, Int32),
            Conversion::new(Float32, Int32),
            Conversion::new(Float32, Int64),
            Conversion::new(Float64, Int32),
            Conversion::new(Float64, Int64),
            Conversion::new(Float64, Float32),
            Conversion::new(DateTimeOffset, Date),
        ];
        for from in [Bool, Int32, Int64, Float32, Float64, Date, DateTimeOffset] {
            explicit.push(Conversion::new(from, String));
        }

        ConversionTable { implicit, explicit }
    }
}

impl ConversionTable {
    /// Creates a table with no conversions besides identity.
    #[must_use]
    pub fn empty() -> Self {
        ConversionTable {
            implicit: Vec::new(),
            explicit: Vec::new(),
        }
    }

    /// Returns true if `from` converts to `to` without an explicit cast.
    #[must_use]
    pub fn can_promote(&self, from: &DataType, to: &DataType) -> bool {
        from == to
            || self
                .implicit
                .iter()
                .any(|c| &c.from == from && &c.to == to)
    }

    /// Returns true if `from` may be cast to `to`.
    #[must_use]
    pub fn can_cast(&self, from: &DataType, to: &DataType) -> bool {
        self.can_promote(from, to)
            || self
                .explicit
                .iter()
                .any(|c| &c.from == from && &c.to == to)
    }

    /// Finds the type both operands promote to.
    ///
    /// Prefers the identical type, then a direct widening of one operand into
    /// the other, then the first implicit target both operands widen into.
    #[must_use]
    pub fn common_type(&self, left: &DataType, right: &DataType) -> Option<DataType> {
        if left == right {
            return Some(left.clone());
        }
        if self.can_promote(left, right) {
            return Some(right.clone());
        }
        if self.can_promote(right, left) {
            return Some(left.clone());
        }
        self.implicit
            .iter()
            .map(|c| &c.to)
            .find(|target| self.can_promote(left, target) && self.can_promote(right, target))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_type_widens_integer_to_floating() {
        let table = ConversionTable::default();
        assert_eq!(
            table.common_type(&DataType::Int32, &DataType::Float64),
            Some(DataType::Float64)
        );
        assert_eq!(
            table.common_type(&DataType::Int64, &DataType::Int32),
            Some(DataType::Int64)
        );
        assert_eq!(table.common_type(&DataType::String, &DataType::Int32), None);
    }

    #[test]
    fn test_common_type_via_shared_target() {
        let table = ConversionTable {
            implicit: vec![
                Conversion::new(DataType::Int32, DataType::Float64),
                Conversion::new(DataType::Int64, DataType::Float64),
            ],
            explicit: Vec::new(),
        };
        assert_eq!(
            table.common_type(&DataType::Int32, &DataType::Int64),
            Some(DataType::Float64)
        );
    }

    #[test]
    fn test_narrowing_requires_explicit_cast() {
        let table = ConversionTable::default();
        assert!(!table.can_promote(&DataType::Int64, &DataType::Int32));
        assert!(table.can_cast(&DataType::Int64, &DataType::Int32));
        assert!(!table.can_cast(&DataType::String, &DataType::Int32));
    }

    #[test]
    fn test_table_is_serializable_configuration() {
        let table = ConversionTable::default();
        let json = serde_json::to_string(&table).unwrap();
        let restored: ConversionTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);
    }
}
