//! Value, `DataType` and `TypeRef` definitions for filterbind.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Semantic data types understood by the binder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Calendar date without time zone.
    Date,
    /// Instant with a fixed UTC offset.
    DateTimeOffset,
    /// Schema-defined enumeration, by name.
    Enum(String),
    /// Schema-defined structured type, by name.
    Structured(String),
    /// Collection of elements of the given type.
    Collection(Box<TypeRef>),
    /// Type of an untyped null literal.
    Null,
}

impl DataType {
    /// Returns whether this type is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64
        )
    }

    /// Returns whether this type is an integral type.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64)
    }

    /// Returns whether this type is a single-valued primitive.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            DataType::Bool
                | DataType::Int32
                | DataType::Int64
                | DataType::Float32
                | DataType::Float64
                | DataType::String
                | DataType::Date
                | DataType::DateTimeOffset
        )
    }

    /// Returns whether values of this type can be used as sort keys.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.is_primitive() || matches!(self, DataType::Enum(_))
    }

    /// Returns the element type if this is a collection type.
    #[must_use]
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            DataType::Collection(element) => Some(element),
            _ => None,
        }
    }

    /// Creates a collection type of non-nullable elements.
    #[must_use]
    pub fn collection_of(element: DataType) -> Self {
        DataType::Collection(Box::new(TypeRef::non_null(element)))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => f.write_str("Bool"),
            DataType::Int32 => f.write_str("Int32"),
            DataType::Int64 => f.write_str("Int64"),
            DataType::Float32 => f.write_str("Float32"),
            DataType::Float64 => f.write_str("Float64"),
            DataType::String => f.write_str("String"),
            DataType::Date => f.write_str("Date"),
            DataType::DateTimeOffset => f.write_str("DateTimeOffset"),
            DataType::Enum(name) | DataType::Structured(name) => f.write_str(name),
            DataType::Collection(element) => write!(f, "Collection({element})"),
            DataType::Null => f.write_str("Null"),
        }
    }
}

/// A data type together with its nullability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Underlying data type.
    pub data_type: DataType,
    /// Whether the value may be absent.
    pub nullable: bool,
}

impl TypeRef {
    /// Creates a non-nullable type reference.
    #[must_use]
    pub fn non_null(data_type: DataType) -> Self {
        TypeRef {
            data_type,
            nullable: false,
        }
    }

    /// Creates a nullable type reference.
    #[must_use]
    pub fn nullable(data_type: DataType) -> Self {
        TypeRef {
            data_type,
            nullable: true,
        }
    }

    /// Type of an untyped null literal.
    #[must_use]
    pub fn null() -> Self {
        TypeRef::nullable(DataType::Null)
    }

    /// Returns the same type with nullability set.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Returns a nullable copy of this type.
    #[must_use]
    pub fn as_nullable(&self) -> Self {
        self.clone().with_nullable(true)
    }

    /// Returns whether this is the untyped null type.
    #[must_use]
    pub fn is_null_type(&self) -> bool {
        self.data_type == DataType::Null
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable && !self.is_null_type() {
            write!(f, "{}?", self.data_type)
        } else {
            write!(f, "{}", self.data_type)
        }
    }
}

/// Runtime value container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer value.
    Int32(i32),
    /// 64-bit signed integer value.
    Int64(i64),
    /// 32-bit floating point value.
    Float32(f32),
    /// 64-bit floating point value.
    Float64(f64),
    /// String value.
    String(String),
    /// Date value.
    Date(NaiveDate),
    /// Instant with offset.
    DateTimeOffset(DateTime<FixedOffset>),
    /// Enumeration value, stored by its underlying integral value.
    Enum { type_name: String, value: i64 },
    /// Structured value.
    Element(Element),
    /// Collection value.
    Collection(Vec<Value>),
}

static NULL_VALUE: Value = Value::Null;

impl Value {
    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Attempts to extract an integral value, widening `Int32`.
    #[must_use]
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int32(i) => Some(i64::from(*i)),
            Value::Int64(i) | Value::Enum { value: i, .. } => Some(*i),
            _ => None,
        }
    }

    /// Returns the primitive data type of this value, or None for null and
    /// values whose type is only known from the schema.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Bool(_) => Some(DataType::Bool),
            Value::Int32(_) => Some(DataType::Int32),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float32(_) => Some(DataType::Float32),
            Value::Float64(_) => Some(DataType::Float64),
            Value::String(_) => Some(DataType::String),
            Value::Date(_) => Some(DataType::Date),
            Value::DateTimeOffset(_) => Some(DataType::DateTimeOffset),
            Value::Enum { type_name, .. } => Some(DataType::Enum(type_name.clone())),
            Value::Null | Value::Element(_) | Value::Collection(_) => None,
        }
    }

    /// Compares two values of the same type.
    ///
    /// Returns None if either value is null or types don't match.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::Float32(a), Value::Float32(b)) => a.partial_cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTimeOffset(a), Value::DateTimeOffset(b)) => Some(a.cmp(b)),
            (
                Value::Enum {
                    type_name: ta,
                    value: a,
                },
                Value::Enum {
                    type_name: tb,
                    value: b,
                },
            ) if ta == tb => Some(a.cmp(b)),
            // Null or type mismatch
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<Element> for Value {
    fn from(v: Element) -> Self {
        Value::Element(v)
    }
}

/// A structured data element: member name to value. Missing members read as
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    members: HashMap<String, Value>,
}

impl Element {
    /// Creates a new empty element.
    #[must_use]
    pub fn new() -> Self {
        Element {
            members: HashMap::new(),
        }
    }

    /// Builder-style member assignment.
    #[must_use]
    pub fn with(mut self, member: &str, value: impl Into<Value>) -> Self {
        self.members.insert(member.to_string(), value.into());
        self
    }

    /// Sets a member value.
    pub fn set(&mut self, member: String, value: Value) {
        self.members.insert(member, value);
    }

    /// Gets a member value if present.
    #[must_use]
    pub fn get(&self, member: &str) -> Option<&Value> {
        self.members.get(member)
    }

    /// Reads a member, treating a missing member as null.
    #[must_use]
    pub fn member(&self, member: &str) -> &Value {
        self.members.get(member).unwrap_or(&NULL_VALUE)
    }

    /// Returns the number of members present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the element has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns an iterator over the members and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.members.iter()
    }
}
