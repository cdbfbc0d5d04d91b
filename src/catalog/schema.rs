//! Schema definitions for structured and enumeration types.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};
use crate::types::DataType;

use super::conversion::ConversionTable;

/// Capability the binder needs from a schema model.
pub trait SchemaCatalog {
    /// Looks up a member of a structured type.
    fn member(&self, type_name: &str, member: &str) -> Option<&MemberDef>;

    /// Looks up an enumeration type.
    fn enum_type(&self, name: &str) -> Option<&EnumTypeSchema>;

    /// Returns the key member names of a structured type (empty if none).
    fn key_members(&self, type_name: &str) -> Vec<String>;

    /// Returns the promotion and cast tables.
    fn conversions(&self) -> &ConversionTable;
}

/// In-memory registry of the types a query may reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Structured type schemas.
    structured_types: HashMap<String, StructuredTypeSchema>,
    /// Enumeration type schemas.
    #[serde(default)]
    enum_types: HashMap<String, EnumTypeSchema>,
    /// Promotion and cast rules.
    #[serde(default)]
    conversions: ConversionTable,
}

impl Catalog {
    /// Creates a new empty catalog with the default conversion table.
    #[must_use]
    pub fn new() -> Self {
        Catalog {
            structured_types: HashMap::new(),
            enum_types: HashMap::new(),
            conversions: ConversionTable::default(),
        }
    }

    /// Replaces the conversion table.
    #[must_use]
    pub fn with_conversions(mut self, conversions: ConversionTable) -> Self {
        self.conversions = conversions;
        self
    }

    fn ensure_name_free(&self, name: &str) -> Result<()> {
        if self.structured_types.contains_key(name) || self.enum_types.contains_key(name) {
            return Err(BindError::SchemaError(format!(
                "Type '{name}' already exists"
            )));
        }
        Ok(())
    }

    /// Registers a structured type.
    ///
    /// # Errors
    ///
    /// Returns an error if a type with the same name already exists.
    pub fn create_structured_type(&mut self, schema: StructuredTypeSchema) -> Result<()> {
        self.ensure_name_free(&schema.name)?;
        self.structured_types.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Registers an enumeration type.
    ///
    /// # Errors
    ///
    /// Returns an error if a type with the same name already exists.
    pub fn create_enum_type(&mut self, schema: EnumTypeSchema) -> Result<()> {
        self.ensure_name_free(&schema.name)?;
        self.enum_types.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Retrieves a structured type schema by name.
    #[must_use]
    pub fn get_structured_type(&self, name: &str) -> Option<&StructuredTypeSchema> {
        self.structured_types.get(name)
    }

    /// Checks if a type of either kind exists.
    #[must_use]
    pub fn type_exists(&self, name: &str) -> bool {
        self.structured_types.contains_key(name) || self.enum_types.contains_key(name)
    }

    /// Serializes the catalog to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BindError::CatalogError(format!("Failed to serialize catalog: {e}")))
    }

    /// Deserializes a catalog from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| BindError::CatalogError(format!("Failed to deserialize catalog: {e}")))
    }
}

impl SchemaCatalog for Catalog {
    fn member(&self, type_name: &str, member: &str) -> Option<&MemberDef> {
        self.get_structured_type(type_name)?.get_member(member)
    }

    fn enum_type(&self, name: &str) -> Option<&EnumTypeSchema> {
        self.enum_types.get(name)
    }

    fn key_members(&self, type_name: &str) -> Vec<String> {
        self.get_structured_type(type_name)
            .map(|s| s.key.clone())
            .unwrap_or_default()
    }

    fn conversions(&self) -> &ConversionTable {
        &self.conversions
    }
}

/// Schema definition for a structured (entity or complex) type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredTypeSchema {
    /// Type name.
    pub name: String,
    /// Ordered member definitions.
    pub members: Vec<MemberDef>,
    /// Member names forming the key. Empty for complex types.
    pub key: Vec<String>,
}

impl StructuredTypeSchema {
    /// Creates a new structured type schema with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (empty members, duplicate names,
    /// unknown or nullable key member).
    pub fn new(name: String, members: Vec<MemberDef>, key: Vec<String>) -> Result<Self> {
        let schema = StructuredTypeSchema { name, members, key };
        schema.validate()?;
        Ok(schema)
    }

    fn validate(&self) -> Result<()> {
        if self.members.is_empty() {
            return Err(BindError::SchemaError(format!(
                "Type '{}' must have at least one member",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            if !seen.insert(&member.name) {
                return Err(BindError::SchemaError(format!(
                    "Duplicate member name '{}'",
                    member.name
                )));
            }
        }

        for key in &self.key {
            match self.get_member(key) {
                None => {
                    return Err(BindError::SchemaError(format!(
                        "Key member '{key}' not found in type '{}'",
                        self.name
                    )))
                }
                Some(member) if member.nullable => {
                    return Err(BindError::SchemaError(format!(
                        "Key member '{key}' must not be nullable"
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Finds a member definition by name.
    #[must_use]
    pub fn get_member(&self, name: &str) -> Option<&MemberDef> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Definition of a single member of a structured type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDef {
    /// Member name.
    pub name: String,
    /// Declared data type.
    pub data_type: DataType,
    /// Whether the member may be absent.
    pub nullable: bool,
}

impl MemberDef {
    /// Creates a new member definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the member name is empty.
    pub fn new(name: String, data_type: DataType, nullable: bool) -> Result<Self> {
        if name.is_empty() {
            return Err(BindError::SchemaError("Member name cannot be empty".into()));
        }
        Ok(MemberDef {
            name,
            data_type,
            nullable,
        })
    }
}

/// A named value of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// Schema definition for an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTypeSchema {
    /// Type name.
    pub name: String,
    /// Named members with their underlying values.
    pub members: Vec<EnumMember>,
    /// Whether values combine as bit flags.
    pub is_flags: bool,
}

impl EnumTypeSchema {
    /// Creates a new enumeration schema with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no members or a member name repeats.
    pub fn new(name: String, members: Vec<(String, i64)>, is_flags: bool) -> Result<Self> {
        if members.is_empty() {
            return Err(BindError::SchemaError(format!(
                "Enum '{name}' must have at least one member"
            )));
        }
        let mut seen = HashSet::new();
        for (member, _) in &members {
            if !seen.insert(member.as_str()) {
                return Err(BindError::SchemaError(format!(
                    "Duplicate enum member '{member}' in '{name}'"
                )));
            }
        }
        Ok(EnumTypeSchema {
            name,
            members: members
                .into_iter()
                .map(|(name, value)| EnumMember { name, value })
                .collect(),
            is_flags,
        })
    }

    /// Resolves a member name, or a comma separated list of names for flags
    /// enums, to its underlying value.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<i64> {
        if self.is_flags && name.contains(',') {
            return name
                .split(',')
                .map(|part| self.value_of_single(part.trim()))
                .try_fold(0i64, |acc, v| v.map(|v| acc | v));
        }
        self.value_of_single(name)
    }

    fn value_of_single(&self, name: &str) -> Option<i64> {
        self.members.iter().find(|m| m.name == name).map(|m| m.value)
    }
}
