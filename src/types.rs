//! Serializable metadata definitions
//!
//! Table, view and procedure shapes as they are loaded into a
//! [`MetadataCatalog`](crate::MetadataCatalog), typically from JSON.

use serde::{Deserialize, Serialize};

use crate::sql::sanitize::validate_identifier;

// ============================================================================
// Columns and Tables
// ============================================================================

/// Column definition for a table or view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDefinition {
    /// Column name as known to the database
    pub name: String,

    /// Declared type name, e.g. "nvarchar(50)" or "integer"
    #[serde(rename = "type")]
    pub type_name: String,

    /// Whether the value is computed by the database (default: false)
    #[serde(default)]
    pub is_computed: bool,

    /// Whether the value is generated on insert (default: false)
    #[serde(default)]
    pub is_identity: bool,

    /// Whether the column is part of the primary key (default: false)
    #[serde(default)]
    pub is_primary_key: bool,
}

impl ColumnDefinition {
    /// Create a new column definition with a name and declared type
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_computed: false,
            is_identity: false,
            is_primary_key: false,
        }
    }

    /// Mark the column as part of the primary key
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark the column as an identity column
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    /// Mark the column as computed
    pub fn computed(mut self) -> Self {
        self.is_computed = true;
        self
    }
}

/// Table or view definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDefinition {
    /// Possibly schema-qualified name, e.g. "HR.Employee"
    pub name: String,

    /// Columns in ordinal order
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Check the table and column names
    ///
    /// Column names must be unique ignoring case, since inputs are matched
    /// case-insensitively.
    pub fn validate(&self) -> Result<(), String> {
        validate_name("table", &self.name)?;
        if self.columns.is_empty() {
            return Err(format!("Table '{}' has no columns", self.name));
        }
        validate_unique(
            &self.name,
            self.columns.iter().map(|c| c.name.as_str()),
            "column",
        )
    }
}

// ============================================================================
// Procedures
// ============================================================================

/// Formal parameter of a stored procedure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDefinition {
    /// Parameter name, with or without a leading `@`
    pub name: String,

    /// Declared type name
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Stored procedure or function definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcedureDefinition {
    pub name: String,

    /// Formal parameters in declaration order (default: none)
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
}

impl ProcedureDefinition {
    pub fn new(name: impl Into<String>, parameters: Vec<ParameterDefinition>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Check the procedure and parameter names
    pub fn validate(&self) -> Result<(), String> {
        validate_name("procedure", &self.name)?;
        validate_unique(
            &self.name,
            self.parameters
                .iter()
                .map(|p| p.name.trim_start_matches('@')),
            "parameter",
        )
    }
}

/// Everything a catalog is loaded from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogDefinition {
    #[serde(default)]
    pub tables: Vec<TableDefinition>,

    #[serde(default)]
    pub procedures: Vec<ProcedureDefinition>,
}

fn validate_name(kind: &str, name: &str) -> Result<(), String> {
    validate_identifier(name).map_err(|e| format!("Invalid {} name: {}", kind, e))
}

fn validate_unique<'a>(
    owner: &str,
    names: impl Iterator<Item = &'a str>,
    kind: &str,
) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        validate_name(kind, name)?;
        if !seen.insert(name.to_lowercase()) {
            return Err(format!("Duplicate {} '{}' in {}", kind, name, owner));
        }
    }
    Ok(())
}
