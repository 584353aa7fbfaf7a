//! # runtara-sql-builder
//!
//! A metadata-driven SQL statement builder.
//!
//! Given cached column metadata for a table, view or stored procedure, this
//! crate binds caller-supplied values (maps or described objects) to columns
//! and renders parameterized INSERT, UPDATE, DELETE, SELECT and procedure call
//! statements together with their parameter lists. It never connects to a
//! database; statements are handed to whatever driver the caller uses.
//!
//! ## Features
//!
//! - **Flexible Binding**: Match map keys or object properties to columns ignoring case
//! - **Strict Mode**: Optionally reject inputs that match no column
//! - **Explicit NULLs**: Distinguish "set to NULL" from "never mentioned"
//! - **Read Column Selection**: Keys, identity columns, all columns or an explicit list
//! - **Dialects**: SQL Server and PostgreSQL quoting and type tags
//! - **Parameter Extraction**: Driver-neutral parameters in column order
//!
//! ## Quick Start
//!
//! ```rust
//! use runtara_sql_builder::{BuilderConfig, MetadataCatalog, SqlServerDialect};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = MetadataCatalog::from_json(
//!     SqlServerDialect,
//!     BuilderConfig::default(),
//!     r#"{
//!         "tables": [{
//!             "name": "HR.Employee",
//!             "columns": [
//!                 {"name": "EmployeeKey", "type": "int", "is_primary_key": true, "is_identity": true},
//!                 {"name": "FirstName", "type": "nvarchar(50)"},
//!                 {"name": "Title", "type": "nvarchar(100)"}
//!             ]
//!         }]
//!     }"#,
//! )?;
//!
//! let statement = catalog.insert(
//!     "HR.Employee",
//!     &serde_json::json!({"FirstName": "Tom", "Title": null}),
//! )?;
//!
//! assert_eq!(
//!     statement.sql,
//!     "INSERT INTO [HR].[Employee] ([FirstName], [Title]) VALUES (@FirstName, @Title);"
//! );
//! assert_eq!(statement.parameters.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Commands issued through a catalog are configured using `BuilderConfig`:
//!
//! ```rust
//! use runtara_sql_builder::BuilderConfig;
//!
//! let config = BuilderConfig::builder()
//!     .strict_mode(true)              // Reject unmatched keys and properties
//!     .use_object_defined_keys(false) // Keep the table's primary key
//!     .statement_terminator(";")      // Default terminator
//!     .quote_object_names(true)       // Quote table and procedure names
//!     .build();
//! ```
//!
//! ## Working With Builders Directly
//!
//! [`SqlBuilder`] exposes the underlying operations for callers that assemble
//! their own statements, for example with an `OUTPUT` clause.

pub mod catalog;
pub mod column;
pub mod config;
pub mod dialect;
pub mod error;
pub mod property;
pub mod sql;
pub mod types;

// Re-export main types for convenience
pub use catalog::{MetadataCatalog, MetadataSource, Statement};
pub use column::ColumnMetadata;
pub use config::{BuilderConfig, BuilderConfigBuilder};
pub use dialect::{Dialect, PgType, PostgresDialect, SqlDbType, SqlServerDialect, TypeMapper};
pub use error::{Result, SqlBuilderError};
pub use property::{ArgumentMap, Bindable, PropertyDescriptor, PropertyGetter};
pub use types::{
    CatalogDefinition, ColumnDefinition, ParameterDefinition, ProcedureDefinition, TableDefinition,
};

// Re-export builder types for advanced users
pub use sql::builder::{DesiredColumns, SqlBuilder};
pub use sql::clause::ColumnNamePair;
pub use sql::entry::{BoundValue, SqlBuilderEntry};
pub use sql::parameter::{DbParameter, SqlParameter};
