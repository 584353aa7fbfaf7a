//! SQL utilities for statement building
//!
//! Provides identifier sanitization, per-statement builder state, clause
//! assembly and parameter extraction.

pub mod builder;
pub mod clause;
pub mod entry;
pub mod parameter;
pub mod sanitize;

pub use builder::{DesiredColumns, SqlBuilder};
pub use clause::ColumnNamePair;
pub use entry::{BoundValue, SqlBuilderEntry};
pub use parameter::{DbParameter, SqlParameter, number_placeholders};
pub use sanitize::{
    MAX_IDENTIFIER_LENGTH, names_match, quote_bracketed, quote_identifier, quote_qualified,
    to_clr_name, validate_identifier,
};
