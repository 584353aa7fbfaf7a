//! Column and parameter metadata
//!
//! A [`ColumnMetadata`] is built once per column (or formal procedure
//! parameter), wrapped in an `Arc`, and shared by every builder cloned from
//! the same template.

use crate::dialect::Dialect;

/// Immutable description of a table/view column or procedure parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata<D> {
    sql_name: String,
    clr_name: String,
    quoted_sql_name: String,
    sql_variable_name: String,
    type_name: String,
    db_type: Option<D>,
    is_computed: bool,
    is_identity: bool,
    is_primary_key: bool,
}

impl<D: Copy> ColumnMetadata<D> {
    /// Describe a table or view column
    pub fn new<Dl>(
        dialect: &Dl,
        name: impl Into<String>,
        type_name: impl Into<String>,
        is_computed: bool,
        is_primary_key: bool,
        is_identity: bool,
    ) -> Self
    where
        Dl: Dialect<DbType = D> + ?Sized,
    {
        let sql_name = name.into();
        let type_name = type_name.into();
        Self {
            clr_name: dialect.clr_name(&sql_name),
            quoted_sql_name: dialect.quote_identifier(&sql_name),
            sql_variable_name: dialect.variable_name(&sql_name),
            db_type: dialect.type_name_to_db_type(&type_name),
            sql_name,
            type_name,
            is_computed,
            is_identity,
            is_primary_key,
        }
    }

    /// Describe a formal procedure parameter
    ///
    /// Parameters carry no key, computed or identity semantics.
    pub fn parameter<Dl>(dialect: &Dl, name: impl Into<String>, type_name: impl Into<String>) -> Self
    where
        Dl: Dialect<DbType = D> + ?Sized,
    {
        Self::new(dialect, name, type_name, false, false, false)
    }

    /// Name as known to the database
    pub fn sql_name(&self) -> &str {
        &self.sql_name
    }

    /// Identifier-safe name, matched against object property names
    pub fn clr_name(&self) -> &str {
        &self.clr_name
    }

    /// Name quoted for use in statement text
    pub fn quoted_sql_name(&self) -> &str {
        &self.quoted_sql_name
    }

    /// Name formatted as a bind variable
    pub fn sql_variable_name(&self) -> &str {
        &self.sql_variable_name
    }

    /// Declared type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Database type tag, if the declared type name was recognized
    pub fn db_type(&self) -> Option<D> {
        self.db_type
    }

    pub fn is_computed(&self) -> bool {
        self.is_computed
    }

    pub fn is_identity(&self) -> bool {
        self.is_identity
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{PgType, PostgresDialect, SqlDbType, SqlServerDialect};

    #[test]
    fn test_sql_server_column_names() {
        let col = ColumnMetadata::new(&SqlServerDialect, "First Name", "nvarchar(50)", false, false, false);

        assert_eq!(col.sql_name(), "First Name");
        assert_eq!(col.clr_name(), "FirstName");
        assert_eq!(col.quoted_sql_name(), "[First Name]");
        assert_eq!(col.sql_variable_name(), "@FirstName");
        assert_eq!(col.type_name(), "nvarchar(50)");
        assert_eq!(col.db_type(), Some(SqlDbType::NVarChar));
    }

    #[test]
    fn test_postgres_column_flags() {
        let col = ColumnMetadata::new(&PostgresDialect, "id", "serial", false, true, true);

        assert_eq!(col.quoted_sql_name(), "\"id\"");
        assert_eq!(col.db_type(), Some(PgType::Integer));
        assert!(col.is_primary_key());
        assert!(col.is_identity());
        assert!(!col.is_computed());
    }

    #[test]
    fn test_unknown_type_has_no_tag() {
        let col = ColumnMetadata::new(&PostgresDialect, "shape", "geometry", false, false, false);
        assert_eq!(col.db_type(), None);
    }

    #[test]
    fn test_parameter_has_no_column_flags() {
        let param = ColumnMetadata::parameter(&SqlServerDialect, "@LastName", "varchar");

        assert_eq!(param.clr_name(), "LastName");
        assert_eq!(param.sql_variable_name(), "@LastName");
        assert!(!param.is_primary_key());
        assert!(!param.is_identity());
        assert!(!param.is_computed());
    }
}
