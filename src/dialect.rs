//! Database dialects
//!
//! A dialect supplies everything a [`ColumnMetadata`](crate::ColumnMetadata)
//! derives at construction: identifier quoting, bind-variable naming, the
//! identifier-safe name, and the mapping from declared type names to the
//! backend's type tag.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::sql::parameter::number_placeholders;
use crate::sql::sanitize::{quote_bracketed, quote_identifier, quote_qualified, to_clr_name};

/// Maps declared column type names to a database-specific type tag
pub trait TypeMapper {
    /// The backend's type enumeration
    type DbType: Copy + Debug + PartialEq + Send + Sync + 'static;

    /// Look up the tag for a declared type name. Unknown names yield `None`.
    fn type_name_to_db_type(&self, type_name: &str) -> Option<Self::DbType>;
}

/// Naming conventions of a database backend
pub trait Dialect: TypeMapper {
    /// Quote a single identifier
    fn quote_identifier(&self, name: &str) -> String;

    /// Format a name as a bind variable
    fn variable_name(&self, name: &str) -> String {
        format!("@{}", to_clr_name(name))
    }

    /// Derive the identifier-safe name used to match object properties
    fn clr_name(&self, name: &str) -> String {
        to_clr_name(name)
    }

    /// Quote a possibly schema-qualified table, view or procedure name
    fn quote_object_name(&self, name: &str) -> String {
        quote_qualified(name, |part| self.quote_identifier(part))
    }

    /// Render a procedure call passing each `(parameter, variable)` pair by name
    fn procedure_call(&self, procedure: &str, arguments: &[(&str, &str)]) -> String;

    /// Rewrite bind variables in finished statement text into the form the
    /// backend's drivers accept. `parameters` lists variable names in the
    /// order their values are sent. Named variables are kept by default.
    fn finalize_placeholders(&self, sql: &str, _parameters: &[&str]) -> String {
        sql.to_string()
    }
}

/// Strip a length/precision suffix such as `(50)` or `(10,2)` and normalize case
fn base_type_name(type_name: &str) -> String {
    type_name
        .split('(')
        .next()
        .unwrap_or(type_name)
        .trim()
        .to_lowercase()
}

// ============================================================================
// SQL Server
// ============================================================================

/// SQL Server column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlDbType {
    BigInt,
    Binary,
    Bit,
    Char,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Float,
    Image,
    Int,
    Money,
    NChar,
    NText,
    NVarChar,
    Real,
    SmallDateTime,
    SmallInt,
    SmallMoney,
    Text,
    Time,
    Timestamp,
    TinyInt,
    UniqueIdentifier,
    VarBinary,
    VarChar,
    Variant,
    Xml,
}

/// SQL Server: `[name]` identifiers and `@name` variables
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl TypeMapper for SqlServerDialect {
    type DbType = SqlDbType;

    fn type_name_to_db_type(&self, type_name: &str) -> Option<SqlDbType> {
        let db_type = match base_type_name(type_name).as_str() {
            "bigint" => SqlDbType::BigInt,
            "binary" => SqlDbType::Binary,
            "bit" => SqlDbType::Bit,
            "char" => SqlDbType::Char,
            "date" => SqlDbType::Date,
            "datetime" => SqlDbType::DateTime,
            "datetime2" => SqlDbType::DateTime2,
            "datetimeoffset" => SqlDbType::DateTimeOffset,
            "decimal" | "numeric" => SqlDbType::Decimal,
            "float" => SqlDbType::Float,
            "image" => SqlDbType::Image,
            "int" => SqlDbType::Int,
            "money" => SqlDbType::Money,
            "nchar" => SqlDbType::NChar,
            "ntext" => SqlDbType::NText,
            "nvarchar" | "sysname" => SqlDbType::NVarChar,
            "real" => SqlDbType::Real,
            "smalldatetime" => SqlDbType::SmallDateTime,
            "smallint" => SqlDbType::SmallInt,
            "smallmoney" => SqlDbType::SmallMoney,
            "text" => SqlDbType::Text,
            "time" => SqlDbType::Time,
            "rowversion" | "timestamp" => SqlDbType::Timestamp,
            "tinyint" => SqlDbType::TinyInt,
            "uniqueidentifier" => SqlDbType::UniqueIdentifier,
            "varbinary" => SqlDbType::VarBinary,
            "varchar" => SqlDbType::VarChar,
            "sql_variant" => SqlDbType::Variant,
            "xml" => SqlDbType::Xml,
            _ => return None,
        };
        Some(db_type)
    }
}

impl Dialect for SqlServerDialect {
    fn quote_identifier(&self, name: &str) -> String {
        quote_bracketed(name)
    }

    fn procedure_call(&self, procedure: &str, arguments: &[(&str, &str)]) -> String {
        if arguments.is_empty() {
            return format!("EXEC {}", procedure);
        }
        let assignments = arguments
            .iter()
            .map(|(parameter, variable)| {
                if parameter.starts_with('@') {
                    format!("{} = {}", parameter, variable)
                } else {
                    format!("@{} = {}", parameter, variable)
                }
            })
            .collect::<Vec<_>>();
        format!("EXEC {} {}", procedure, assignments.join(", "))
    }
}

// ============================================================================
// PostgreSQL
// ============================================================================

/// PostgreSQL column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PgType {
    Bigint,
    Boolean,
    Bytea,
    Char,
    Date,
    Double,
    Integer,
    Json,
    Jsonb,
    Numeric,
    Real,
    Smallint,
    Text,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Varchar,
}

/// PostgreSQL: `"name"` identifiers and `@name` variables
///
/// Builders render `@name`; finished statements are rewritten to `$1`, `$2`,
/// ... in parameter order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl TypeMapper for PostgresDialect {
    type DbType = PgType;

    fn type_name_to_db_type(&self, type_name: &str) -> Option<PgType> {
        let db_type = match base_type_name(type_name).as_str() {
            "bigint" | "int8" | "bigserial" => PgType::Bigint,
            "boolean" | "bool" => PgType::Boolean,
            "bytea" => PgType::Bytea,
            "char" | "character" | "bpchar" => PgType::Char,
            "date" => PgType::Date,
            "double precision" | "float8" => PgType::Double,
            "integer" | "int" | "int4" | "serial" => PgType::Integer,
            "json" => PgType::Json,
            "jsonb" => PgType::Jsonb,
            "numeric" | "decimal" => PgType::Numeric,
            "real" | "float4" => PgType::Real,
            "smallint" | "int2" | "smallserial" => PgType::Smallint,
            "text" => PgType::Text,
            "time" | "time without time zone" => PgType::Time,
            "timestamp" | "timestamp without time zone" => PgType::Timestamp,
            "timestamptz" | "timestamp with time zone" => PgType::TimestampTz,
            "uuid" => PgType::Uuid,
            "varchar" | "character varying" => PgType::Varchar,
            _ => return None,
        };
        Some(db_type)
    }
}

impl Dialect for PostgresDialect {
    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier(name)
    }

    fn procedure_call(&self, procedure: &str, arguments: &[(&str, &str)]) -> String {
        let named = arguments
            .iter()
            .map(|(parameter, variable)| format!("{} => {}", parameter, variable))
            .collect::<Vec<_>>();
        format!("SELECT * FROM {}({})", procedure, named.join(", "))
    }

    fn finalize_placeholders(&self, sql: &str, parameters: &[&str]) -> String {
        number_placeholders(sql, parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // SQL Server Tests
    // =========================================================================

    #[test]
    fn test_sql_server_naming() {
        let dialect = SqlServerDialect;
        assert_eq!(dialect.quote_identifier("First Name"), "[First Name]");
        assert_eq!(dialect.variable_name("First Name"), "@FirstName");
        assert_eq!(dialect.clr_name("First Name"), "FirstName");
        assert_eq!(dialect.quote_object_name("HR.Employee"), "[HR].[Employee]");
    }

    #[test]
    fn test_sql_server_type_mapping() {
        let dialect = SqlServerDialect;
        assert_eq!(dialect.type_name_to_db_type("int"), Some(SqlDbType::Int));
        assert_eq!(
            dialect.type_name_to_db_type("NVARCHAR(50)"),
            Some(SqlDbType::NVarChar)
        );
        assert_eq!(
            dialect.type_name_to_db_type("decimal(10, 2)"),
            Some(SqlDbType::Decimal)
        );
        assert_eq!(dialect.type_name_to_db_type("geography"), None);
    }

    #[test]
    fn test_sql_server_procedure_call() {
        let dialect = SqlServerDialect;
        assert_eq!(
            dialect.procedure_call("[HR].[Find]", &[("@Name", "@Name"), ("Age", "@Age")]),
            "EXEC [HR].[Find] @Name = @Name, @Age = @Age"
        );
        assert_eq!(dialect.procedure_call("[Ping]", &[]), "EXEC [Ping]");
    }

    // =========================================================================
    // PostgreSQL Tests
    // =========================================================================

    #[test]
    fn test_postgres_naming() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.quote_identifier("first_name"), "\"first_name\"");
        assert_eq!(dialect.variable_name("first_name"), "@first_name");
        assert_eq!(
            dialect.quote_object_name("public.employee"),
            "\"public\".\"employee\""
        );
    }

    #[test]
    fn test_postgres_type_mapping() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.type_name_to_db_type("int4"), Some(PgType::Integer));
        assert_eq!(
            dialect.type_name_to_db_type("character varying(255)"),
            Some(PgType::Varchar)
        );
        assert_eq!(
            dialect.type_name_to_db_type("timestamp with time zone"),
            Some(PgType::TimestampTz)
        );
        assert_eq!(dialect.type_name_to_db_type("tsvector"), None);
    }

    #[test]
    fn test_postgres_numbers_placeholders() {
        let dialect = PostgresDialect;
        assert_eq!(
            dialect.finalize_placeholders(
                "UPDATE \"t\" SET \"a\" = @a WHERE \"id\" = @id",
                &["@id", "@a"]
            ),
            "UPDATE \"t\" SET \"a\" = $2 WHERE \"id\" = $1"
        );
    }

    #[test]
    fn test_sql_server_keeps_named_placeholders() {
        let sql = "DELETE FROM [t] WHERE [id] = @id";
        assert_eq!(SqlServerDialect.finalize_placeholders(sql, &["@id"]), sql);
    }

    #[test]
    fn test_postgres_procedure_call() {
        let dialect = PostgresDialect;
        assert_eq!(
            dialect.procedure_call("\"search\"", &[("term", "@term")]),
            "SELECT * FROM \"search\"(term => @term)"
        );
    }
}
