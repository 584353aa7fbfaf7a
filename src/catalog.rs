//! MetadataCatalog - cached metadata and statement commands
//!
//! The catalog owns one builder template per table, view and procedure. Every
//! command clones the template, binds the caller's value and renders a single
//! parameterized [`Statement`]. Nothing is sent to a database.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::column::ColumnMetadata;
use crate::config::BuilderConfig;
use crate::dialect::Dialect;
use crate::error::{Result, SqlBuilderError};
use crate::property::Bindable;
use crate::sql::builder::{DesiredColumns, SqlBuilder};
use crate::sql::parameter::SqlParameter;
use crate::types::{CatalogDefinition, ProcedureDefinition, TableDefinition};

/// Source of column and parameter metadata for named database objects
pub trait MetadataSource<D> {
    /// Columns of a table or view, in ordinal order
    fn get_columns(&self, name: &str) -> Result<Vec<Arc<ColumnMetadata<D>>>>;

    /// Formal parameters of a stored procedure, in declaration order
    fn get_parameters(&self, name: &str) -> Result<Vec<Arc<ColumnMetadata<D>>>>;
}

/// Rendered statement text and its parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement<D> {
    pub sql: String,
    pub parameters: Vec<SqlParameter<D>>,
}

impl<D> Statement<D> {
    /// Whether no statement was produced
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// A cached template and the name it is rendered with
#[derive(Debug, Clone)]
struct CachedObject<D> {
    rendered_name: String,
    template: SqlBuilder<D>,
}

/// Metadata cache and statement factory for one dialect
#[derive(Debug)]
pub struct MetadataCatalog<Dl: Dialect> {
    dialect: Dl,
    config: BuilderConfig,
    tables: HashMap<String, CachedObject<Dl::DbType>>,
    procedures: HashMap<String, CachedObject<Dl::DbType>>,
}

impl<Dl: Dialect> MetadataCatalog<Dl> {
    /// Create an empty catalog
    pub fn new(dialect: Dl, config: BuilderConfig) -> Self {
        Self {
            dialect,
            config,
            tables: HashMap::new(),
            procedures: HashMap::new(),
        }
    }

    /// Create a catalog from a loaded definition
    pub fn from_definition(
        dialect: Dl,
        config: BuilderConfig,
        definition: CatalogDefinition,
    ) -> Result<Self> {
        let mut catalog = Self::new(dialect, config);
        for table in definition.tables {
            catalog.add_table(table)?;
        }
        for procedure in definition.procedures {
            catalog.add_procedure(procedure)?;
        }
        Ok(catalog)
    }

    /// Create a catalog from a JSON [`CatalogDefinition`]
    pub fn from_json(dialect: Dl, config: BuilderConfig, json: &str) -> Result<Self> {
        let definition: CatalogDefinition = serde_json::from_str(json)?;
        Self::from_definition(dialect, config, definition)
    }

    pub fn dialect(&self) -> &Dl {
        &self.dialect
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Register a table or view, replacing any previous definition of the same name
    pub fn add_table(&mut self, table: TableDefinition) -> Result<()> {
        table.validate().map_err(SqlBuilderError::validation)?;

        let columns = table
            .columns
            .iter()
            .map(|c| {
                Arc::new(ColumnMetadata::new(
                    &self.dialect,
                    c.name.as_str(),
                    c.type_name.as_str(),
                    c.is_computed,
                    c.is_primary_key,
                    c.is_identity,
                ))
            })
            .collect::<Vec<_>>();
        check_derived_names(&table.name, &columns)?;

        tracing::debug!(table = %table.name, columns = columns.len(), "registered table");

        let cached = CachedObject {
            rendered_name: self.render_object_name(&table.name),
            template: SqlBuilder::new(table.name.as_str(), &columns),
        };
        self.tables.insert(table.name.to_lowercase(), cached);
        Ok(())
    }

    /// Register a stored procedure, replacing any previous definition of the same name
    pub fn add_procedure(&mut self, procedure: ProcedureDefinition) -> Result<()> {
        procedure.validate().map_err(SqlBuilderError::validation)?;

        let parameters = procedure
            .parameters
            .iter()
            .map(|p| {
                Arc::new(ColumnMetadata::parameter(
                    &self.dialect,
                    p.name.as_str(),
                    p.type_name.as_str(),
                ))
            })
            .collect::<Vec<_>>();
        check_derived_names(&procedure.name, &parameters)?;

        tracing::debug!(procedure = %procedure.name, parameters = parameters.len(), "registered procedure");

        let cached = CachedObject {
            rendered_name: self.render_object_name(&procedure.name),
            template: SqlBuilder::for_procedure(procedure.name.as_str(), &parameters),
        };
        self.procedures.insert(procedure.name.to_lowercase(), cached);
        Ok(())
    }

    /// Registered table and view names, sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tables.values().map(|t| t.template.name()).collect();
        names.sort_unstable();
        names
    }

    /// Registered procedure names, sorted
    pub fn procedure_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.procedures.values().map(|p| p.template.name()).collect();
        names.sort_unstable();
        names
    }

    /// A fresh builder for a table or view. Names are matched ignoring case.
    pub fn table_builder(&self, name: &str) -> Result<SqlBuilder<Dl::DbType>> {
        Ok(self.table(name)?.template.clone())
    }

    /// A fresh builder for a stored procedure. Names are matched ignoring case.
    pub fn procedure_builder(&self, name: &str) -> Result<SqlBuilder<Dl::DbType>> {
        Ok(self.procedure(name)?.template.clone())
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// INSERT of every insertable column the value supplies
    pub fn insert<T: Bindable>(&self, table: &str, value: &T) -> Result<Statement<Dl::DbType>> {
        let cached = self.table(table)?;
        let mut builder = cached.template.clone();
        builder.bind_from_object(value, self.config.use_object_defined_keys, self.config.strict_mode)?;

        let mut sql = String::new();
        builder.build_insert_statement(&mut sql, &cached.rendered_name, self.terminator())?;
        Ok(self.finish("insert", &builder, sql))
    }

    /// UPDATE of every updatable column the value supplies, filtered by key
    pub fn update<T: Bindable>(&self, table: &str, value: &T) -> Result<Statement<Dl::DbType>> {
        let cached = self.table(table)?;
        let mut builder = cached.template.clone();
        builder.bind_from_object(value, self.config.use_object_defined_keys, self.config.strict_mode)?;
        require_key_values(&builder)?;

        let mut sql = String::new();
        builder.build_update_by_key_statement(&mut sql, &cached.rendered_name, self.terminator())?;
        Ok(self.finish("update", &builder, sql))
    }

    /// DELETE filtered by key
    pub fn delete<T: Bindable>(&self, table: &str, value: &T) -> Result<Statement<Dl::DbType>> {
        let cached = self.table(table)?;
        let mut builder = cached.template.clone();
        builder.bind_from_object(value, self.config.use_object_defined_keys, self.config.strict_mode)?;
        require_key_values(&builder)?;

        let mut sql = String::new();
        builder.build_delete_statement(&mut sql, &cached.rendered_name, self.terminator())?;
        Ok(self.finish("delete", &builder, sql))
    }

    /// SELECT of the desired columns filtered by key
    ///
    /// Returns an empty statement when no column ends up readable.
    pub fn select_by_key<T: Bindable>(
        &self,
        table: &str,
        value: &T,
        desired: &DesiredColumns,
    ) -> Result<Statement<Dl::DbType>> {
        let cached = self.table(table)?;
        let mut builder = cached.template.clone();
        builder.bind_from_object(value, self.config.use_object_defined_keys, self.config.strict_mode)?;
        require_key_values(&builder)?;
        builder.select_read_columns(desired, self.config.strict_mode)?;

        let mut sql = String::new();
        builder.build_select_by_key_statement(&mut sql, &cached.rendered_name, self.terminator())?;
        Ok(self.finish("select_by_key", &builder, sql))
    }

    /// SELECT of the desired columns filtered by the value's fields
    ///
    /// Null fields become `IS NULL` predicates. The filter is always matched,
    /// so bad filter input fails even when no column ends up readable; in that
    /// case the statement is empty.
    pub fn select_where<T: Bindable>(
        &self,
        table: &str,
        filter: &T,
        desired: &DesiredColumns,
    ) -> Result<Statement<Dl::DbType>> {
        let cached = self.table(table)?;
        let mut builder = cached.template.clone();
        let predicates = builder.filter_clause(filter, self.config.strict_mode)?;
        builder.select_read_columns(desired, self.config.strict_mode)?;
        if !builder.has_read_fields() {
            return Ok(self.finish("select_where", &builder, String::new()));
        }

        let mut sql = String::new();
        let from = format!(" FROM {}", cached.rendered_name);
        builder.build_select_clause(&mut sql, Some("SELECT "), None, Some(&from));
        sql.push_str(" WHERE ");
        sql.push_str(&predicates);
        sql.push_str(&self.config.statement_terminator);
        Ok(self.finish("select_where", &builder, sql))
    }

    /// Call a stored procedure with the arguments the value supplies
    ///
    /// Parameters the value does not mention are left to their defaults.
    pub fn call_procedure<T: Bindable>(
        &self,
        procedure: &str,
        arguments: &T,
    ) -> Result<Statement<Dl::DbType>> {
        let cached = self.procedure(procedure)?;
        let mut builder = cached.template.clone();
        builder.bind_from_object(arguments, false, self.config.strict_mode)?;
        Ok(self.render_call(cached, &mut builder))
    }

    /// Call a stored procedure with every parameter left to its default
    pub fn call_procedure_without_arguments(&self, procedure: &str) -> Result<Statement<Dl::DbType>> {
        let cached = self.procedure(procedure)?;
        let mut builder = cached.template.clone();
        Ok(self.render_call(cached, &mut builder))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn table(&self, name: &str) -> Result<&CachedObject<Dl::DbType>> {
        self.tables
            .get(&name.to_lowercase())
            .ok_or_else(|| SqlBuilderError::object_not_found(format!("table or view '{}'", name)))
    }

    fn procedure(&self, name: &str) -> Result<&CachedObject<Dl::DbType>> {
        self.procedures
            .get(&name.to_lowercase())
            .ok_or_else(|| SqlBuilderError::object_not_found(format!("procedure '{}'", name)))
    }

    fn render_object_name(&self, name: &str) -> String {
        if self.config.quote_object_names {
            self.dialect.quote_object_name(name)
        } else {
            name.to_string()
        }
    }

    fn terminator(&self) -> Option<&str> {
        Some(self.config.statement_terminator.as_str()).filter(|t| !t.is_empty())
    }

    fn render_call(
        &self,
        cached: &CachedObject<Dl::DbType>,
        builder: &mut SqlBuilder<Dl::DbType>,
    ) -> Statement<Dl::DbType> {
        builder.parameterized_columns();

        let arguments = builder
            .entries()
            .iter()
            .filter(|e| e.value.is_present())
            .map(|e| (e.details.sql_name(), e.details.sql_variable_name()))
            .collect::<Vec<_>>();

        let mut sql = self.dialect.procedure_call(&cached.rendered_name, &arguments);
        sql.push_str(&self.config.statement_terminator);
        self.finish("call_procedure", builder, sql)
    }

    fn finish(
        &self,
        command: &str,
        builder: &SqlBuilder<Dl::DbType>,
        sql: String,
    ) -> Statement<Dl::DbType> {
        if sql.is_empty() {
            return Statement {
                sql,
                parameters: Vec::new(),
            };
        }

        let parameters = builder.sql_parameters();
        let names = parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        let sql = self.dialect.finalize_placeholders(&sql, &names);
        tracing::trace!(command, object = %builder.name(), sql = %sql, parameters = parameters.len(), "built statement");
        Statement { sql, parameters }
    }
}

impl<Dl: Dialect> MetadataSource<Dl::DbType> for MetadataCatalog<Dl> {
    fn get_columns(&self, name: &str) -> Result<Vec<Arc<ColumnMetadata<Dl::DbType>>>> {
        Ok(detail_list(&self.table(name)?.template))
    }

    fn get_parameters(&self, name: &str) -> Result<Vec<Arc<ColumnMetadata<Dl::DbType>>>> {
        Ok(detail_list(&self.procedure(name)?.template))
    }
}

fn detail_list<D: Copy>(builder: &SqlBuilder<D>) -> Vec<Arc<ColumnMetadata<D>>> {
    builder
        .entries()
        .iter()
        .map(|e| Arc::clone(&e.details))
        .collect()
}

/// Reject columns or parameters whose derived names are empty or collide
///
/// Inputs are matched by identifier-safe name and parameters are emitted by
/// variable name, so both must identify a single entry.
fn check_derived_names<D: Copy>(owner: &str, columns: &[Arc<ColumnMetadata<D>>]) -> Result<()> {
    let mut clr_names = HashSet::new();
    let mut variable_names = HashSet::new();
    for column in columns {
        if column.clr_name().is_empty() {
            return Err(SqlBuilderError::validation(format!(
                "'{}' in {} has no letters or digits to derive a name from",
                column.sql_name(),
                owner
            )));
        }
        if !clr_names.insert(column.clr_name().to_lowercase())
            || !variable_names.insert(column.sql_variable_name().to_lowercase())
        {
            return Err(SqlBuilderError::validation(format!(
                "'{}' in {} derives the name '{}', which is already in use",
                column.sql_name(),
                owner,
                column.clr_name()
            )));
        }
    }
    Ok(())
}

/// Key-filtered statements need a key and a value for every key column
fn require_key_values<D: Copy>(builder: &SqlBuilder<D>) -> Result<()> {
    let keys = builder.entries().iter().filter(|e| e.is_key).collect::<Vec<_>>();
    if keys.is_empty() {
        return Err(SqlBuilderError::no_primary_key(builder.name()));
    }
    if let Some(missing) = keys.iter().find(|e| !e.value.is_present()) {
        return Err(SqlBuilderError::invalid_argument(format!(
            "no value supplied for key column {} of {}",
            missing.details.sql_name(),
            builder.name()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{SqlDbType, SqlServerDialect};
    use crate::sql::entry::BoundValue;
    use crate::types::{ColumnDefinition, ParameterDefinition};
    use serde_json::json;

    fn catalog(config: BuilderConfig) -> MetadataCatalog<SqlServerDialect> {
        let mut catalog = MetadataCatalog::new(SqlServerDialect, config);
        catalog
            .add_table(TableDefinition::new(
                "HR.Employee",
                vec![
                    ColumnDefinition::new("EmployeeKey", "int").primary_key().identity(),
                    ColumnDefinition::new("FirstName", "nvarchar(50)"),
                    ColumnDefinition::new("Title", "nvarchar(100)"),
                ],
            ))
            .unwrap();
        catalog
            .add_procedure(ProcedureDefinition::new(
                "HR.EmployeeSearch",
                vec![
                    ParameterDefinition::new("@FirstName", "nvarchar(50)"),
                    ParameterDefinition::new("@Title", "nvarchar(100)"),
                ],
            ))
            .unwrap();
        catalog
    }

    // =========================================================================
    // Registration Tests
    // =========================================================================

    #[test]
    fn test_lookup_ignores_case() {
        let catalog = catalog(BuilderConfig::default());
        assert!(catalog.table_builder("hr.employee").is_ok());
        assert!(catalog.procedure_builder("HR.EMPLOYEESEARCH").is_ok());
        assert_eq!(catalog.table_names(), vec!["HR.Employee"]);
        assert_eq!(catalog.procedure_names(), vec!["HR.EmployeeSearch"]);
    }

    #[test]
    fn test_unknown_object_not_found() {
        let catalog = catalog(BuilderConfig::default());
        let err = catalog.table_builder("HR.Missing").unwrap_err();
        assert!(matches!(err, SqlBuilderError::ObjectNotFound(_)));

        let err = catalog.get_parameters("HR.Employee").unwrap_err();
        assert!(matches!(err, SqlBuilderError::ObjectNotFound(_)));
    }

    #[test]
    fn test_invalid_definition_rejected() {
        let mut catalog = catalog(BuilderConfig::default());
        let err = catalog
            .add_table(TableDefinition::new("HR.Empty", vec![]))
            .unwrap_err();
        assert!(matches!(err, SqlBuilderError::Validation(_)));
    }

    #[test]
    fn test_derived_name_collision_rejected() {
        let mut catalog = catalog(BuilderConfig::default());
        let err = catalog
            .add_table(TableDefinition::new(
                "dbo.T",
                vec![
                    ColumnDefinition::new("First Name", "nvarchar(50)"),
                    ColumnDefinition::new("FirstName", "nvarchar(50)"),
                ],
            ))
            .unwrap_err();
        match err {
            SqlBuilderError::Validation(msg) => assert!(msg.contains("'FirstName'")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(catalog.table_builder("dbo.T").is_err());
    }

    #[test]
    fn test_punctuation_only_name_rejected() {
        let mut catalog = catalog(BuilderConfig::default());
        let err = catalog
            .add_procedure(ProcedureDefinition::new(
                "dbo.P",
                vec![ParameterDefinition::new("@$", "int")],
            ))
            .unwrap_err();
        assert!(matches!(err, SqlBuilderError::Validation(_)));
    }

    #[test]
    fn test_non_ascii_columns_get_distinct_variables() {
        let mut catalog = catalog(BuilderConfig::default());
        catalog
            .add_table(TableDefinition::new(
                "dbo.Address",
                vec![
                    ColumnDefinition::new("名前", "nvarchar(50)"),
                    ColumnDefinition::new("住所", "nvarchar(200)"),
                ],
            ))
            .unwrap();

        let statement = catalog
            .insert("dbo.Address", &json!({"名前": "a", "住所": "b"}))
            .unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO [dbo].[Address] ([名前], [住所]) VALUES (@名前, @住所);"
        );
        let names: Vec<_> = statement.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["@名前", "@住所"]);
    }

    #[test]
    fn test_builders_share_metadata() {
        let catalog = catalog(BuilderConfig::default());
        let first = catalog.table_builder("HR.Employee").unwrap();
        let columns = catalog.get_columns("HR.Employee").unwrap();

        assert_eq!(columns.len(), 3);
        assert!(Arc::ptr_eq(&columns[1], &first.entries()[1].details));
        assert_eq!(columns[0].db_type(), Some(SqlDbType::Int));
    }

    #[test]
    fn test_builders_are_independent_copies() {
        let catalog = catalog(BuilderConfig::default());
        let mut first = catalog.table_builder("HR.Employee").unwrap();
        first.bind_from_map(&json!({"Title": "x"}), false).unwrap();

        let second = catalog.table_builder("HR.Employee").unwrap();
        assert_eq!(second.entry("Title").unwrap().value, BoundValue::Unset);
    }

    // =========================================================================
    // Command Tests
    // =========================================================================

    #[test]
    fn test_insert_command() {
        let catalog = catalog(BuilderConfig::default());
        let statement = catalog
            .insert("HR.Employee", &json!({"FirstName": "Tom"}))
            .unwrap();

        assert_eq!(
            statement.sql,
            "INSERT INTO [HR].[Employee] ([FirstName]) VALUES (@FirstName);"
        );
        assert_eq!(statement.parameters.len(), 1);
        assert_eq!(statement.parameters[0].db_type, Some(SqlDbType::NVarChar));
    }

    #[test]
    fn test_unquoted_names_without_terminator() {
        let config = BuilderConfig::builder()
            .quote_object_names(false)
            .without_terminator()
            .build();
        let catalog = catalog(config);
        let statement = catalog
            .delete("HR.Employee", &json!({"EmployeeKey": 4}))
            .unwrap();

        assert_eq!(
            statement.sql,
            "DELETE FROM HR.Employee WHERE [EmployeeKey] = @EmployeeKey"
        );
    }

    #[test]
    fn test_key_commands_require_key_value() {
        let catalog = catalog(BuilderConfig::default());
        let err = catalog
            .update("HR.Employee", &json!({"Title": "Boss"}))
            .unwrap_err();
        assert!(matches!(err, SqlBuilderError::InvalidArgument(_)));
    }

    #[test]
    fn test_strict_config_applies_to_commands() {
        let strict = catalog(BuilderConfig::builder().strict_mode(true).build());
        let err = strict
            .insert("HR.Employee", &json!({"FirstName": "Tom", "Shoe": 9}))
            .unwrap_err();
        assert!(matches!(err, SqlBuilderError::StrictMismatch { .. }));

        let lenient = catalog(BuilderConfig::default());
        assert!(
            lenient
                .insert("HR.Employee", &json!({"FirstName": "Tom", "Shoe": 9}))
                .is_ok()
        );
    }

    #[test]
    fn test_call_procedure_skips_unbound_parameters() {
        let catalog = catalog(BuilderConfig::default());
        let statement = catalog
            .call_procedure("HR.EmployeeSearch", &json!({"Title": "Boss"}))
            .unwrap();

        assert_eq!(statement.sql, "EXEC [HR].[EmployeeSearch] @Title = @Title;");
        assert_eq!(statement.parameters.len(), 1);
        assert_eq!(statement.parameters[0].name, "@Title");
    }

    #[test]
    fn test_call_procedure_without_arguments() {
        let catalog = catalog(BuilderConfig::default());
        let statement = catalog
            .call_procedure_without_arguments("HR.EmployeeSearch")
            .unwrap();

        assert_eq!(statement.sql, "EXEC [HR].[EmployeeSearch];");
        assert!(statement.parameters.is_empty());
    }

    #[test]
    fn test_select_where_checks_filter_without_columns() {
        let strict = catalog(BuilderConfig::builder().strict_mode(true).build());
        let err = strict
            .select_where("HR.Employee", &json!({"Shoe": 1}), &DesiredColumns::None)
            .unwrap_err();
        assert!(matches!(err, SqlBuilderError::StrictMismatch { .. }));

        let lenient = catalog(BuilderConfig::default());
        let err = lenient
            .select_where("HR.Employee", &serde_json::Value::Null, &DesiredColumns::None)
            .unwrap_err();
        assert!(matches!(err, SqlBuilderError::InvalidArgument(_)));

        let err = lenient
            .select_where("HR.Employee", &json!({"Shoe": 1}), &DesiredColumns::All)
            .unwrap_err();
        assert!(matches!(err, SqlBuilderError::NoMatch(_)));
    }

    #[test]
    fn test_select_where_without_columns_is_empty() {
        let catalog = catalog(BuilderConfig::default());
        let statement = catalog
            .select_where("HR.Employee", &json!({"Title": null}), &DesiredColumns::None)
            .unwrap();
        assert!(statement.is_empty());
        assert!(statement.parameters.is_empty());
    }
}
