//! Clause and statement assembly
//!
//! Clause builders append to a caller-owned buffer. Columns whose values are
//! emitted are marked for parameter output, so [`SqlBuilder::parameters`]
//! returns exactly what the generated text references. Calling a builder more
//! than once is safe.
//!
//! The SELECT clause writes nothing at all when no column is readable, while
//! the INSERT, VALUES, SET and WHERE clauses always write their header and
//! footer, even around an empty list.

use crate::error::{Result, SqlBuilderError};
use crate::sql::builder::SqlBuilder;
use crate::sql::entry::SqlBuilderEntry;

/// A column's quoted name and bind-variable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNamePair {
    pub quoted_sql_name: String,
    pub sql_variable_name: String,
}

fn require_table_name(table_name: &str) -> Result<()> {
    if table_name.trim().is_empty() {
        return Err(SqlBuilderError::invalid_argument("table name is null or empty"));
    }
    Ok(())
}

impl<D: Copy> SqlBuilder<D> {
    // =========================================================================
    // Column lists
    // =========================================================================

    /// Columns to insert: insertable with a bound value. Marks them as parameters.
    pub fn insert_columns(&mut self) -> Vec<ColumnNamePair> {
        self.collect_marked(|e| e.use_for_insert && e.value.is_present())
    }

    /// Columns to update: updatable with a bound value. Marks them as parameters.
    pub fn update_columns(&mut self) -> Vec<ColumnNamePair> {
        self.collect_marked(|e| e.use_for_update && e.value.is_present())
    }

    /// Key columns. Marks them as parameters.
    pub fn key_columns(&mut self) -> Vec<ColumnNamePair> {
        self.collect_marked(|e| e.is_key)
    }

    /// Every column with a bound value. Marks them as parameters.
    pub fn parameterized_columns(&mut self) -> Vec<ColumnNamePair> {
        self.collect_marked(|e| e.value.is_present())
    }

    /// Quoted names of the columns marked for reading
    pub fn select_columns(&self) -> Vec<&str> {
        self.entries()
            .iter()
            .filter(|e| e.use_for_read)
            .map(|e| e.details.quoted_sql_name())
            .collect()
    }

    fn collect_marked(
        &mut self,
        include: impl Fn(&SqlBuilderEntry<D>) -> bool,
    ) -> Vec<ColumnNamePair> {
        let mut pairs = Vec::new();
        for entry in self.entries_mut().iter_mut().filter(|e| include(&**e)) {
            entry.use_parameter = true;
            pairs.push(ColumnNamePair {
                quoted_sql_name: entry.details.quoted_sql_name().to_string(),
                sql_variable_name: entry.details.sql_variable_name().to_string(),
            });
        }
        pairs
    }

    // =========================================================================
    // Clauses
    // =========================================================================

    /// Column list for SELECT or OUTPUT. Writes nothing if no column is readable.
    pub fn build_select_clause(
        &self,
        sql: &mut String,
        header: Option<&str>,
        prefix: Option<&str>,
        footer: Option<&str>,
    ) {
        if !self.has_read_fields() {
            return;
        }

        let prefix = prefix.unwrap_or_default();
        let columns = self
            .select_columns()
            .into_iter()
            .map(|c| format!("{}{}", prefix, c))
            .collect::<Vec<_>>();

        sql.push_str(header.unwrap_or_default());
        sql.push_str(&columns.join(", "));
        sql.push_str(footer.unwrap_or_default());
    }

    /// Column list for INSERT, e.g. header `INSERT INTO t (` and footer `)`
    pub fn build_insert_clause(
        &mut self,
        sql: &mut String,
        header: Option<&str>,
        prefix: Option<&str>,
        footer: Option<&str>,
    ) {
        let prefix = prefix.unwrap_or_default();
        let columns = self
            .insert_columns()
            .into_iter()
            .map(|c| format!("{}{}", prefix, c.quoted_sql_name))
            .collect::<Vec<_>>();

        sql.push_str(header.unwrap_or_default());
        sql.push_str(&columns.join(", "));
        sql.push_str(footer.unwrap_or_default());
    }

    /// Variable list for VALUES, e.g. header ` VALUES (` and footer `)`
    pub fn build_values_clause(&mut self, sql: &mut String, header: Option<&str>, footer: Option<&str>) {
        let variables = self
            .insert_columns()
            .into_iter()
            .map(|c| c.sql_variable_name)
            .collect::<Vec<_>>();

        sql.push_str(header.unwrap_or_default());
        sql.push_str(&variables.join(", "));
        sql.push_str(footer.unwrap_or_default());
    }

    /// Assignments for UPDATE, without the SET keyword
    pub fn build_set_clause(
        &mut self,
        sql: &mut String,
        header: Option<&str>,
        prefix: Option<&str>,
        footer: Option<&str>,
    ) {
        let prefix = prefix.unwrap_or_default();
        let assignments = self
            .update_columns()
            .into_iter()
            .map(|c| format!("{}{} = {}", prefix, c.quoted_sql_name, c.sql_variable_name))
            .collect::<Vec<_>>();

        sql.push_str(header.unwrap_or_default());
        sql.push_str(&assignments.join(", "));
        sql.push_str(footer.unwrap_or_default());
    }

    /// Key predicates joined with AND, e.g. header ` WHERE `
    pub fn build_where_clause(&mut self, sql: &mut String, header: Option<&str>, footer: Option<&str>) {
        let predicates = self
            .key_columns()
            .into_iter()
            .map(|c| format!("{} = {}", c.quoted_sql_name, c.sql_variable_name))
            .collect::<Vec<_>>();

        sql.push_str(header.unwrap_or_default());
        sql.push_str(&predicates.join(" AND "));
        sql.push_str(footer.unwrap_or_default());
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// `INSERT INTO t (<columns>) VALUES (<variables>)<footer>`
    pub fn build_insert_statement(
        &mut self,
        sql: &mut String,
        table_name: &str,
        footer: Option<&str>,
    ) -> Result<()> {
        require_table_name(table_name)?;

        let header = format!("INSERT INTO {} (", table_name);
        self.build_insert_clause(sql, Some(&header), None, Some(")"));
        self.build_values_clause(sql, Some(" VALUES ("), Some(")"));
        sql.push_str(footer.unwrap_or_default());
        Ok(())
    }

    /// `DELETE FROM t WHERE <keys><footer>`
    pub fn build_delete_statement(
        &mut self,
        sql: &mut String,
        table_name: &str,
        footer: Option<&str>,
    ) -> Result<()> {
        require_table_name(table_name)?;

        sql.push_str("DELETE FROM ");
        sql.push_str(table_name);
        self.build_where_clause(sql, Some(" WHERE "), footer);
        Ok(())
    }

    /// `SELECT <columns> FROM t WHERE <keys><footer>`, or nothing if no column is readable
    pub fn build_select_by_key_statement(
        &mut self,
        sql: &mut String,
        table_name: &str,
        footer: Option<&str>,
    ) -> Result<()> {
        require_table_name(table_name)?;

        if !self.has_read_fields() {
            return Ok(());
        }

        let from = format!(" FROM {}", table_name);
        self.build_select_clause(sql, Some("SELECT "), None, Some(&from));
        self.build_where_clause(sql, Some(" WHERE "), footer);
        Ok(())
    }

    /// `UPDATE t SET <assignments> WHERE <keys><footer>`
    pub fn build_update_by_key_statement(
        &mut self,
        sql: &mut String,
        table_name: &str,
        footer: Option<&str>,
    ) -> Result<()> {
        require_table_name(table_name)?;

        let header = format!("UPDATE {} SET ", table_name);
        self.build_set_clause(sql, Some(&header), None, None);
        self.build_where_clause(sql, Some(" WHERE "), None);
        sql.push_str(footer.unwrap_or_default());
        Ok(())
    }
}
