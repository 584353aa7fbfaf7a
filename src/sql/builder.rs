//! Statement builder state and value matching
//!
//! A [`SqlBuilder`] pairs every column of a table, view or procedure with the
//! per-statement state needed to render it. Templates are built once from
//! cached metadata and cloned per request; the clone is then mutated by the
//! matching operations in this module and consumed by the clause builders in
//! [`clause`](crate::sql::clause).
//!
//! Every matching operation follows the same policy:
//! - In strict mode an input key or property that matches no column fails the
//!   call immediately with [`SqlBuilderError::StrictMismatch`].
//! - Otherwise unmatched inputs are ignored.
//! - If nothing matched at all the call fails with [`SqlBuilderError::NoMatch`].
//!
//! Entries updated before a failure keep their new state.

use serde_json::Value;
use std::sync::Arc;

use crate::column::ColumnMetadata;
use crate::error::{Result, SqlBuilderError};
use crate::property::{ArgumentMap, Bindable, PropertyDescriptor, short_type_name};
use crate::sql::entry::{BoundValue, SqlBuilderEntry};

/// Which columns a SELECT should return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredColumns {
    /// Leave read flags untouched
    None,
    /// Primary key columns, falling back to identity columns
    Auto,
    /// Every column
    All,
    /// Columns named by SQL name or identifier-safe name
    Columns(Vec<String>),
}

impl DesiredColumns {
    /// Build an explicit column list
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DesiredColumns::Columns(columns.into_iter().map(Into::into).collect())
    }
}

/// Per-statement column state for one table, view or procedure
#[derive(Debug, Clone)]
pub struct SqlBuilder<D> {
    name: String,
    entries: Vec<SqlBuilderEntry<D>>,
}

impl<D: Copy> SqlBuilder<D> {
    /// Create a builder for a table or view
    pub fn new(name: impl Into<String>, columns: &[Arc<ColumnMetadata<D>>]) -> Self {
        Self {
            name: name.into(),
            entries: columns
                .iter()
                .map(|c| SqlBuilderEntry::for_column(Arc::clone(c)))
                .collect(),
        }
    }

    /// Create a builder for a stored procedure's formal parameters
    pub fn for_procedure(name: impl Into<String>, parameters: &[Arc<ColumnMetadata<D>>]) -> Self {
        Self {
            name: name.into(),
            entries: parameters
                .iter()
                .map(|p| SqlBuilderEntry::for_parameter(Arc::clone(p)))
                .collect(),
        }
    }

    /// Name of the table, view or procedure
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in column order
    pub fn entries(&self) -> &[SqlBuilderEntry<D>] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [SqlBuilderEntry<D>] {
        &mut self.entries
    }

    /// Whether any column is marked for reading
    pub fn has_read_fields(&self) -> bool {
        self.entries.iter().any(|e| e.use_for_read)
    }

    /// Find an entry by SQL name or identifier-safe name
    pub fn entry(&self, column: &str) -> Option<&SqlBuilderEntry<D>> {
        self.entries.iter().find(|e| e.matches_column(column))
    }

    // =========================================================================
    // Argument binding
    // =========================================================================

    /// Bind values from a map, overriding previously bound values
    ///
    /// Keys match a column's identifier-safe name, SQL name or variable name,
    /// ignoring case.
    pub fn bind_from_map<M>(&mut self, map: &M, strict: bool) -> Result<()>
    where
        M: ArgumentMap + ?Sized,
    {
        self.match_map(map, strict, |entry, value| entry.bind(BoundValue::from(value)))
    }

    /// Bind values from a map-like value or a described object
    ///
    /// Map-like values are handled by [`bind_from_map`](Self::bind_from_map).
    /// For described objects each mapped property is matched against column
    /// identifier-safe names. When `use_object_defined_keys` is set, the
    /// object's key properties replace the table's primary key.
    pub fn bind_from_object<T: Bindable>(
        &mut self,
        value: &T,
        use_object_defined_keys: bool,
        strict: bool,
    ) -> Result<()> {
        if value.is_null_argument() {
            return Err(SqlBuilderError::invalid_argument("value is null"));
        }
        if let Some(map) = value.as_argument_map() {
            return self.bind_from_map(map, strict);
        }

        if use_object_defined_keys {
            for entry in &mut self.entries {
                entry.is_key = false;
            }
        }

        self.match_properties(value, strict, |entry, property, bound| {
            if use_object_defined_keys && property.is_key {
                entry.is_key = true;
            }
            entry.bind(bound);
            if property.ignore_on_insert {
                entry.use_for_insert = false;
            }
            if property.ignore_on_update {
                entry.use_for_update = false;
            }
        })
    }

    /// Rebind values without changing key, insert or update flags
    ///
    /// Used to apply generated or round-tripped values to an already
    /// configured builder.
    pub fn apply_value_overrides<T: Bindable>(&mut self, value: &T, strict: bool) -> Result<()> {
        if value.is_null_argument() {
            return Err(SqlBuilderError::invalid_argument("value is null"));
        }
        if let Some(map) = value.as_argument_map() {
            return self.bind_from_map(map, strict);
        }

        self.match_properties(value, strict, |entry, _, bound| entry.bind(bound))
    }

    // =========================================================================
    // Read columns
    // =========================================================================

    /// Mark columns for reading. Repeated calls are additive.
    pub fn select_read_columns(&mut self, desired: &DesiredColumns, strict: bool) -> Result<()> {
        match desired {
            DesiredColumns::None => Ok(()),
            DesiredColumns::All => {
                for entry in &mut self.entries {
                    entry.use_for_read = true;
                }
                Ok(())
            }
            DesiredColumns::Auto => self.select_key_columns(),
            DesiredColumns::Columns(columns) => {
                let mut found = false;
                for column in columns {
                    let matched = self.entries.iter_mut().find(|e| e.matches_column(column));
                    match matched {
                        Some(entry) => {
                            entry.use_for_read = true;
                            found = true;
                        }
                        None if strict => {
                            tracing::debug!(object = %self.name, column = %column, "desired column not found");
                            return Err(SqlBuilderError::strict_mismatch(column.as_str(), self.name.as_str()));
                        }
                        None => {}
                    }
                }

                if !found {
                    return Err(SqlBuilderError::no_match(format!(
                        "None of the desired columns were found on {}.",
                        self.name
                    )));
                }
                Ok(())
            }
        }
    }

    /// Primary keys, else identity columns. Only one tier is ever applied.
    fn select_key_columns(&mut self) -> Result<()> {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| e.is_key) {
            entry.use_for_read = true;
            found = true;
        }
        if found {
            return Ok(());
        }

        for entry in self.entries.iter_mut().filter(|e| e.details.is_identity()) {
            entry.use_for_read = true;
            found = true;
        }
        if found {
            return Ok(());
        }

        Err(SqlBuilderError::no_primary_key(self.name.as_str()))
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Bind a filter value and return the matching WHERE predicates
    ///
    /// Each matched column yields `<column> IS NULL` for a null value, or
    /// `<column> = <variable>` otherwise. Predicates are joined with `AND`.
    pub fn filter_clause<T: Bindable>(&mut self, value: &T, strict: bool) -> Result<String> {
        if value.is_null_argument() {
            return Err(SqlBuilderError::invalid_argument("filter value is null"));
        }

        let mut parts = Vec::new();
        let mut add_predicate = |entry: &mut SqlBuilderEntry<D>, bound: BoundValue| {
            if bound.is_null() {
                parts.push(format!("{} IS NULL", entry.details.quoted_sql_name()));
                entry.value = bound;
            } else {
                parts.push(format!(
                    "{} = {}",
                    entry.details.quoted_sql_name(),
                    entry.details.sql_variable_name()
                ));
                entry.value = bound;
                entry.use_parameter = true;
            }
        };

        match value.as_argument_map() {
            Some(map) => self.match_map(map, strict, |entry, v| {
                add_predicate(entry, BoundValue::from(v))
            })?,
            None => self.match_properties(value, strict, |entry, _, bound| {
                add_predicate(entry, bound)
            })?,
        }

        Ok(parts.join(" AND "))
    }

    // =========================================================================
    // Matching loops
    // =========================================================================

    fn match_map<M>(
        &mut self,
        map: &M,
        strict: bool,
        mut on_match: impl FnMut(&mut SqlBuilderEntry<D>, &Value),
    ) -> Result<()>
    where
        M: ArgumentMap + ?Sized,
    {
        let items = map.argument_entries();
        if map.is_null_argument() || items.is_empty() {
            return Err(SqlBuilderError::invalid_argument("value is null or empty"));
        }

        let mut found = false;
        for (key, value) in items {
            match self.entries.iter_mut().find(|e| e.matches_argument_key(key)) {
                Some(entry) => {
                    on_match(entry, value);
                    found = true;
                }
                None if strict => {
                    tracing::debug!(object = %self.name, key = %key, "argument key not matched");
                    return Err(SqlBuilderError::strict_mismatch(key, self.name.as_str()));
                }
                None => {}
            }
        }

        if !found {
            tracing::debug!(object = %self.name, "no argument keys matched");
            return Err(SqlBuilderError::no_match(format!(
                "None of the keys could be matched to columns in {}.",
                self.name
            )));
        }
        Ok(())
    }

    fn match_properties<T: Bindable>(
        &mut self,
        value: &T,
        strict: bool,
        mut on_match: impl FnMut(&mut SqlBuilderEntry<D>, &PropertyDescriptor<T>, BoundValue),
    ) -> Result<()> {
        let mut found = false;
        for property in T::describe_properties() {
            let Some(column_name) = property.mapped_column_name.as_deref() else {
                continue;
            };

            match self.entries.iter_mut().find(|e| e.matches_property(column_name)) {
                Some(entry) => {
                    on_match(entry, &property, BoundValue::from(property.get(value)));
                    found = true;
                }
                None if strict => {
                    tracing::debug!(object = %self.name, property = %property.name, "property not matched");
                    return Err(SqlBuilderError::strict_mismatch(
                        property.name.as_str(),
                        self.name.as_str(),
                    ));
                }
                None => {}
            }
        }

        if !found {
            tracing::debug!(object = %self.name, "no properties matched");
            return Err(SqlBuilderError::no_match(format!(
                "None of the properties on {} could be matched to columns in {}.",
                short_type_name::<T>(),
                self.name
            )));
        }
        Ok(())
    }
}
