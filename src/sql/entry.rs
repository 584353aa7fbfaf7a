//! Per-column binding state

use serde_json::Value;
use std::sync::Arc;

use crate::column::ColumnMetadata;
use crate::sql::sanitize::names_match;

/// The value bound to a column for the current statement
///
/// `Unset` means the column was never mentioned; `Null` means it was
/// explicitly set to SQL NULL.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BoundValue {
    #[default]
    Unset,
    Null,
    Value(Value),
}

impl BoundValue {
    /// Whether a value (including NULL) has been supplied
    pub fn is_present(&self) -> bool {
        !matches!(self, BoundValue::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BoundValue::Null)
    }

    /// The supplied value, with NULL rendered as `Value::Null`
    pub fn to_json(&self) -> Option<Value> {
        match self {
            BoundValue::Unset => None,
            BoundValue::Null => Some(Value::Null),
            BoundValue::Value(v) => Some(v.clone()),
        }
    }
}

impl From<Value> for BoundValue {
    fn from(value: Value) -> Self {
        if value.is_null() {
            BoundValue::Null
        } else {
            BoundValue::Value(value)
        }
    }
}

impl From<&Value> for BoundValue {
    fn from(value: &Value) -> Self {
        if value.is_null() {
            BoundValue::Null
        } else {
            BoundValue::Value(value.clone())
        }
    }
}

/// One column's mutable state inside a [`SqlBuilder`](crate::SqlBuilder)
#[derive(Debug, Clone)]
pub struct SqlBuilderEntry<D> {
    /// Shared, immutable column description
    pub details: Arc<ColumnMetadata<D>>,
    /// Column participates in the WHERE clause
    pub is_key: bool,
    pub use_for_insert: bool,
    pub use_for_update: bool,
    pub use_for_read: bool,
    /// Column's value is emitted as a parameter
    pub use_parameter: bool,
    /// Entry is a stored procedure parameter rather than a column
    pub is_formal_parameter: bool,
    pub value: BoundValue,
}

impl<D: Copy> SqlBuilderEntry<D> {
    /// Entry for a table or view column, with flags derived from the column
    pub fn for_column(details: Arc<ColumnMetadata<D>>) -> Self {
        let writable = !details.is_computed() && !details.is_identity();
        Self {
            is_key: details.is_primary_key(),
            use_for_insert: writable,
            use_for_update: writable,
            use_for_read: false,
            use_parameter: false,
            is_formal_parameter: false,
            value: BoundValue::Unset,
            details,
        }
    }

    /// Entry for a formal procedure parameter
    pub fn for_parameter(details: Arc<ColumnMetadata<D>>) -> Self {
        Self {
            is_key: false,
            use_for_insert: false,
            use_for_update: false,
            use_for_read: false,
            use_parameter: false,
            is_formal_parameter: true,
            value: BoundValue::Unset,
            details,
        }
    }

    /// Store a value; formal parameters are also marked for parameter output
    pub(crate) fn bind(&mut self, value: BoundValue) {
        self.value = value;
        if self.is_formal_parameter {
            self.use_parameter = true;
        }
    }

    /// Matches against the identifier-safe, SQL, and variable names
    pub(crate) fn matches_argument_key(&self, key: &str) -> bool {
        names_match(self.details.clr_name(), key)
            || names_match(self.details.sql_name(), key)
            || names_match(self.details.sql_variable_name(), key)
    }

    /// Matches a mapped property against the identifier-safe name only
    pub(crate) fn matches_property(&self, column_name: &str) -> bool {
        names_match(self.details.clr_name(), column_name)
    }

    /// Matches a desired column against the identifier-safe or SQL name
    pub(crate) fn matches_column(&self, column: &str) -> bool {
        names_match(self.details.clr_name(), column) || names_match(self.details.sql_name(), column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlServerDialect;
    use serde_json::json;

    fn column(name: &str, computed: bool, pk: bool, identity: bool) -> Arc<ColumnMetadata<crate::SqlDbType>> {
        Arc::new(ColumnMetadata::new(&SqlServerDialect, name, "int", computed, pk, identity))
    }

    // =========================================================================
    // BoundValue Tests
    // =========================================================================

    #[test]
    fn test_bound_value_from_null_is_null_sentinel() {
        let value = BoundValue::from(json!(null));
        assert_eq!(value, BoundValue::Null);
        assert!(value.is_present());
        assert!(value.is_null());
    }

    #[test]
    fn test_bound_value_default_is_unset() {
        let value = BoundValue::default();
        assert!(!value.is_present());
        assert_eq!(value.to_json(), None);
    }

    #[test]
    fn test_bound_value_to_json() {
        assert_eq!(BoundValue::Null.to_json(), Some(Value::Null));
        assert_eq!(BoundValue::from(&json!("x")).to_json(), Some(json!("x")));
    }

    // =========================================================================
    // Entry Default Tests
    // =========================================================================

    #[test]
    fn test_column_entry_defaults() {
        let entry = SqlBuilderEntry::for_column(column("Name", false, false, false));
        assert!(!entry.is_key);
        assert!(entry.use_for_insert);
        assert!(entry.use_for_update);
        assert!(!entry.use_for_read);
        assert!(!entry.use_parameter);
        assert!(!entry.is_formal_parameter);
    }

    #[test]
    fn test_identity_and_computed_are_not_writable() {
        let identity = SqlBuilderEntry::for_column(column("Id", false, true, true));
        assert!(identity.is_key);
        assert!(!identity.use_for_insert);
        assert!(!identity.use_for_update);

        let computed = SqlBuilderEntry::for_column(column("Total", true, false, false));
        assert!(!computed.use_for_insert);
        assert!(!computed.use_for_update);
    }

    #[test]
    fn test_parameter_bind_sets_use_parameter() {
        let mut entry = SqlBuilderEntry::for_parameter(column("@Age", false, false, false));
        assert!(entry.is_formal_parameter);
        entry.bind(BoundValue::from(json!(42)));
        assert!(entry.use_parameter);

        let mut col = SqlBuilderEntry::for_column(column("Age", false, false, false));
        col.bind(BoundValue::from(json!(42)));
        assert!(!col.use_parameter);
    }

    #[test]
    fn test_name_matching_rules() {
        let entry = SqlBuilderEntry::for_column(column("First Name", false, false, false));
        assert!(entry.matches_argument_key("firstname"));
        assert!(entry.matches_argument_key("FIRST NAME"));
        assert!(entry.matches_argument_key("@FirstName"));
        assert!(entry.matches_property("FIRSTNAME"));
        assert!(!entry.matches_property("First Name"));
        assert!(entry.matches_column("first name"));
        assert!(!entry.matches_column("@FirstName"));
    }
}
