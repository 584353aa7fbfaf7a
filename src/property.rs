//! Bindable values and property descriptors
//!
//! Values handed to a [`SqlBuilder`](crate::SqlBuilder) come in two shapes:
//!
//! - **Maps** (JSON objects, `HashMap`, `BTreeMap`) expose their entries through
//!   [`ArgumentMap`] and are matched by key.
//! - **Described objects** list their properties through
//!   [`Bindable::describe_properties`] and are matched by mapped column name.
//!
//! ```
//! use runtara_sql_builder::{Bindable, PropertyDescriptor};
//! use serde_json::json;
//!
//! struct Employee {
//!     employee_key: i64,
//!     first_name: String,
//!     title: Option<String>,
//! }
//!
//! impl Bindable for Employee {
//!     fn describe_properties() -> Vec<PropertyDescriptor<Self>> {
//!         vec![
//!             PropertyDescriptor::new("EmployeeKey", |e: &Employee| json!(e.employee_key)).key(),
//!             PropertyDescriptor::new("FirstName", |e: &Employee| json!(e.first_name)),
//!             PropertyDescriptor::new("Title", |e: &Employee| json!(e.title)).ignore_on_insert(),
//!         ]
//!     }
//! }
//! ```

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Reads a property value from an instance. `Value::Null` binds SQL NULL.
pub type PropertyGetter<T> = fn(&T) -> Value;

/// Describes one property of a bindable type
pub struct PropertyDescriptor<T> {
    /// Property name, used in error messages
    pub name: String,
    /// Column the property maps to; unmapped properties are skipped
    pub mapped_column_name: Option<String>,
    /// Whether the property is part of the object's own key
    pub is_key: bool,
    /// Exclude the column from INSERT statements
    pub ignore_on_insert: bool,
    /// Exclude the column from UPDATE statements
    pub ignore_on_update: bool,
    getter: PropertyGetter<T>,
}

impl<T> PropertyDescriptor<T> {
    /// Create a property that maps to a column of the same name
    pub fn new(name: impl Into<String>, getter: PropertyGetter<T>) -> Self {
        let name = name.into();
        Self {
            mapped_column_name: Some(name.clone()),
            name,
            is_key: false,
            ignore_on_insert: false,
            ignore_on_update: false,
            getter,
        }
    }

    /// Map the property to a differently named column
    pub fn column(mut self, column_name: impl Into<String>) -> Self {
        self.mapped_column_name = Some(column_name.into());
        self
    }

    /// Mark the property as not mapped to any column
    pub fn not_mapped(mut self) -> Self {
        self.mapped_column_name = None;
        self
    }

    /// Mark the property as a key
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// Exclude the property from inserts
    pub fn ignore_on_insert(mut self) -> Self {
        self.ignore_on_insert = true;
        self
    }

    /// Exclude the property from updates
    pub fn ignore_on_update(mut self) -> Self {
        self.ignore_on_update = true;
        self
    }

    /// Read the property from an instance
    pub fn get(&self, instance: &T) -> Value {
        (self.getter)(instance)
    }
}

impl<T> Clone for PropertyDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            mapped_column_name: self.mapped_column_name.clone(),
            is_key: self.is_key,
            ignore_on_insert: self.ignore_on_insert,
            ignore_on_update: self.ignore_on_update,
            getter: self.getter,
        }
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("mapped_column_name", &self.mapped_column_name)
            .field("is_key", &self.is_key)
            .field("ignore_on_insert", &self.ignore_on_insert)
            .field("ignore_on_update", &self.ignore_on_update)
            .finish_non_exhaustive()
    }
}

/// String-keyed lookup over argument values
pub trait ArgumentMap {
    /// All key/value pairs. Iteration order carries no meaning.
    fn argument_entries(&self) -> Vec<(&str, &Value)>;

    /// Whether the map itself is absent (a JSON `null`)
    fn is_null_argument(&self) -> bool {
        false
    }
}

impl ArgumentMap for Map<String, Value> {
    fn argument_entries(&self) -> Vec<(&str, &Value)> {
        self.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

impl<S: BuildHasher> ArgumentMap for HashMap<String, Value, S> {
    fn argument_entries(&self) -> Vec<(&str, &Value)> {
        self.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

impl ArgumentMap for BTreeMap<String, Value> {
    fn argument_entries(&self) -> Vec<(&str, &Value)> {
        self.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

impl ArgumentMap for Value {
    fn argument_entries(&self) -> Vec<(&str, &Value)> {
        self.as_object()
            .map(|obj| obj.argument_entries())
            .unwrap_or_default()
    }

    fn is_null_argument(&self) -> bool {
        self.is_null()
    }
}

/// A value that can be bound to a statement builder
///
/// Map-like implementors return `Some` from [`as_argument_map`](Bindable::as_argument_map)
/// and are matched by key. Everything else is matched through
/// [`describe_properties`](Bindable::describe_properties).
pub trait Bindable {
    /// The map view of this value, if it is map-like
    fn as_argument_map(&self) -> Option<&dyn ArgumentMap> {
        None
    }

    /// Whether the value is absent
    fn is_null_argument(&self) -> bool {
        false
    }

    /// Ordered property descriptors for this type
    fn describe_properties() -> Vec<PropertyDescriptor<Self>>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

impl Bindable for Value {
    fn as_argument_map(&self) -> Option<&dyn ArgumentMap> {
        self.is_object().then_some(self as &dyn ArgumentMap)
    }

    fn is_null_argument(&self) -> bool {
        self.is_null()
    }
}

impl Bindable for Map<String, Value> {
    fn as_argument_map(&self) -> Option<&dyn ArgumentMap> {
        Some(self)
    }
}

impl<S: BuildHasher> Bindable for HashMap<String, Value, S> {
    fn as_argument_map(&self) -> Option<&dyn ArgumentMap> {
        Some(self)
    }
}

impl Bindable for BTreeMap<String, Value> {
    fn as_argument_map(&self) -> Option<&dyn ArgumentMap> {
        Some(self)
    }
}

/// Short type name used in error messages
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Widget {
        id: i64,
        label: Option<String>,
    }

    impl Bindable for Widget {
        fn describe_properties() -> Vec<PropertyDescriptor<Self>> {
            vec![
                PropertyDescriptor::new("Id", |w: &Widget| json!(w.id)).key(),
                PropertyDescriptor::new("Label", |w: &Widget| json!(w.label))
                    .column("widget_label")
                    .ignore_on_update(),
                PropertyDescriptor::new("Cache", |_: &Widget| Value::Null).not_mapped(),
            ]
        }
    }

    // =========================================================================
    // PropertyDescriptor Tests
    // =========================================================================

    #[test]
    fn test_descriptor_defaults_to_same_column_name() {
        let props = Widget::describe_properties();
        assert_eq!(props[0].mapped_column_name.as_deref(), Some("Id"));
        assert!(props[0].is_key);
        assert!(!props[0].ignore_on_insert);
    }

    #[test]
    fn test_descriptor_builder_flags() {
        let props = Widget::describe_properties();
        assert_eq!(props[1].mapped_column_name.as_deref(), Some("widget_label"));
        assert!(props[1].ignore_on_update);
        assert!(props[2].mapped_column_name.is_none());
    }

    #[test]
    fn test_descriptor_getter() {
        let widget = Widget {
            id: 7,
            label: None,
        };
        let props = Widget::describe_properties();
        assert_eq!(props[0].get(&widget), json!(7));
        assert_eq!(props[1].get(&widget), Value::Null);
    }

    #[test]
    fn test_descriptor_debug_omits_getter() {
        let props = Widget::describe_properties();
        let debug_str = format!("{:?}", props[0]);
        assert!(debug_str.contains("PropertyDescriptor"));
        assert!(debug_str.contains("\"Id\""));
    }

    // =========================================================================
    // ArgumentMap / Bindable Tests
    // =========================================================================

    #[test]
    fn test_json_object_is_map_like() {
        let value = json!({"a": 1});
        let map = value.as_argument_map().expect("object is map-like");
        assert_eq!(map.argument_entries(), vec![("a", &json!(1))]);
    }

    #[test]
    fn test_json_scalar_is_not_map_like() {
        assert!(json!(5).as_argument_map().is_none());
        assert!(Value::Null.as_argument_map().is_none());
        assert!(Bindable::is_null_argument(&Value::Null));
    }

    #[test]
    fn test_hash_map_is_map_like() {
        let mut map: HashMap<String, Value> = HashMap::new();
        map.insert("name".to_string(), json!("x"));
        assert_eq!(map.as_argument_map().map(|m| m.argument_entries().len()), Some(1));
    }

    #[test]
    fn test_described_object_is_not_map_like() {
        let widget = Widget {
            id: 1,
            label: None,
        };
        assert!(widget.as_argument_map().is_none());
        assert!(!widget.is_null_argument());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Widget>(), "Widget");
        assert_eq!(short_type_name::<HashMap<String, Value>>(), "HashMap");
    }
}
