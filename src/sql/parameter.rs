//! Parameter extraction

use crate::sql::builder::SqlBuilder;
use crate::sql::entry::BoundValue;

/// A driver parameter that can receive a name and a value
pub trait DbParameter {
    fn set_name(&mut self, name: &str);

    /// `BoundValue::Null` is passed through for the driver to send as SQL NULL
    fn set_value(&mut self, value: BoundValue);
}

/// Driver-neutral parameter carrying the column's database type tag
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParameter<D> {
    pub name: String,
    pub db_type: Option<D>,
    pub value: BoundValue,
}

impl<D> SqlParameter<D> {
    /// Create an unnamed parameter for the given type tag
    pub fn new(db_type: Option<D>) -> Self {
        Self {
            name: String::new(),
            db_type,
            value: BoundValue::Unset,
        }
    }
}

impl<D> DbParameter for SqlParameter<D> {
    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn set_value(&mut self, value: BoundValue) {
        self.value = value;
    }
}

/// Replace each `@name` variable with `$n`, its 1-based position in `parameters`
///
/// Text inside single or double quotes is left alone, as are variables that
/// are not in the list.
pub fn number_placeholders(sql: &str, parameters: &[&str]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut closing: Option<char> = None;
    let mut chars = sql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(close) = closing {
            if c == close {
                closing = None;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' | '\'' => {
                closing = Some(c);
                out.push(c);
            }
            '@' => {
                let mut end = i + c.len_utf8();
                while let Some(&(j, next)) = chars.peek() {
                    if !(next.is_alphanumeric() || next == '_') {
                        break;
                    }
                    end = j + next.len_utf8();
                    chars.next();
                }
                let variable = &sql[i..end];
                match parameters.iter().position(|p| *p == variable) {
                    Some(index) => out.push_str(&format!("${}", index + 1)),
                    None => out.push_str(variable),
                }
            }
            _ => out.push(c),
        }
    }
    out
}

impl<D: Copy> SqlBuilder<D> {
    /// Parameters for every column marked for parameter output that has a value
    ///
    /// `make_parameter` receives the column's type tag; the returned parameter
    /// is then given the column's variable name and bound value. Parameters are
    /// returned in column order.
    pub fn parameters<P, F>(&self, mut make_parameter: F) -> Vec<P>
    where
        P: DbParameter,
        F: FnMut(Option<D>) -> P,
    {
        self.entries()
            .iter()
            .filter(|e| e.use_parameter && e.value.is_present())
            .map(|e| {
                let mut parameter = make_parameter(e.details.db_type());
                parameter.set_name(e.details.sql_variable_name());
                parameter.set_value(e.value.clone());
                parameter
            })
            .collect()
    }

    /// [`parameters`](Self::parameters) using [`SqlParameter`]
    pub fn sql_parameters(&self) -> Vec<SqlParameter<D>> {
        self.parameters(SqlParameter::new)
    }
}
