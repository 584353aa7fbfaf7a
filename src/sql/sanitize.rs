//! SQL Identifier Sanitization Utilities
//!
//! Provides functions to quote SQL identifiers, derive identifier-safe names,
//! and validate names coming from metadata definitions.

use regex::Regex;
use std::sync::OnceLock;

/// Longest identifier accepted by [`validate_identifier`]
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

fn non_identifier_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}_]").expect("static pattern"))
}

fn control_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\x00-\x1F\x7F]").expect("static pattern"))
}

/// Quote a SQL identifier with double quotes (ANSI / PostgreSQL)
///
/// # Example
/// ```
/// use runtara_sql_builder::sql::quote_identifier;
///
/// let quoted = quote_identifier("my_table");
/// assert_eq!(quoted, "\"my_table\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    // Escape any double quotes in the identifier by doubling them
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Quote a SQL identifier with square brackets (SQL Server)
///
/// # Example
/// ```
/// use runtara_sql_builder::sql::quote_bracketed;
///
/// assert_eq!(quote_bracketed("First Name"), "[First Name]");
/// ```
pub fn quote_bracketed(identifier: &str) -> String {
    let escaped = identifier.replace(']', "]]");
    format!("[{}]", escaped)
}

/// Quote every dot-separated part of a possibly schema-qualified name
///
/// Parts that are already wrapped in `[]` or `""` are passed through, and dots
/// inside them do not split the name.
///
/// # Example
/// ```
/// use runtara_sql_builder::sql::{quote_bracketed, quote_qualified};
///
/// assert_eq!(quote_qualified("[dbo].[My.Table]", quote_bracketed), "[dbo].[My.Table]");
/// ```
pub fn quote_qualified(name: &str, quote: impl Fn(&str) -> String) -> String {
    split_qualified(name)
        .into_iter()
        .map(|part| {
            let already_quoted = (part.len() >= 2 && part.starts_with('[') && part.ends_with(']'))
                || (part.len() >= 2 && part.starts_with('"') && part.ends_with('"'));
            if already_quoted {
                part.to_string()
            } else {
                quote(part)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Split on dots that are not inside `[...]` or `"..."`
///
/// Doubled closing characters (`]]`, `""`) are escapes and stay inside the part.
fn split_qualified(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut closing: Option<char> = None;
    let mut chars = name.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match closing {
            Some(close) if c == close => {
                if chars.peek().map(|&(_, next)| next) == Some(close) {
                    chars.next();
                } else {
                    closing = None;
                }
            }
            Some(_) => {}
            None => match c {
                '[' if i == start => closing = Some(']'),
                '"' if i == start => closing = Some('"'),
                '.' => {
                    parts.push(&name[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&name[start..]);
    parts
}

/// Derive an identifier-safe name from a database name
///
/// Characters other than letters, digits and `_` are removed and a leading
/// digit is prefixed with `_`. Letters and digits outside ASCII are kept, so
/// the result is empty only for names made entirely of punctuation.
///
/// # Example
/// ```
/// use runtara_sql_builder::sql::to_clr_name;
///
/// assert_eq!(to_clr_name("First Name"), "FirstName");
/// assert_eq!(to_clr_name("2ndLine"), "_2ndLine");
/// assert_eq!(to_clr_name("名前"), "名前");
/// ```
pub fn to_clr_name(name: &str) -> String {
    let cleaned = non_identifier_chars().replace_all(name, "");
    match cleaned.chars().next() {
        Some(c) if c.is_numeric() => format!("_{}", cleaned),
        _ => cleaned.into_owned(),
    }
}

/// Validate a table, procedure, column or parameter name from metadata
///
/// Rules:
/// - Cannot be empty or whitespace only
/// - Cannot contain control characters
/// - Cannot exceed [`MAX_IDENTIFIER_LENGTH`] characters
///
/// # Example
/// ```
/// use runtara_sql_builder::sql::validate_identifier;
///
/// assert!(validate_identifier("dbo.Employee").is_ok());
/// assert!(validate_identifier("").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if control_chars().is_match(name) {
        return Err(format!(
            "Identifier '{}' is invalid. Control characters are not allowed.",
            name.escape_debug()
        ));
    }

    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(format!(
            "Identifier '{}' exceeds {} characters.",
            name, MAX_IDENTIFIER_LENGTH
        ));
    }

    Ok(())
}

/// Case-insensitive name comparison used by all column matching
pub fn names_match(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
