/// GridView Row Model
///
/// The view itself is generic over the row type and never looks inside a
/// row. This module provides a ready-made row type (`Record`, a map from
/// column name to `CellValue`) and the `FieldAccess` trait that the default
/// comparator, the column text search and the column-value helpers use to
/// read a field as text.

use crate::error::{Result, ViewError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int64(v) => Some(*v as f64),
            CellValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text as shown in a grid cell. `None` for null.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.pad(""),
            CellValue::Bool(v) => fmt::Display::fmt(v, f),
            CellValue::Int64(v) => fmt::Display::fmt(v, f),
            CellValue::Float64(v) => fmt::Display::fmt(v, f),
            CellValue::String(v) => f.pad(v),
        }
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int64(i),
                None => n.as_f64().map(CellValue::Float64).unwrap_or(CellValue::Null),
            },
            Value::String(s) => CellValue::String(s.clone()),
            // Nested structures are shown as their JSON text
            other => CellValue::String(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int64(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float64(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// A schema-less row keyed by column name.
pub type Record = HashMap<String, CellValue>;

/// Build a `Record` from a JSON object.
///
/// ```
/// use gridview::{record_from_json, CellValue};
///
/// let value = serde_json::json!({ "name": "Alice", "age": 30, "email": null });
/// let record = record_from_json(&value).unwrap();
/// assert_eq!(record["name"], CellValue::String("Alice".to_string()));
/// assert_eq!(record["age"].as_i64(), Some(30));
/// assert!(record["email"].is_null());
/// ```
pub fn record_from_json(value: &Value) -> Result<Record> {
    let object = value.as_object().ok_or_else(|| {
        let kind = match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        ViewError::InvalidRecord(kind.to_string())
    })?;

    Ok(object
        .iter()
        .map(|(k, v)| (k.clone(), CellValue::from(v)))
        .collect())
}

/// Build a `Record` from `(column, value)` pairs.
pub fn record<K, V, I>(cells: I) -> Record
where
    K: Into<String>,
    V: Into<CellValue>,
    I: IntoIterator<Item = (K, V)>,
{
    cells.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Read access to a row's fields as text.
///
/// `None` means the field is missing (or null); the default comparator
/// orders such values before every defined one.
pub trait FieldAccess {
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl FieldAccess for Record {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).and_then(CellValue::text)
    }
}

impl FieldAccess for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|s| Cow::Borrowed(s.as_str()))
    }
}

impl FieldAccess for serde_json::Map<String, Value> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for Rc<T> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for Box<T> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_value_accessors() {
        assert_eq!(CellValue::Int64(7).as_i64(), Some(7));
        assert_eq!(CellValue::Int64(7).as_f64(), Some(7.0));
        assert_eq!(CellValue::Float64(1.5).as_i64(), None);
        assert_eq!(CellValue::from("x").as_str(), Some("x"));
        assert_eq!(CellValue::Bool(true).as_bool(), Some(true));
        assert!(CellValue::from(None::<i64>).is_null());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(CellValue::Null.text(), None);
        assert_eq!(CellValue::Int64(42).text().as_deref(), Some("42"));
        assert_eq!(CellValue::Float64(10.1).text().as_deref(), Some("10.1"));
        assert_eq!(CellValue::Bool(false).text().as_deref(), Some("false"));
        assert_eq!(CellValue::from("row 2").text().as_deref(), Some("row 2"));
    }

    #[test]
    fn test_record_from_json_rejects_non_objects() {
        let err = record_from_json(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, ViewError::InvalidRecord("array".to_string()));
    }

    #[test]
    fn test_record_from_json_nested_values() {
        let r = record_from_json(&json!({ "tags": ["a", "b"], "ratio": 0.25 })).unwrap();
        assert_eq!(r["tags"].as_str(), Some(r#"["a","b"]"#));
        assert_eq!(r["ratio"].as_f64(), Some(0.25));
    }

    #[test]
    fn test_cell_value_serde_untagged() {
        let r = record([("a", CellValue::Int64(1)), ("b", CellValue::Null)]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json, json!({ "a": 1, "b": null }));

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_field_access_impls() {
        let r = record([("name", CellValue::from("Bob")), ("age", CellValue::Null)]);
        assert_eq!(r.field("name").as_deref(), Some("Bob"));
        assert_eq!(r.field("age"), None);
        assert_eq!(r.field("missing"), None);

        let mut strings = HashMap::new();
        strings.insert("k".to_string(), "v".to_string());
        assert_eq!(strings.field("k").as_deref(), Some("v"));

        let obj = json!({ "n": 3, "s": "t", "z": null });
        let map = obj.as_object().unwrap().clone();
        assert_eq!(map.field("n").as_deref(), Some("3"));
        assert_eq!(map.field("s").as_deref(), Some("t"));
        assert_eq!(map.field("z"), None);

        let shared = Rc::new(r);
        assert_eq!(shared.field("name").as_deref(), Some("Bob"));
    }
}
