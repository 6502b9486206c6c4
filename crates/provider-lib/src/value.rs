//! Dynamically typed attribute values
//!
//! Configuration, plans and state are all trees of [`Value`]. Unlike plain
//! JSON a value can be [`Value::Unknown`], which marks an attribute whose
//! final value is only known after the remote call has run.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder printed in plans for values that are not known yet.
pub const UNKNOWN_PLACEHOLDER: &str = "(known after apply)";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Unknown,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    /// Both `map(string)` attributes and nested objects.
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Null or unknown; the value cannot be inspected.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Null | Value::Unknown)
    }

    /// True when the value or anything nested in it is unknown.
    pub fn contains_unknown(&self) -> bool {
        match self {
            Value::Unknown => true,
            Value::List(items) => items.iter().any(Value::contains_unknown),
            Value::Object(fields) => fields.values().any(Value::contains_unknown),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Field of an object value; anything else yields null.
    pub fn get(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        match self {
            Value::Object(fields) => fields.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Sets a field, turning a null value into an empty object first.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        if self.is_null() {
            *self = Value::Object(BTreeMap::new());
        }
        if let Value::Object(fields) = self {
            fields.insert(key.into(), value);
        }
    }

    /// Converts to JSON. Unknown values become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Unknown => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(fields) => serde_json::Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// JSON for display: unknown values are rendered as a placeholder string.
    pub fn to_display_json(&self) -> serde_json::Value {
        match self {
            Value::Unknown => serde_json::Value::String(UNKNOWN_PLACEHOLDER.to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_display_json).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_display_json()))
                    .collect(),
            ),
            other => other.to_json(),
        }
    }

    /// Decodes into a typed model. Unknown values decode as null.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }

    /// Encodes a typed model.
    pub fn encode<T: Serialize>(model: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(model).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Unknown => write!(f, "{UNKNOWN_PLACEHOLDER}"),
            Value::String(s) => write!(f, "{s:?}"),
            other => write!(f, "{}", other.to_display_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        id: Option<String>,
        name: Option<String>,
        tags: Option<BTreeMap<String, String>>,
    }

    #[test]
    fn test_unknown_decodes_as_none() {
        let value = Value::object([
            ("id", Value::Unknown),
            ("name", Value::string("prod")),
            ("tags", Value::Null),
        ]);

        let sample: Sample = value.decode().unwrap();

        assert_eq!(sample.id, None);
        assert_eq!(sample.name.as_deref(), Some("prod"));
        assert!(sample.tags.is_none());
    }

    #[test]
    fn test_encode_emits_every_field() {
        let sample = Sample {
            id: Some("c-1".to_string()),
            name: None,
            tags: None,
        };

        let value = Value::encode(&sample).unwrap();

        assert_eq!(value.get("id"), &Value::string("c-1"));
        assert!(value.as_object().unwrap().contains_key("name"));
        assert!(value.get("name").is_null());
    }

    #[test]
    fn test_display_json_marks_unknown() {
        let value = Value::object([("token", Value::Unknown)]);
        assert_eq!(
            value.to_display_json(),
            json!({ "token": UNKNOWN_PLACEHOLDER })
        );
        assert_eq!(value.to_json(), json!({ "token": null }));
        assert!(value.contains_unknown());
    }

    #[test]
    fn test_set_on_null_creates_object() {
        let mut value = Value::Null;
        value.set("id", Value::string("abc"));
        assert_eq!(value.get("id").as_str(), Some("abc"));
        assert!(value.get("missing").is_null());
    }
}
