use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::Deref;
use thiserror::Error;

/// A field lookup on an untyped response failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("missing field `{0}`")]
    Missing(String),
    #[error("field `{field}` is not {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
}

/// Typed lookups into a JSON object.
pub trait FieldAccess {
    fn field(&self, key: &str) -> Result<&Value, FieldError>;

    fn object_field(&self, key: &str) -> Result<&Map<String, Value>, FieldError> {
        self.field(key)?.as_object().ok_or_else(|| FieldError::WrongType {
            field: key.to_string(),
            expected: "an object",
        })
    }

    fn str_field(&self, key: &str) -> Result<&str, FieldError> {
        self.field(key)?.as_str().ok_or_else(|| FieldError::WrongType {
            field: key.to_string(),
            expected: "a string",
        })
    }
}

impl FieldAccess for Map<String, Value> {
    fn field(&self, key: &str) -> Result<&Value, FieldError> {
        self.get(key).ok_or_else(|| FieldError::Missing(key.to_string()))
    }
}

/// A decoded backend response. The schema is not modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse(Map<String, Value>);

impl ApiResponse {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Pretty JSON, for human-readable tool output.
    pub fn summary(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| format!("{:?}", self.0))
    }
}

impl Deref for ApiResponse {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Keep the string entries of an object and drop the rest.
pub fn string_entries(object: &Map<String, Value>) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for (key, value) in object {
        match value.as_str() {
            Some(text) => {
                entries.insert(key.clone(), text.to_string());
            }
            None => log::warn!("Skipping non-string form field `{}`", key),
        }
    }
    entries
}
