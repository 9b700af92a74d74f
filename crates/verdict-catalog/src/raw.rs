//! Lenient decoding helpers for catalog JSON.
//!
//! The catalog is not under our control: identifiers arrive as numbers or
//! strings, and list fields occasionally hold junk entries. Everything is
//! normalised here so the rest of the crate sees one shape.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// A catalog identifier as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
  Number(u64),
  Text(String),
}

impl RawId {
  pub(crate) fn as_string(&self) -> String {
    match self {
      Self::Number(n) => n.to_string(),
      Self::Text(s) => s.trim().to_string(),
    }
  }

  pub(crate) fn matches(&self, id: &str) -> bool { self.as_string() == id }
}

/// Deserialise a list, silently dropping entries that do not decode as `T`.
/// A non-list value yields an empty list.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Array(items)) => items
      .into_iter()
      .filter_map(|item| serde_json::from_value(item).ok())
      .collect(),
    _ => Vec::new(),
  })
}

/// Optional string that tolerates `null`, numbers and booleans.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(value.and_then(|v| value_to_string(&v)))
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}
