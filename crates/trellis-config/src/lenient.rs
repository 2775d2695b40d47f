//! Deserializers for fields that older payloads store as embedded JSON strings.
//!
//! Stored templates may carry `preTasks` as `"[\"a\",\"b\"]"` and `params` as
//! `"{\"rawScript\":\"...\"}"`. Both shapes are accepted and normalized.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn pre_tasks<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Null => Ok(Vec::new()),
    Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
    Value::String(s) => serde_json::from_str(&s).map_err(D::Error::custom),
    other => serde_json::from_value(other).map_err(D::Error::custom),
  }
}

pub(crate) fn object<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
    Value::String(s) => serde_json::from_str(&s).map_err(D::Error::custom),
    other => Ok(other),
  }
}

/// Scalar parameter values. `null` reads as empty and numbers or booleans
/// keep their JSON text.
pub(crate) fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Null => String::new(),
    Value::String(s) => s,
    other => other.to_string(),
  })
}
