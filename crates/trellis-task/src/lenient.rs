//! Field deserializers for `params` values written by older editors.
//!
//! Numbers may arrive as strings and lists may arrive as `null`. Fields that
//! no check reads must never reject a node, so they decode leniently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` decodes as the type's default.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A number or a numeric string. Anything else reads as absent.
pub(crate) fn optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  })
}
