use serde::{Deserialize, Serialize};

/// Direction of a user-defined parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direct {
  In,
  Out,
}

/// Declared value type of a user-defined parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
  Varchar,
  Integer,
  Long,
  Float,
  Double,
  Date,
  Time,
  Timestamp,
  Boolean,
}

/// A global (template-wide) name/value parameter.
///
/// Two properties are duplicates only when every field is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
  pub prop: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub direct: Option<Direct>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub data_type: Option<DataType>,
  #[serde(default, deserialize_with = "crate::lenient::scalar")]
  pub value: String,
}

impl Property {
  pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      prop: prop.into(),
      direct: None,
      data_type: None,
      value: value.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_value_decodes_leniently() {
    let props: Vec<Property> = serde_json::from_value(json!([
      { "prop": "a", "value": null },
      { "prop": "b", "value": 10 },
      { "prop": "c", "value": true },
      { "prop": "d" }
    ]))
    .unwrap();

    let values: Vec<&str> = props.iter().map(|p| p.value.as_str()).collect();
    assert_eq!(values, ["", "10", "true", ""]);
  }
}
