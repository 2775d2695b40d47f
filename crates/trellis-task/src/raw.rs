use serde_json::{Map, Value};

/// The `type` tag of a raw task node, if it has one.
pub fn task_type_of(node: &Value) -> Option<&str> {
  node.get("type").and_then(Value::as_str)
}

/// Mutable access to a raw node's `params` object.
///
/// A params value stored as a JSON-encoded string is decoded in place so the
/// caller always sees an object. Returns `None` when the node has no params
/// or they are not an object.
pub fn params_object_mut(node: &mut Value) -> Option<&mut Map<String, Value>> {
  let params = node.get_mut("params")?;
  if let Value::String(encoded) = params
    && let Ok(decoded @ Value::Object(_)) = serde_json::from_str::<Value>(encoded)
  {
    *params = decoded;
  }
  params.as_object_mut()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_decodes_string_params() {
    let mut node = json!({ "type": "SQL", "params": "{\"datasource\":4}" });
    let params = params_object_mut(&mut node).unwrap();
    assert_eq!(params["datasource"], 4);
    assert_eq!(node["params"]["datasource"], 4);
  }

  #[test]
  fn test_missing_params() {
    let mut node = json!({ "type": "SQL" });
    assert!(params_object_mut(&mut node).is_none());
    assert_eq!(task_type_of(&node), Some("SQL"));
  }
}
