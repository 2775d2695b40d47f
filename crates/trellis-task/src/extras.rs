use serde_json::Value;

use crate::error::ParameterError;

/// Check the free-form `extras` field of a node.
///
/// Absent (null) or an object is accepted. Its content is not interpreted.
pub fn check_extras(extras: &Value) -> Result<(), ParameterError> {
  match extras {
    Value::Null | Value::Object(_) => Ok(()),
    _ => Err(ParameterError::InvalidExtras),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_null_and_object_pass() {
    assert!(check_extras(&Value::Null).is_ok());
    assert!(check_extras(&json!({ "owner": "ops" })).is_ok());
  }

  #[test]
  fn test_scalar_fails() {
    assert_eq!(check_extras(&json!(3)), Err(ParameterError::InvalidExtras));
    assert_eq!(
      check_extras(&json!(["a"])),
      Err(ParameterError::InvalidExtras)
    );
  }
}
