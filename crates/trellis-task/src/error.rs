use thiserror::Error;

/// Errors raised while interpreting a node's parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
  /// The params value could not be read as the type's parameter shape.
  #[error("malformed {task_type} parameters: {message}")]
  Malformed { task_type: String, message: String },

  /// The params parsed but a required field is missing or empty.
  #[error("{task_type} parameters failed their check")]
  Invalid { task_type: String },

  /// The extras field is present but not an object.
  #[error("extras must be an object")]
  InvalidExtras,
}
