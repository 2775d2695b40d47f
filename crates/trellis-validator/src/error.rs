use thiserror::Error;
use trellis_task::ParameterError;

/// Reasons a payload or bundle is rejected before anything is persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
  /// The payload is not valid template JSON.
  #[error("malformed template payload: {0}")]
  MalformedPayload(#[source] serde_json::Error),

  /// The payload has no tasks.
  #[error("template has no tasks")]
  EmptyTaskList,

  /// The precedence edges between task nodes contain a cycle.
  #[error("process node has cycle")]
  ProcessNodeHasCycle,

  /// A task node's parameters failed their type's check.
  #[error("process node {node} parameter invalid")]
  ProcessNodeParameterInvalid {
    node: String,
    #[source]
    source: ParameterError,
  },

  /// A required field of an import bundle entry is missing or empty.
  #[error("{field} is empty")]
  MissingField { field: &'static str },

  /// The import bundle contains no entries.
  #[error("import bundle is empty")]
  EmptyBundle,

  /// A sub-process reference leads back to a template already being imported.
  #[error("sub-process reference cycle through template {template_id}")]
  SubProcessCycle { template_id: i64 },

  /// A stored resource reference list could not be read.
  #[error("invalid resource reference list: {0}")]
  InvalidResourceIds(String),
}
