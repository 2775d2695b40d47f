use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;
use crate::task_type::TaskType;

/// One vertex of a template's task graph.
///
/// `name` is the vertex key and must be unique within a template. `params`
/// is opaque to the graph layer and interpreted per [`TaskType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
  pub name: String,
  #[serde(rename = "type")]
  pub task_type: String,
  #[serde(default, deserialize_with = "lenient::object")]
  pub params: Value,
  /// Names (not ids) of the nodes that must precede this one.
  #[serde(default, deserialize_with = "lenient::pre_tasks")]
  pub pre_tasks: Vec<String>,
  #[serde(default, skip_serializing_if = "Value::is_null")]
  pub extras: Value,
}

impl TaskNode {
  /// The parsed task type tag.
  pub fn kind(&self) -> TaskType {
    TaskType::parse(&self.task_type)
  }
}
