use serde::{Deserialize, Serialize};

use crate::node::TaskNode;
use crate::property::Property;

/// Key of the task array inside a template payload.
pub const TASKS_KEY: &str = "tasks";

/// Key inside a sub-process node's `params` that carries the referenced template id.
pub const SUB_PROCESS_ID_KEY: &str = "processTemplateId";

/// The parsed form of a template payload.
///
/// `tasks` is optional so that a payload with no task list can be told
/// apart from one with an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
  #[serde(default)]
  pub tasks: Option<Vec<TaskNode>>,
  #[serde(default)]
  pub global_params: Vec<Property>,
  #[serde(default)]
  pub tenant_id: i64,
}

impl TemplateData {
  /// The task list, empty when absent.
  pub fn tasks(&self) -> &[TaskNode] {
    self.tasks.as_deref().unwrap_or(&[])
  }
}
