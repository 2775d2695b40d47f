use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

use crate::environment::EnvironmentResolver;
use crate::handler::TaskHandler;
use crate::raw::params_object_mut;

/// Rewrites the cross-project references of DEPENDENT nodes.
///
/// Items live at `params.dependence.dependTaskList[].dependItemList[]`. Export
/// replaces `projectId`/`definitionId` with `projectName`/`definitionName`.
/// Import resolves the names back to ids. Unresolved items are left as they
/// are.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependentHandler;

fn depend_items(node: &mut Value) -> Vec<&mut Map<String, Value>> {
  let Some(params) = params_object_mut(node) else {
    return Vec::new();
  };
  let Some(tasks) = params
    .get_mut("dependence")
    .and_then(|d| d.get_mut("dependTaskList"))
    .and_then(Value::as_array_mut)
  else {
    return Vec::new();
  };

  tasks
    .iter_mut()
    .filter_map(|t| t.get_mut("dependItemList").and_then(Value::as_array_mut))
    .flat_map(|items| items.iter_mut())
    .filter_map(Value::as_object_mut)
    .collect()
}

#[async_trait]
impl TaskHandler for DependentHandler {
  async fn correct_for_export(&self, node: &mut Value, env: &dyn EnvironmentResolver) {
    for item in depend_items(node) {
      let Some(definition_id) = item.get("definitionId").and_then(Value::as_i64) else {
        continue;
      };
      let Some(definition) = env.definition_by_id(definition_id).await else {
        warn!(definition_id, "dependency target not found during export");
        continue;
      };

      item.remove("projectId");
      item.remove("definitionId");
      item.insert("projectName".into(), Value::String(definition.project_name));
      item.insert(
        "definitionName".into(),
        Value::String(definition.definition_name),
      );
    }
  }

  async fn correct_for_import(&self, node: &mut Value, env: &dyn EnvironmentResolver) {
    for item in depend_items(node) {
      let (Some(project), Some(definition)) = (
        item.get("projectName").and_then(Value::as_str),
        item.get("definitionName").and_then(Value::as_str),
      ) else {
        continue;
      };

      match env.definition_by_name(project, definition).await {
        Some(found) => {
          item.insert("projectId".into(), Value::from(found.project_id));
          item.insert("definitionId".into(), Value::from(found.definition_id));
        }
        None => warn!(
          project = %project,
          definition = %definition,
          "dependency target not found during import"
        ),
      }
    }
  }
}
