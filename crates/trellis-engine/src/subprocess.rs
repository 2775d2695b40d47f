use std::collections::HashMap;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{info, warn};
use trellis_config::{SUB_PROCESS_ID_KEY, TASKS_KEY, TaskType};
use trellis_store::{NewTemplate, Project, Store, Template};
use trellis_task::{params_object_mut, task_type_of};
use trellis_validator::ValidationError;

use crate::error::ServiceError;
use crate::user::User;

/// Source template id to the id of its copy in the target project.
pub type RemapTable = HashMap<i64, i64>;

/// Replace every `processTemplateId` value found in `remap`, at any depth.
///
/// Each value is looked up once, so a new id that happens to equal another
/// old id is not rewritten a second time.
pub fn apply_remap(value: &mut Value, remap: &RemapTable) {
  match value {
    Value::Object(map) => {
      for (key, child) in map.iter_mut() {
        if key == SUB_PROCESS_ID_KEY
          && let Some(new_id) = child.as_i64().and_then(|old| remap.get(&old))
        {
          *child = Value::from(*new_id);
        } else {
          apply_remap(child, remap);
        }
      }
    }
    Value::Array(items) => items.iter_mut().for_each(|item| apply_remap(item, remap)),
    _ => {}
  }
}

fn is_sub_process(node: &Value) -> bool {
  task_type_of(node).is_some_and(|t| TaskType::parse(t).is_sub_process())
}

/// Copies the sub-process templates a payload references into a project.
pub(crate) struct Materializer<'a, S> {
  store: &'a S,
  project: &'a Project,
  user: &'a User,
}

impl<'a, S: Store> Materializer<'a, S> {
  pub(crate) fn new(store: &'a S, project: &'a Project, user: &'a User) -> Self {
    Self {
      store,
      project,
      user,
    }
  }

  /// Materialize every sub-process referenced by a payload and point the
  /// references at the copies. Returns whether the payload changed.
  ///
  /// `chain` holds the source ids currently being materialized above this
  /// payload. A reference back into it fails the import.
  pub(crate) fn materialize<'b>(
    &'b self,
    payload: &'b mut Value,
    chain: &'b mut Vec<i64>,
  ) -> BoxFuture<'b, Result<bool, ServiceError>>
  where
    'a: 'b,
  {
    async move {
      let Some(tasks) = payload.get_mut(TASKS_KEY).and_then(Value::as_array_mut) else {
        return Ok(false);
      };
      if !tasks.iter().any(is_sub_process) {
        return Ok(false);
      }

      let remap = self.materialize_level(tasks, chain).await?;
      if remap.is_empty() {
        return Ok(false);
      }

      apply_remap(payload, &remap);
      Ok(true)
    }
    .boxed()
  }

  async fn materialize_level(
    &self,
    tasks: &mut [Value],
    chain: &mut Vec<i64>,
  ) -> Result<RemapTable, ServiceError> {
    let mut remap = RemapTable::new();

    for node in tasks.iter_mut().filter(|n| is_sub_process(n)) {
      let Some(source_id) = params_object_mut(node)
        .and_then(|params| params.get(SUB_PROCESS_ID_KEY))
        .and_then(Value::as_i64)
      else {
        continue;
      };

      if remap.contains_key(&source_id) {
        continue;
      }
      if chain.contains(&source_id) {
        return Err(ValidationError::SubProcessCycle {
          template_id: source_id,
        }
        .into());
      }

      let Some(source) = self.store.get_template(source_id).await? else {
        warn!(template_id = source_id, "sub-process template not found, reference left as is");
        continue;
      };

      if self
        .store
        .get_template_by_name(self.project.id, &source.name)
        .await?
        .is_some()
      {
        warn!(
          template = %source.name,
          project = %self.project.name,
          "sub-process template already in project, skipping"
        );
        continue;
      }

      let new_id = self.copy_template(&source, chain).await?;
      remap.insert(source_id, new_id);
    }

    Ok(remap)
  }

  async fn copy_template(&self, source: &Template, chain: &mut Vec<i64>) -> Result<i64, ServiceError> {
    let mut payload: Value =
      serde_json::from_str(&source.payload).map_err(ValidationError::MalformedPayload)?;

    chain.push(source.id);
    let changed = self.materialize(&mut payload, chain).await;
    chain.pop();

    let payload = if changed? {
      payload.to_string()
    } else {
      source.payload.clone()
    };

    let id = self
      .store
      .insert_template(&NewTemplate {
        project_id: self.project.id,
        name: source.name.clone(),
        version: source.version,
        release_state: source.release_state,
        flag: source.flag,
        description: source.description.clone(),
        user_id: self.user.id,
        user_name: self.user.name.clone(),
        modified_by: Some(source.user_name.clone()),
        payload,
        global_params: source.global_params.0.clone(),
        locations: source.locations.clone(),
        connects: source.connects.clone(),
        resource_ids: source.resource_ids.clone(),
        tenant_id: source.tenant_id,
        biz_type_id: source.biz_type_id,
        biz_form_url: source.biz_form_url.clone(),
      })
      .await?;

    info!(
      project = %self.project.name,
      template = %source.name,
      source_id = source.id,
      template_id = id,
      "created sub-process template"
    );
    Ok(id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_remap_is_structural() {
    let mut payload = json!({
      "tasks": [
        { "name": "a", "type": "SUB_PROCESS", "params": { "processTemplateId": 1 } },
        { "name": "b", "type": "SUB_PROCESS", "params": { "processTemplateId": 12 } },
        { "name": "c", "type": "SHELL", "params": { "rawScript": "echo \"processTemplateId\":1" } }
      ]
    });
    apply_remap(&mut payload, &RemapTable::from([(1, 40)]));

    assert_eq!(payload["tasks"][0]["params"]["processTemplateId"], 40);
    assert_eq!(payload["tasks"][1]["params"]["processTemplateId"], 12);
    assert_eq!(
      payload["tasks"][2]["params"]["rawScript"],
      "echo \"processTemplateId\":1"
    );
  }

  #[test]
  fn test_remap_applies_once() {
    let mut payload = json!({
      "tasks": [
        { "params": { "processTemplateId": 5 } },
        { "params": { "processTemplateId": 7 } }
      ]
    });
    apply_remap(&mut payload, &RemapTable::from([(5, 7), (7, 9)]));

    assert_eq!(payload["tasks"][0]["params"]["processTemplateId"], 7);
    assert_eq!(payload["tasks"][1]["params"]["processTemplateId"], 9);
  }

  #[test]
  fn test_is_sub_process() {
    assert!(is_sub_process(&json!({ "type": "SUB_PROCESS" })));
    assert!(!is_sub_process(&json!({ "type": "SHELL" })));
    assert!(!is_sub_process(&json!({ "name": "x" })));
  }
}
