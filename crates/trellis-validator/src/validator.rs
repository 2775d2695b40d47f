use std::sync::Arc;

use tracing::{error, warn};
use trellis_config::TemplateData;
use trellis_task::{TaskRegistry, check_extras};
use trellis_workflow::graph_has_cycle;

use crate::error::ValidationError;
use crate::resources::{collect_resource_ids, join_resource_ids};

/// A payload that passed validation, with its derived resource references.
#[derive(Debug, Clone)]
pub struct ValidatedTemplate {
  pub data: TemplateData,
  /// Comma-joined resource ids, empty when there are none.
  pub resource_ids: String,
}

/// Validates template payloads against the task handlers of a registry.
#[derive(Clone)]
pub struct TemplateValidator {
  registry: Arc<TaskRegistry>,
}

impl TemplateValidator {
  pub fn new(registry: Arc<TaskRegistry>) -> Self {
    Self { registry }
  }

  pub fn registry(&self) -> &TaskRegistry {
    &self.registry
  }

  /// Parse and validate a payload string.
  pub fn validate_payload(&self, payload: &str) -> Result<ValidatedTemplate, ValidationError> {
    let data: TemplateData = serde_json::from_str(payload).map_err(|e| {
      error!(error = %e, "template payload is not valid json");
      ValidationError::MalformedPayload(e)
    })?;

    self.check_task_nodes(&data)?;

    let resource_ids = join_resource_ids(&collect_resource_ids(data.tasks()));
    Ok(ValidatedTemplate { data, resource_ids })
  }

  /// Run the graph and parameter checks on parsed template data.
  pub fn check_task_nodes(&self, data: &TemplateData) -> Result<(), ValidationError> {
    let tasks = match data.tasks.as_deref() {
      Some(tasks) if !tasks.is_empty() => tasks,
      _ => {
        error!("template task list is empty");
        return Err(ValidationError::EmptyTaskList);
      }
    };

    if graph_has_cycle(tasks) {
      error!("template task graph has a cycle");
      return Err(ValidationError::ProcessNodeHasCycle);
    }

    for node in tasks {
      if let Err(source) = self.registry.resolve(&node.task_type).validate(node) {
        error!(node = %node.name, task_type = %node.task_type, error = %source, "task node parameters invalid");
        return Err(ValidationError::ProcessNodeParameterInvalid {
          node: node.name.clone(),
          source,
        });
      }
    }

    for node in tasks {
      if let Err(e) = check_extras(&node.extras) {
        warn!(node = %node.name, error = %e, "task node extras invalid");
      }
    }

    Ok(())
  }
}

impl Default for TemplateValidator {
  fn default() -> Self {
    Self::new(Arc::new(TaskRegistry::standard()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{Value, json};

  fn validate(payload: Value) -> Result<ValidatedTemplate, ValidationError> {
    TemplateValidator::default().validate_payload(&payload.to_string())
  }

  fn shell(name: &str, pre: &[&str]) -> Value {
    json!({ "name": name, "type": "SHELL", "params": { "rawScript": "echo" }, "preTasks": pre })
  }

  #[test]
  fn test_valid_chain() {
    let validated = validate(json!({
      "tasks": [
        shell("a", &[]),
        {
          "name": "b",
          "type": "SHELL",
          "params": { "rawScript": "echo", "resourceList": [{ "id": 5 }, { "id": 2 }] },
          "preTasks": ["a"]
        }
      ],
      "globalParams": [],
      "tenantId": 1
    }))
    .unwrap();

    assert_eq!(validated.data.tasks().len(), 2);
    assert_eq!(validated.resource_ids, "2,5");
  }

  #[test]
  fn test_malformed_json() {
    let result = TemplateValidator::default().validate_payload("{not json");
    assert!(matches!(result, Err(ValidationError::MalformedPayload(_))));
  }

  #[test]
  fn test_missing_or_empty_tasks() {
    assert!(matches!(
      validate(json!({ "globalParams": [] })),
      Err(ValidationError::EmptyTaskList)
    ));
    assert!(matches!(
      validate(json!({ "tasks": [] })),
      Err(ValidationError::EmptyTaskList)
    ));
  }

  #[test]
  fn test_cycle_rejected() {
    let result = validate(json!({
      "tasks": [shell("a", &["c"]), shell("b", &["a"]), shell("c", &["b"])]
    }));
    assert!(matches!(result, Err(ValidationError::ProcessNodeHasCycle)));
  }

  #[test]
  fn test_undeclared_predecessor_is_cycle() {
    let result = validate(json!({ "tasks": [shell("a", &["ghost"])] }));
    assert!(matches!(result, Err(ValidationError::ProcessNodeHasCycle)));
  }

  #[test]
  fn test_cycle_checked_before_parameters() {
    let result = validate(json!({
      "tasks": [
        { "name": "a", "type": "SHELL", "params": {}, "preTasks": ["a"] }
      ]
    }));
    assert!(matches!(result, Err(ValidationError::ProcessNodeHasCycle)));
  }

  #[test]
  fn test_invalid_parameters_name_node() {
    let result = validate(json!({
      "tasks": [
        shell("a", &[]),
        { "name": "query", "type": "SQL", "params": { "type": "MYSQL", "sql": "select 1" } }
      ]
    }));
    match result {
      Err(ValidationError::ProcessNodeParameterInvalid { node, .. }) => assert_eq!(node, "query"),
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[test]
  fn test_unknown_type_passes() {
    let validated = validate(json!({
      "tasks": [{ "name": "x", "type": "SEATUNNEL", "params": { "anything": true } }]
    }))
    .unwrap();
    assert!(validated.resource_ids.is_empty());
  }

  #[test]
  fn test_bad_extras_only_logged() {
    let mut node = shell("a", &[]);
    node["extras"] = json!("not an object");
    assert!(validate(json!({ "tasks": [node] })).is_ok());
  }

  #[test]
  fn test_string_sql_type_accepted() {
    let validated = validate(json!({
      "tasks": [{
        "name": "q",
        "type": "SQL",
        "params": { "type": "MYSQL", "datasource": 3, "sql": "select 1", "sqlType": "0" }
      }]
    }));
    assert!(validated.is_ok());
  }

  #[test]
  fn test_null_param_values_accepted() {
    let validated = validate(json!({
      "tasks": [{
        "name": "a",
        "type": "SHELL",
        "params": {
          "rawScript": "echo ${day}",
          "localParams": [{ "prop": "day", "direct": "IN", "type": "VARCHAR", "value": null }],
          "resourceList": null
        }
      }],
      "globalParams": [{ "prop": "env", "value": null }, { "prop": "retries", "value": 3 }]
    }))
    .unwrap();

    let params = validated.data.global_params;
    assert_eq!(params[0].value, "");
    assert_eq!(params[1].value, "3");
  }
}
