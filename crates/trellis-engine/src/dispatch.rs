use serde_json::Value;
use trellis_config::TASKS_KEY;
use trellis_task::{EnvironmentResolver, TaskRegistry, task_type_of};
use trellis_validator::ValidationError;

/// Which way a payload is crossing the environment boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Export,
  Import,
}

/// Run every task node of a payload through its handler's rewrite.
///
/// Nodes without a `type` are skipped. Everything outside the `tasks` array
/// is left as it was. A payload without a task array comes back unchanged.
pub async fn correct_payload(
  payload: &str,
  direction: Direction,
  registry: &TaskRegistry,
  env: &dyn EnvironmentResolver,
) -> Result<Value, ValidationError> {
  let mut value: Value = serde_json::from_str(payload).map_err(ValidationError::MalformedPayload)?;

  let Some(tasks) = value.get_mut(TASKS_KEY).and_then(Value::as_array_mut) else {
    return Ok(value);
  };

  for node in tasks.iter_mut() {
    let Some(tag) = task_type_of(node)
      .filter(|t| !t.trim().is_empty())
      .map(str::to_string)
    else {
      continue;
    };

    let handler = registry.resolve(&tag);
    match direction {
      Direction::Export => handler.correct_for_export(node, env).await,
      Direction::Import => handler.correct_for_import(node, env).await,
    }
  }

  Ok(value)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use trellis_task::StaticEnvironment;

  fn env() -> StaticEnvironment {
    StaticEnvironment::default().with_datasource(4, "warehouse", "MYSQL")
  }

  #[tokio::test]
  async fn test_export_rewrites_only_registered_types() {
    let payload = json!({
      "tasks": [
        { "name": "q", "type": "SQL", "params": { "type": "MYSQL", "datasource": 4, "sql": "select 1" }, "runFlag": "NORMAL" },
        { "name": "s", "type": "SHELL", "params": { "rawScript": "echo", "datasource": 4 } },
        { "name": "untyped", "params": { "datasource": 4 } }
      ],
      "globalParams": [],
      "timeout": 30
    });

    let value = correct_payload(
      &payload.to_string(),
      Direction::Export,
      &TaskRegistry::standard(),
      &env(),
    )
    .await
    .unwrap();

    assert_eq!(value["tasks"][0]["params"]["datasourceName"], "warehouse");
    assert_eq!(value["tasks"][0]["runFlag"], "NORMAL");
    assert_eq!(value["tasks"][1], payload["tasks"][1]);
    assert_eq!(value["tasks"][2], payload["tasks"][2]);
    assert_eq!(value["timeout"], 30);
  }

  #[tokio::test]
  async fn test_import_after_export_restores_id() {
    let payload = json!({
      "tasks": [{ "name": "q", "type": "SQL", "params": { "type": "MYSQL", "datasource": 4, "sql": "select 1" } }]
    });
    let registry = TaskRegistry::standard();

    let exported = correct_payload(&payload.to_string(), Direction::Export, &registry, &env())
      .await
      .unwrap();
    let imported = correct_payload(&exported.to_string(), Direction::Import, &registry, &env())
      .await
      .unwrap();

    assert_eq!(imported["tasks"][0]["params"]["datasource"], 4);
  }

  #[tokio::test]
  async fn test_malformed_payload() {
    let result = correct_payload(
      "[not json",
      Direction::Export,
      &TaskRegistry::standard(),
      &env(),
    )
    .await;
    assert!(matches!(result, Err(ValidationError::MalformedPayload(_))));
  }
}
