use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::environment::EnvironmentResolver;
use crate::handler::TaskHandler;
use crate::raw::params_object_mut;

const DATASOURCE: &str = "datasource";
const DATASOURCE_NAME: &str = "datasourceName";

/// Rewrites the datasource reference of SQL and PROCEDURE nodes.
///
/// On export the numeric `datasource` id is replaced by `datasourceName`.
/// On import the name (together with the `type` field) is resolved back to
/// an id of the target environment. A name that does not resolve leaves the
/// id absent, which the parameter check then rejects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasourceHandler;

#[async_trait]
impl TaskHandler for DatasourceHandler {
  async fn correct_for_export(&self, node: &mut Value, env: &dyn EnvironmentResolver) {
    let Some(params) = params_object_mut(node) else {
      return;
    };
    let Some(id) = params.get(DATASOURCE).and_then(Value::as_i64) else {
      return;
    };

    match env.datasource_name(id).await {
      Some(name) => {
        params.insert(DATASOURCE_NAME.to_string(), Value::String(name));
      }
      None => warn!(datasource_id = id, "datasource not found during export"),
    }
    params.remove(DATASOURCE);
  }

  async fn correct_for_import(&self, node: &mut Value, env: &dyn EnvironmentResolver) {
    let Some(params) = params_object_mut(node) else {
      return;
    };
    let Some(name) = params
      .get(DATASOURCE_NAME)
      .and_then(Value::as_str)
      .map(str::to_string)
    else {
      return;
    };
    let db_type = params
      .get("type")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string();

    match env.datasource_id(&db_type, &name).await {
      Some(id) => {
        params.insert(DATASOURCE.to_string(), Value::from(id));
      }
      None => warn!(datasource = %name, db_type = %db_type, "datasource not found during import"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::environment::StaticEnvironment;
  use serde_json::json;

  fn env() -> StaticEnvironment {
    StaticEnvironment::default().with_datasource(4, "warehouse", "MYSQL")
  }

  #[tokio::test]
  async fn test_export_swaps_id_for_name() {
    let mut node = json!({
      "name": "q",
      "type": "SQL",
      "params": { "type": "MYSQL", "datasource": 4, "sql": "select 1" }
    });
    DatasourceHandler.correct_for_export(&mut node, &env()).await;

    assert_eq!(node["params"]["datasourceName"], "warehouse");
    assert!(node["params"].get("datasource").is_none());
    assert_eq!(node["params"]["sql"], "select 1");
  }

  #[tokio::test]
  async fn test_export_unknown_id_is_still_removed() {
    let mut node = json!({ "type": "SQL", "params": { "datasource": 77 } });
    DatasourceHandler.correct_for_export(&mut node, &env()).await;
    assert!(node["params"].get("datasource").is_none());
    assert!(node["params"].get("datasourceName").is_none());
  }

  #[tokio::test]
  async fn test_import_resolves_name() {
    let mut node = json!({
      "type": "PROCEDURE",
      "params": "{\"type\":\"MYSQL\",\"datasourceName\":\"warehouse\",\"method\":\"call p()\"}"
    });
    DatasourceHandler.correct_for_import(&mut node, &env()).await;
    assert_eq!(node["params"]["datasource"], 4);
  }

  #[tokio::test]
  async fn test_import_unresolved_leaves_id_absent() {
    let mut node = json!({
      "type": "SQL",
      "params": { "type": "MYSQL", "datasourceName": "elsewhere" }
    });
    DatasourceHandler.correct_for_import(&mut node, &env()).await;
    assert!(node["params"].get("datasource").is_none());
  }
}
