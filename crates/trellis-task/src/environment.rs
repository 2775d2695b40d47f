use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Lookups into the surrounding environment used by export and import rewrites.
///
/// Export turns environment-local ids into portable names. Import turns the
/// names back into ids of the target environment. `None` means the
/// environment does not know the entity.
#[async_trait]
pub trait EnvironmentResolver: Send + Sync {
  /// Name of the datasource with the given id.
  async fn datasource_name(&self, datasource_id: i64) -> Option<String>;

  /// Id of the datasource with the given type and name.
  async fn datasource_id(&self, db_type: &str, name: &str) -> Option<i64>;

  /// Owning project and name of a workflow definition, by id.
  async fn definition_by_id(&self, definition_id: i64) -> Option<DefinitionRef>;

  /// A workflow definition addressed by project and definition name.
  async fn definition_by_name(
    &self,
    project_name: &str,
    definition_name: &str,
  ) -> Option<DefinitionRef>;
}

/// A datasource known to the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceInfo {
  pub id: i64,
  pub name: String,
  #[serde(rename = "type")]
  pub db_type: String,
}

/// A workflow definition a dependency node can point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRef {
  pub project_id: i64,
  pub project_name: String,
  pub definition_id: i64,
  pub definition_name: String,
}

/// An in-memory environment, typically loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticEnvironment {
  #[serde(default)]
  pub datasources: Vec<DatasourceInfo>,
  #[serde(default)]
  pub definitions: Vec<DefinitionRef>,
}

impl StaticEnvironment {
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  pub fn with_datasource(mut self, id: i64, name: &str, db_type: &str) -> Self {
    self.datasources.push(DatasourceInfo {
      id,
      name: name.to_string(),
      db_type: db_type.to_string(),
    });
    self
  }

  pub fn with_definition(mut self, definition: DefinitionRef) -> Self {
    self.definitions.push(definition);
    self
  }
}

#[async_trait]
impl EnvironmentResolver for StaticEnvironment {
  async fn datasource_name(&self, datasource_id: i64) -> Option<String> {
    self
      .datasources
      .iter()
      .find(|d| d.id == datasource_id)
      .map(|d| d.name.clone())
  }

  async fn datasource_id(&self, db_type: &str, name: &str) -> Option<i64> {
    self
      .datasources
      .iter()
      .find(|d| d.name == name && d.db_type.eq_ignore_ascii_case(db_type))
      .map(|d| d.id)
  }

  async fn definition_by_id(&self, definition_id: i64) -> Option<DefinitionRef> {
    self
      .definitions
      .iter()
      .find(|d| d.definition_id == definition_id)
      .cloned()
  }

  async fn definition_by_name(
    &self,
    project_name: &str,
    definition_name: &str,
  ) -> Option<DefinitionRef> {
    self
      .definitions
      .iter()
      .find(|d| d.project_name == project_name && d.definition_name == definition_name)
      .cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_load_and_lookup() {
    let env = StaticEnvironment::from_json(
      r#"{
        "datasources": [{ "id": 4, "name": "warehouse", "type": "MYSQL" }],
        "definitions": [{ "projectId": 1, "projectName": "etl", "definitionId": 12, "definitionName": "daily" }]
      }"#,
    )
    .unwrap();

    assert_eq!(env.datasource_name(4).await.as_deref(), Some("warehouse"));
    assert_eq!(env.datasource_id("mysql", "warehouse").await, Some(4));
    assert_eq!(env.datasource_id("POSTGRESQL", "warehouse").await, None);
    assert_eq!(
      env.definition_by_name("etl", "daily").await.map(|d| d.definition_id),
      Some(12)
    );
    assert!(env.definition_by_id(99).await.is_none());
  }
}
