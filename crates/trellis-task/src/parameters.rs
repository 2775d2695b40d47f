use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trellis_config::{Property, TaskType};

use crate::error::ParameterError;
use crate::lenient::{null_default, optional_int};

/// Reference to an uploaded resource file. Id `0` means "no resource".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceInfo {
  pub id: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub res: Option<String>,
}

/// Language of the main jar of a cluster job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgramType {
  Java,
  Scala,
  Python,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptParameters {
  pub raw_script: String,
  #[serde(deserialize_with = "null_default")]
  pub resource_list: Vec<ResourceInfo>,
  #[serde(deserialize_with = "null_default")]
  pub local_params: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SqlParameters {
  #[serde(rename = "type")]
  pub db_type: String,
  pub datasource: i64,
  pub sql: String,
  #[serde(deserialize_with = "optional_int")]
  pub sql_type: Option<i64>,
  #[serde(deserialize_with = "null_default")]
  pub pre_statements: Vec<String>,
  #[serde(deserialize_with = "null_default")]
  pub post_statements: Vec<String>,
  #[serde(deserialize_with = "null_default")]
  pub local_params: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcedureParameters {
  #[serde(rename = "type")]
  pub db_type: String,
  pub datasource: i64,
  pub method: String,
  #[serde(deserialize_with = "null_default")]
  pub local_params: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubProcessParameters {
  pub process_template_id: i64,
}

/// Shared shape of MR, SPARK and FLINK jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterJobParameters {
  pub main_class: Option<String>,
  pub main_jar: Option<ResourceInfo>,
  pub program_type: Option<ProgramType>,
  pub main_args: Option<String>,
  pub deploy_mode: Option<String>,
  #[serde(deserialize_with = "null_default")]
  pub resource_list: Vec<ResourceInfo>,
  #[serde(deserialize_with = "null_default")]
  pub local_params: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpParameters {
  pub url: String,
  pub http_method: Option<String>,
  #[serde(deserialize_with = "null_default")]
  pub http_params: Vec<Value>,
  pub http_check_condition: Option<String>,
  pub condition: Option<String>,
  #[serde(deserialize_with = "optional_int")]
  pub connect_timeout: Option<i64>,
  #[serde(deserialize_with = "optional_int")]
  pub socket_timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataxParameters {
  pub custom_config: i64,
  pub json: String,
  pub ds_type: String,
  pub data_source: i64,
  pub dt_type: String,
  pub data_target: i64,
  pub sql: String,
  pub target_table: String,
  #[serde(deserialize_with = "null_default")]
  pub pre_statements: Vec<String>,
  #[serde(deserialize_with = "null_default")]
  pub post_statements: Vec<String>,
  pub job_speed_byte: i64,
  pub job_speed_record: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SqoopParameters {
  pub model_type: String,
  pub concurrency: i64,
  pub source_type: String,
  pub target_type: String,
  pub source_params: String,
  pub target_params: String,
}

/// Typed parameters of one task node.
///
/// Types whose parameters are not interpreted here (dependency and
/// condition nodes, unknown tags) carry no payload and always pass.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskParameters {
  Shell(ScriptParameters),
  Python(ScriptParameters),
  Sql(SqlParameters),
  Procedure(ProcedureParameters),
  SubProcess(SubProcessParameters),
  Mr(ClusterJobParameters),
  Spark(ClusterJobParameters),
  Flink(ClusterJobParameters),
  Http(HttpParameters),
  Datax(DataxParameters),
  Sqoop(SqoopParameters),
  Dependent,
  Conditions,
  Other,
}

fn decode<T: DeserializeOwned>(task_type: TaskType, params: &Value) -> Result<T, ParameterError> {
  let value = match params {
    Value::Null => Value::Object(Map::new()),
    other => other.clone(),
  };
  serde_json::from_value(value).map_err(|e| ParameterError::Malformed {
    task_type: task_type.to_string(),
    message: e.to_string(),
  })
}

fn filled(s: &str) -> bool {
  !s.trim().is_empty()
}

impl TaskParameters {
  /// Parse `params` according to `task_type`.
  ///
  /// A null params value is read as an empty object, so a missing field
  /// surfaces in [`TaskParameters::check`] rather than here.
  pub fn parse(task_type: TaskType, params: &Value) -> Result<Self, ParameterError> {
    Ok(match task_type {
      TaskType::Shell => Self::Shell(decode(task_type, params)?),
      TaskType::Python => Self::Python(decode(task_type, params)?),
      TaskType::Sql => Self::Sql(decode(task_type, params)?),
      TaskType::Procedure => Self::Procedure(decode(task_type, params)?),
      TaskType::SubProcess => Self::SubProcess(decode(task_type, params)?),
      TaskType::Mr => Self::Mr(decode(task_type, params)?),
      TaskType::Spark => Self::Spark(decode(task_type, params)?),
      TaskType::Flink => Self::Flink(decode(task_type, params)?),
      TaskType::Http => Self::Http(decode(task_type, params)?),
      TaskType::Datax => Self::Datax(decode(task_type, params)?),
      TaskType::Sqoop => Self::Sqoop(decode(task_type, params)?),
      TaskType::Dependent => Self::Dependent,
      TaskType::Conditions => Self::Conditions,
      TaskType::Unknown => Self::Other,
    })
  }

  /// Whether the required fields for this type are present.
  pub fn check(&self) -> bool {
    match self {
      Self::Shell(p) | Self::Python(p) => filled(&p.raw_script),
      Self::Sql(p) => p.datasource != 0 && filled(&p.db_type) && filled(&p.sql),
      Self::Procedure(p) => p.datasource != 0 && filled(&p.db_type) && filled(&p.method),
      Self::SubProcess(p) => p.process_template_id != 0,
      Self::Mr(p) | Self::Spark(p) | Self::Flink(p) => {
        p.main_jar.is_some() && p.program_type.is_some()
      }
      Self::Http(p) => filled(&p.url) && p.http_method.is_some(),
      Self::Datax(p) => {
        if p.custom_config == 0 {
          p.data_source != 0 && p.data_target != 0 && filled(&p.sql) && filled(&p.target_table)
        } else {
          filled(&p.json)
        }
      }
      Self::Sqoop(p) => {
        filled(&p.model_type)
          && p.concurrency > 0
          && filled(&p.source_type)
          && filled(&p.target_type)
          && filled(&p.source_params)
          && filled(&p.target_params)
      }
      Self::Dependent | Self::Conditions | Self::Other => true,
    }
  }

  /// Ids of the resource files this node references, excluding id `0`.
  pub fn resource_ids(&self) -> Vec<i64> {
    let (list, main_jar) = match self {
      Self::Shell(p) | Self::Python(p) => (p.resource_list.as_slice(), None),
      Self::Mr(p) | Self::Spark(p) | Self::Flink(p) => {
        (p.resource_list.as_slice(), p.main_jar.as_ref())
      }
      _ => return Vec::new(),
    };

    list
      .iter()
      .chain(main_jar)
      .map(|r| r.id)
      .filter(|id| *id != 0)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn parse(kind: TaskType, params: Value) -> TaskParameters {
    TaskParameters::parse(kind, &params).unwrap()
  }

  #[test]
  fn test_shell_needs_script() {
    assert!(parse(TaskType::Shell, json!({ "rawScript": "echo hi" })).check());
    assert!(!parse(TaskType::Shell, json!({ "rawScript": "  " })).check());
    assert!(!parse(TaskType::Shell, Value::Null).check());
  }

  #[test]
  fn test_sql_requires_datasource() {
    let ok = json!({ "type": "MYSQL", "datasource": 3, "sql": "select 1" });
    assert!(parse(TaskType::Sql, ok).check());

    let redacted = json!({ "type": "MYSQL", "datasourceName": "warehouse", "sql": "select 1" });
    assert!(!parse(TaskType::Sql, redacted).check());
  }

  #[test]
  fn test_procedure_requires_method() {
    let p = json!({ "type": "MYSQL", "datasource": 3 });
    assert!(!parse(TaskType::Procedure, p).check());
  }

  #[test]
  fn test_sub_process_requires_id() {
    assert!(parse(TaskType::SubProcess, json!({ "processTemplateId": 9 })).check());
    assert!(!parse(TaskType::SubProcess, json!({})).check());
  }

  #[test]
  fn test_cluster_job_checks_jar_and_program_type() {
    let spark = json!({ "mainJar": { "id": 5 }, "programType": "SCALA" });
    assert!(parse(TaskType::Spark, spark).check());
    assert!(!parse(TaskType::Mr, json!({ "mainJar": { "id": 5 } })).check());
  }

  #[test]
  fn test_unknown_program_type_is_malformed() {
    let err = TaskParameters::parse(TaskType::Flink, &json!({ "programType": "RUST" }));
    assert!(matches!(err, Err(ParameterError::Malformed { .. })));
  }

  #[test]
  fn test_datax_modes() {
    let custom = json!({ "customConfig": 1, "json": "{}" });
    assert!(parse(TaskType::Datax, custom).check());

    let guided = json!({ "dataSource": 1, "dataTarget": 2, "sql": "select 1" });
    assert!(!parse(TaskType::Datax, guided).check());
  }

  #[test]
  fn test_sqoop_needs_positive_concurrency() {
    let p = json!({
      "modelType": "import",
      "concurrency": 0,
      "sourceType": "MYSQL",
      "targetType": "HIVE",
      "sourceParams": "{}",
      "targetParams": "{}"
    });
    assert!(!parse(TaskType::Sqoop, p).check());
  }

  #[test]
  fn test_http_needs_method() {
    assert!(!parse(TaskType::Http, json!({ "url": "http://x" })).check());
    assert!(parse(TaskType::Http, json!({ "url": "http://x", "httpMethod": "GET" })).check());
  }

  #[test]
  fn test_passthrough_types_always_pass() {
    assert!(parse(TaskType::Dependent, json!("anything")).check());
    assert!(parse(TaskType::Conditions, Value::Null).check());
    assert!(parse(TaskType::Unknown, json!(42)).check());
  }

  #[test]
  fn test_resource_ids_skip_zero() {
    let shell = parse(
      TaskType::Shell,
      json!({ "rawScript": "x", "resourceList": [{ "id": 1 }, { "id": 0 }, { "id": 7 }] }),
    );
    assert_eq!(shell.resource_ids(), vec![1, 7]);

    let mr = parse(
      TaskType::Mr,
      json!({ "mainJar": { "id": 4, "res": "job.jar" }, "resourceList": [{ "id": 2 }] }),
    );
    assert_eq!(mr.resource_ids(), vec![2, 4]);

    let sql = parse(TaskType::Sql, json!({ "datasource": 1 }));
    assert!(sql.resource_ids().is_empty());
  }
}
