#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use trellis_engine::{ResourceAccess, StaticResourceAccess, TemplateRequest, TemplateService, User};
use trellis_store::SqliteStore;
use trellis_task::StaticEnvironment;

pub type Service<A = StaticResourceAccess> = TemplateService<SqliteStore, A>;

pub async fn store() -> SqliteStore {
  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .unwrap();
  let store = SqliteStore::new(pool);
  store.migrate().await.unwrap();
  store
}

pub async fn service_with<A: ResourceAccess>(access: A, env: StaticEnvironment) -> Service<A> {
  TemplateService::new(store().await, access, Arc::new(env))
}

pub async fn service() -> Service {
  service_with(StaticResourceAccess::default(), StaticEnvironment::default()).await
}

pub fn alice() -> User {
  User::new(1, "alice")
}

pub fn bob() -> User {
  User::new(2, "bob")
}

pub fn root() -> User {
  User::admin(9, "root")
}

pub fn shell(name: &str, pre: &[&str]) -> Value {
  json!({
    "name": name,
    "type": "SHELL",
    "params": { "rawScript": format!("echo {name}") },
    "preTasks": pre
  })
}

pub fn sub_process(name: &str, template_id: i64, pre: &[&str]) -> Value {
  json!({
    "name": name,
    "type": "SUB_PROCESS",
    "params": { "processTemplateId": template_id },
    "preTasks": pre
  })
}

pub fn payload(tasks: Vec<Value>) -> String {
  json!({ "tasks": tasks, "globalParams": [], "tenantId": 0 }).to_string()
}

pub fn request(name: &str, tasks: Vec<Value>) -> TemplateRequest {
  TemplateRequest::new(name, payload(tasks))
}

/// The `processTemplateId` of the named node in a stored payload.
pub fn sub_process_id(payload: &str, node: &str) -> Option<i64> {
  let value: Value = serde_json::from_str(payload).ok()?;
  value["tasks"]
    .as_array()?
    .iter()
    .find(|t| t["name"] == node)?["params"]["processTemplateId"]
    .as_i64()
}
