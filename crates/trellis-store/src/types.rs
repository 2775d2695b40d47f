use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use trellis_config::Property;

/// Whether a template can be scheduled. ONLINE templates are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "snake_case")]
pub enum ReleaseState {
  Offline,
  Online,
}

/// Validity flag of a template row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "snake_case")]
pub enum Flag {
  Yes,
  No,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
  pub id: i64,
  pub name: String,
  pub created_at: DateTime<Utc>,
}

/// A template as stored in the database, joined with its project's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Template {
  pub id: i64,
  pub project_id: i64,
  pub project_name: String,
  pub name: String,
  pub version: i64,
  pub release_state: ReleaseState,
  pub flag: Flag,
  pub description: String,
  pub user_id: i64,
  pub user_name: String,
  pub modified_by: Option<String>,
  /// The template payload JSON, stored as submitted.
  pub payload: String,
  pub global_params: Json<Vec<Property>>,
  pub locations: String,
  pub connects: String,
  /// Comma-joined resource ids derived from the payload.
  pub resource_ids: String,
  pub tenant_id: i64,
  pub biz_type_id: Option<i64>,
  pub biz_form_url: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields of a template row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
  pub project_id: i64,
  pub name: String,
  pub version: i64,
  pub release_state: ReleaseState,
  pub flag: Flag,
  pub description: String,
  pub user_id: i64,
  pub user_name: String,
  pub modified_by: Option<String>,
  pub payload: String,
  pub global_params: Vec<Property>,
  pub locations: String,
  pub connects: String,
  pub resource_ids: String,
  pub tenant_id: i64,
  pub biz_type_id: Option<i64>,
  pub biz_form_url: Option<String>,
}
