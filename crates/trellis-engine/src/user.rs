use serde::{Deserialize, Serialize};

/// The user an operation is performed as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub is_admin: bool,
}

impl User {
  pub fn new(id: i64, name: impl Into<String>) -> Self {
    Self {
      id,
      name: name.into(),
      is_admin: false,
    }
  }

  pub fn admin(id: i64, name: impl Into<String>) -> Self {
    Self {
      is_admin: true,
      ..Self::new(id, name)
    }
  }

  /// Whether this user may delete a template owned by `owner_id`.
  pub fn can_modify(&self, owner_id: i64) -> bool {
    self.is_admin || self.id == owner_id
  }
}

/// The submitted fields of a create or update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
  pub name: String,
  /// Template payload JSON.
  pub payload: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub locations: String,
  #[serde(default)]
  pub connects: String,
  #[serde(default)]
  pub biz_type_id: Option<i64>,
  #[serde(default)]
  pub biz_form_url: Option<String>,
}

impl TemplateRequest {
  pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      payload: payload.into(),
      ..Default::default()
    }
  }
}
