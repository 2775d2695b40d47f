use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

/// Some resources are missing or not permitted for a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("resources {denied:?} are not accessible to user {user_id}")]
pub struct AccessDenied {
  pub user_id: i64,
  pub denied: Vec<i64>,
}

/// Checks that a user may use a set of resource files.
#[async_trait]
pub trait ResourceAccess: Send + Sync {
  async fn check_resources_accessible(&self, ids: &[i64], user_id: i64) -> Result<(), AccessDenied>;
}

/// Grants access to every resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl ResourceAccess for AllowAll {
  async fn check_resources_accessible(&self, _ids: &[i64], _user_id: i64) -> Result<(), AccessDenied> {
    Ok(())
  }
}

/// Grants access to a fixed set of resource ids, for every user.
#[derive(Debug, Clone, Default)]
pub struct StaticResourceAccess {
  accessible: HashSet<i64>,
}

impl StaticResourceAccess {
  pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
    Self {
      accessible: ids.into_iter().collect(),
    }
  }
}

#[async_trait]
impl ResourceAccess for StaticResourceAccess {
  async fn check_resources_accessible(&self, ids: &[i64], user_id: i64) -> Result<(), AccessDenied> {
    let denied: Vec<i64> = ids
      .iter()
      .copied()
      .filter(|id| !self.accessible.contains(id))
      .collect();

    if denied.is_empty() {
      Ok(())
    } else {
      Err(AccessDenied { user_id, denied })
    }
  }
}
