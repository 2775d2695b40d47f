//! Trellis Store
//!
//! This crate provides the storage trait and implementations for projects
//! and workflow templates. Data is persisted to SQLite.
//!
//! The [`Store`] trait defines operations for:
//! - Creating and looking up projects
//! - Inserting, updating and deleting templates
//! - Looking templates up by id, by name within a project, or in bulk

mod error;
mod sqlite;
mod types;

use std::future::Future;

pub use error::Error;
pub use sqlx::types::Json;
pub use sqlite::SqliteStore;
pub use types::{Flag, NewTemplate, Project, ReleaseState, Template};

/// Storage trait for projects and templates.
pub trait Store: Send + Sync {
  /// Create a project. Fails with [`Error::Duplicate`] if the name is taken.
  fn create_project(&self, name: &str) -> impl Future<Output = Result<Project, Error>> + Send;

  fn get_project_by_name(
    &self,
    name: &str,
  ) -> impl Future<Output = Result<Option<Project>, Error>> + Send;

  fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>, Error>> + Send;

  /// Insert a template and return its id.
  fn insert_template(
    &self,
    template: &NewTemplate,
  ) -> impl Future<Output = Result<i64, Error>> + Send;

  fn get_template(&self, id: i64) -> impl Future<Output = Result<Option<Template>, Error>> + Send;

  /// Look a template up by its unique name within a project.
  fn get_template_by_name(
    &self,
    project_id: i64,
    name: &str,
  ) -> impl Future<Output = Result<Option<Template>, Error>> + Send;

  fn list_templates(
    &self,
    project_id: i64,
  ) -> impl Future<Output = Result<Vec<Template>, Error>> + Send;

  /// Templates whose id is in `ids`, in id order. Unknown ids are skipped.
  fn list_templates_by_ids(
    &self,
    ids: &[i64],
  ) -> impl Future<Output = Result<Vec<Template>, Error>> + Send;

  /// Overwrite the mutable fields of a template row. Returns `false` if the
  /// row does not exist.
  fn update_template(&self, template: &Template)
  -> impl Future<Output = Result<bool, Error>> + Send;

  fn update_release_state(
    &self,
    id: i64,
    state: ReleaseState,
  ) -> impl Future<Output = Result<bool, Error>> + Send;

  /// Delete a template. Returns `false` if the row does not exist.
  fn delete_template(&self, id: i64) -> impl Future<Output = Result<bool, Error>> + Send;
}
