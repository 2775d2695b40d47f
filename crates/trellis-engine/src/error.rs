use thiserror::Error;
use trellis_validator::ValidationError;

use crate::permission::AccessDenied;

/// Broad category of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Conflict,
  Permission,
  Io,
  Storage,
}

/// Errors returned by [`TemplateService`](crate::TemplateService) operations.
#[derive(Debug, Error)]
pub enum ServiceError {
  /// The payload or bundle was rejected.
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// No project has this name.
  #[error("project '{0}' not found")]
  ProjectNotFound(String),

  /// No template has this id in the addressed project.
  #[error("template {0} not found")]
  TemplateNotFound(i64),

  /// None of the requested templates exist.
  #[error("no templates found for ids {0:?}")]
  TemplatesNotFound(Vec<i64>),

  /// The name is already used by another template in the project.
  #[error("template '{name}' already exists in project '{project}'")]
  NameExists { project: String, name: String },

  /// Every candidate import name was taken.
  #[error("no free name for '{0}' after {1} attempts")]
  NamesExhausted(String, usize),

  /// The template is ONLINE and cannot be modified.
  #[error("template {0} is online")]
  TemplateOnline(i64),

  /// Only the owner or an admin may perform the operation.
  #[error("user '{user}' may not modify template {template_id}")]
  NotOwner { user: String, template_id: i64 },

  /// A referenced resource is missing or not permitted for the user.
  #[error(transparent)]
  AccessDenied(#[from] AccessDenied),

  /// Writing an export document failed.
  #[error("export write failed: {0}")]
  Io(#[from] std::io::Error),

  /// An export document could not be serialized.
  #[error("export serialization failed: {0}")]
  Serialize(#[source] serde_json::Error),

  /// The backing store failed.
  #[error(transparent)]
  Store(#[from] trellis_store::Error),
}

impl ServiceError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::ProjectNotFound(_) | Self::TemplateNotFound(_) | Self::TemplatesNotFound(_) => {
        ErrorKind::NotFound
      }
      Self::NameExists { .. } | Self::NamesExhausted(..) | Self::TemplateOnline(_) => {
        ErrorKind::Conflict
      }
      Self::NotOwner { .. } | Self::AccessDenied(_) => ErrorKind::Permission,
      Self::Io(_) | Self::Serialize(_) => ErrorKind::Io,
      Self::Store(trellis_store::Error::Duplicate { .. }) => ErrorKind::Conflict,
      Self::Store(_) => ErrorKind::Storage,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_kinds() {
    assert_eq!(
      ServiceError::from(ValidationError::EmptyTaskList).kind(),
      ErrorKind::Validation
    );
    assert_eq!(ServiceError::TemplateOnline(1).kind(), ErrorKind::Conflict);
    assert_eq!(ServiceError::TemplateNotFound(1).kind(), ErrorKind::NotFound);
    assert_eq!(
      ServiceError::from(trellis_store::Error::Duplicate {
        entity: "template",
        key: "a".into()
      })
      .kind(),
      ErrorKind::Conflict
    );
    assert_eq!(
      ServiceError::from(AccessDenied {
        user_id: 1,
        denied: vec![2]
      })
      .kind(),
      ErrorKind::Permission
    );
  }
}
