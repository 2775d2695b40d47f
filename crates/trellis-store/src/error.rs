use thiserror::Error;

/// Errors raised by a [`Store`](crate::Store).
#[derive(Debug, Error)]
pub enum Error {
  /// A unique key is already taken.
  #[error("{entity} '{key}' already exists")]
  Duplicate { entity: &'static str, key: String },

  /// The database reported an error.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Applying migrations failed.
  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

impl Error {
  pub(crate) fn from_insert(entity: &'static str, key: &str, error: sqlx::Error) -> Self {
    if let sqlx::Error::Database(db) = &error
      && db.is_unique_violation()
    {
      return Self::Duplicate {
        entity,
        key: key.to_string(),
      };
    }
    Self::Database(error)
  }
}
