use std::collections::HashMap;
use std::sync::Arc;

use crate::datasource::DatasourceHandler;
use crate::dependent::DependentHandler;
use crate::handler::{PassThrough, TaskHandler};

/// Maps task type tags to their handlers.
///
/// Tags are matched case-insensitively. Looking up a tag with no registered
/// handler yields the pass-through handler, never an error.
pub struct TaskRegistry {
  handlers: HashMap<String, Arc<dyn TaskHandler>>,
  fallback: Arc<dyn TaskHandler>,
}

fn normalize(tag: &str) -> String {
  tag.trim().to_ascii_uppercase()
}

impl TaskRegistry {
  /// A registry with no type-specific handlers.
  pub fn empty() -> Self {
    Self {
      handlers: HashMap::new(),
      fallback: Arc::new(PassThrough),
    }
  }

  /// The registry with the built-in rewrite strategies.
  pub fn standard() -> Self {
    let mut registry = Self::empty();
    let datasource: Arc<dyn TaskHandler> = Arc::new(DatasourceHandler);
    registry.register("SQL", datasource.clone());
    registry.register("PROCEDURE", datasource);
    registry.register("DEPENDENT", Arc::new(DependentHandler));
    registry
  }

  /// Register a handler, returning the one it replaced.
  pub fn register(
    &mut self,
    tag: &str,
    handler: Arc<dyn TaskHandler>,
  ) -> Option<Arc<dyn TaskHandler>> {
    self.handlers.insert(normalize(tag), handler)
  }

  pub fn is_registered(&self, tag: &str) -> bool {
    self.handlers.contains_key(&normalize(tag))
  }

  /// The handler for a tag.
  pub fn resolve(&self, tag: &str) -> &dyn TaskHandler {
    self
      .handlers
      .get(&normalize(tag))
      .unwrap_or(&self.fallback)
      .as_ref()
  }
}

impl Default for TaskRegistry {
  fn default() -> Self {
    Self::standard()
  }
}
