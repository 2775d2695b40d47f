use async_trait::async_trait;
use serde_json::Value;
use trellis_config::TaskNode;

use crate::environment::EnvironmentResolver;
use crate::error::ParameterError;
use crate::parameters::TaskParameters;

/// Per-type behaviour of a task node.
///
/// Validation parses the node's typed parameters and runs their check. The
/// two rewrites operate on the raw JSON node so that keys this crate does
/// not model survive untouched. Both default to no-ops.
#[async_trait]
pub trait TaskHandler: Send + Sync {
  /// Check a parsed node's parameters.
  fn validate(&self, node: &TaskNode) -> Result<(), ParameterError> {
    let kind = node.kind();
    let params = TaskParameters::parse(kind, &node.params)?;
    if params.check() {
      Ok(())
    } else {
      Err(ParameterError::Invalid {
        task_type: kind.to_string(),
      })
    }
  }

  /// Rewrite a raw node before it leaves the environment.
  async fn correct_for_export(&self, _node: &mut Value, _env: &dyn EnvironmentResolver) {}

  /// Rewrite a raw node as it enters the environment.
  async fn correct_for_import(&self, _node: &mut Value, _env: &dyn EnvironmentResolver) {}
}

/// Handler for types with no environment-specific fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl TaskHandler for PassThrough {}
