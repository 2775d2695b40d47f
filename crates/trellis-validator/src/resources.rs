use std::collections::BTreeSet;

use trellis_config::TaskNode;
use trellis_task::TaskParameters;

use crate::error::ValidationError;

/// The set of non-zero resource ids referenced by any node.
///
/// Nodes whose parameters do not parse contribute nothing.
pub fn collect_resource_ids(tasks: &[TaskNode]) -> BTreeSet<i64> {
  tasks
    .iter()
    .filter_map(|node| TaskParameters::parse(node.kind(), &node.params).ok())
    .flat_map(|params| params.resource_ids())
    .collect()
}

/// The stored form of a resource id set.
pub fn join_resource_ids(ids: &BTreeSet<i64>) -> String {
  ids
    .iter()
    .map(i64::to_string)
    .collect::<Vec<_>>()
    .join(",")
}

/// Read a stored resource id list. Blank entries are ignored.
pub fn parse_resource_ids(stored: &str) -> Result<Vec<i64>, ValidationError> {
  stored
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      s.parse::<i64>()
        .map_err(|_| ValidationError::InvalidResourceIds(stored.to_string()))
    })
    .collect()
}
