//! Trellis Validator
//!
//! Turns a raw template payload into a [`ValidatedTemplate`] or a
//! [`ValidationError`]. The checks run fail-fast in a fixed order:
//!
//! 1. the payload parses
//! 2. the task list is present and non-empty
//! 3. the `preTasks` edges form a DAG
//! 4. every node's parameters pass their type's check
//!
//! The extras of each node are checked last, and a failure there is only
//! logged. On success the resource references of all nodes are collected.

mod error;
mod params;
mod resources;
mod validator;

pub use error::ValidationError;
pub use params::dedup_global_params;
pub use resources::{collect_resource_ids, join_resource_ids, parse_resource_ids};
pub use validator::{TemplateValidator, ValidatedTemplate};
