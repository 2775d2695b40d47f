//! Trellis Config
//!
//! This crate contains the serializable types for trellis workflow templates.
//! These types represent a template payload as it is submitted, stored and
//! exchanged, before it is validated or rewritten by the engine.
//!
//! Payloads arrive from:
//! - Create/update requests (as a JSON string)
//! - Stored template rows (as a JSON blob)
//! - Export bundles (as a JSON string nested inside a [`TemplateMeta`])
//!
//! The validator parses these types, checks the task graph and task
//! parameters, and derives the resource references stored with a template.

mod bundle;
mod lenient;
mod node;
mod property;
mod task_type;
mod template;

pub use bundle::TemplateMeta;
pub use node::TaskNode;
pub use property::{DataType, Direct, Property};
pub use task_type::TaskType;
pub use template::{SUB_PROCESS_ID_KEY, TASKS_KEY, TemplateData};
