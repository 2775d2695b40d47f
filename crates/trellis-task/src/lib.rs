//! Trellis Task
//!
//! Knows what each task type expects in its `params` object and how a node
//! of that type is rewritten when a template leaves or enters an
//! environment.
//!
//! - [`TaskParameters`] parses and checks the typed parameters of a node.
//! - [`TaskHandler`] is the per-type strategy, looked up through a
//!   [`TaskRegistry`]. Unregistered types resolve to a pass-through handler.
//! - [`EnvironmentResolver`] answers the id/name lookups the export and
//!   import rewrites need.

mod datasource;
mod dependent;
mod environment;
mod error;
mod extras;
mod handler;
mod lenient;
mod parameters;
mod raw;
mod registry;

pub use datasource::DatasourceHandler;
pub use dependent::DependentHandler;
pub use environment::{DatasourceInfo, DefinitionRef, EnvironmentResolver, StaticEnvironment};
pub use error::ParameterError;
pub use extras::check_extras;
pub use handler::{PassThrough, TaskHandler};
pub use parameters::{ProgramType, ResourceInfo, TaskParameters};
pub use raw::{params_object_mut, task_type_of};
pub use registry::TaskRegistry;
