//! Trellis Engine
//!
//! The template lifecycle on top of a [`Store`](trellis_store::Store):
//! create, update, copy, release, delete, export and import.
//!
//! Export and import rewrite each task node through the handlers of a
//! [`TaskRegistry`](trellis_task::TaskRegistry). Import additionally
//! materializes every sub-process template a payload references into the
//! target project, deepest first, and points the references at the copies.

mod dispatch;
mod error;
mod naming;
mod permission;
mod service;
mod subprocess;
mod user;

pub use dispatch::{Direction, correct_payload};
pub use error::{ErrorKind, ServiceError};
pub use naming::{copy_name, import_name};
pub use permission::{AccessDenied, AllowAll, ResourceAccess, StaticResourceAccess};
pub use service::{BatchDeleteReport, ImportReport, ImportedTemplate, ServiceOptions, TemplateService};
pub use subprocess::{RemapTable, apply_remap};
pub use user::{TemplateRequest, User};
