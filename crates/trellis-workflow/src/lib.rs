//! Trellis Workflow
//!
//! This crate builds the ephemeral task graph of a template. Vertices are
//! task node names and edges run from each declared predecessor to the node
//! that names it in `preTasks`.
//!
//! The graph is never persisted. It exists for the duration of a validation
//! call and answers one question: does the template's precedence form a DAG?
//!
//! Cycle detection happens twice:
//! - incrementally, when an edge is refused because an endpoint is unknown
//!   or the edge would close a cycle
//! - over the whole graph, with a topological check after construction
//!
//! Either signal is enough to reject a template.

mod error;
mod graph;
mod tasks;

pub use error::GraphError;
pub use graph::Graph;
pub use tasks::{build_task_graph, graph_has_cycle};
