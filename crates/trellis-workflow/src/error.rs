use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
  #[error("edge references unknown node or closes a cycle: from={from}, to={to}")]
  IllegalEdge { from: String, to: String },

  #[error("graph contains a cycle")]
  Cycle,
}
