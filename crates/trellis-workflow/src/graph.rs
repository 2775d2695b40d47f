use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::GraphError;

/// Directed graph keyed by node name.
///
/// Vertices keep their first insertion order so traversal results are
/// deterministic. Re-adding a vertex replaces its payload but keeps its edges.
#[derive(Debug, Clone)]
pub struct Graph<N> {
  /// Vertex names in first insertion order.
  order: Vec<String>,
  /// Vertex payloads.
  nodes: HashMap<String, N>,
  /// Adjacency list: node -> downstream nodes.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: node -> upstream nodes.
  reverse_adjacency: HashMap<String, Vec<String>>,
}

impl<N> Default for Graph<N> {
  fn default() -> Self {
    Self {
      order: Vec::new(),
      nodes: HashMap::new(),
      adjacency: HashMap::new(),
      reverse_adjacency: HashMap::new(),
    }
  }
}

impl<N> Graph<N> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a vertex, or replace the payload of an existing one.
  pub fn add_node(&mut self, name: impl Into<String>, payload: N) {
    let name = name.into();
    if !self.nodes.contains_key(&name) {
      self.order.push(name.clone());
      self.adjacency.entry(name.clone()).or_default();
      self.reverse_adjacency.entry(name.clone()).or_default();
    }
    self.nodes.insert(name, payload);
  }

  /// Add an edge `from -> to`.
  ///
  /// Returns `false` and leaves the graph untouched when the edge is a
  /// self-loop, when either endpoint is not a vertex, or when `to` can
  /// already reach `from` (the edge would close a cycle).
  pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
    if !self.is_legal_edge(from, to) {
      return false;
    }

    let downstream = self.adjacency.entry(from.to_string()).or_default();
    if !downstream.iter().any(|n| n == to) {
      downstream.push(to.to_string());
      self
        .reverse_adjacency
        .entry(to.to_string())
        .or_default()
        .push(from.to_string());
    }
    true
  }

  fn is_legal_edge(&self, from: &str, to: &str) -> bool {
    if from == to {
      return false;
    }
    if !self.contains_node(from) || !self.contains_node(to) {
      return false;
    }
    !self.reaches(to, from)
  }

  /// Whether `target` is reachable from `start` along edges.
  fn reaches(&self, start: &str, target: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
      if current == target {
        return true;
      }
      if !seen.insert(current) {
        continue;
      }
      stack.extend(self.downstream(current).iter().map(|s| s.as_str()));
    }

    false
  }

  pub fn contains_node(&self, name: &str) -> bool {
    self.nodes.contains_key(name)
  }

  pub fn node(&self, name: &str) -> Option<&N> {
    self.nodes.get(name)
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  /// Get downstream nodes for a given node.
  pub fn downstream(&self, name: &str) -> &[String] {
    self
      .adjacency
      .get(name)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get upstream nodes for a given node.
  pub fn upstream(&self, name: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(name)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Nodes with no incoming edges.
  pub fn begin_nodes(&self) -> Vec<&str> {
    self
      .order
      .iter()
      .filter(|name| self.upstream(name).is_empty())
      .map(|s| s.as_str())
      .collect()
  }

  /// Nodes with no outgoing edges.
  pub fn end_nodes(&self) -> Vec<&str> {
    self
      .order
      .iter()
      .filter(|name| self.downstream(name).is_empty())
      .map(|s| s.as_str())
      .collect()
  }

  /// Whole-graph cycle check.
  pub fn has_cycle(&self) -> bool {
    self.topological_order().is_err()
  }

  /// Kahn's algorithm over the vertices in insertion order.
  pub fn topological_order(&self) -> Result<Vec<String>, GraphError> {
    let mut in_degree: HashMap<&str, usize> = self
      .order
      .iter()
      .map(|name| (name.as_str(), self.upstream(name).len()))
      .collect();

    let mut queue: VecDeque<&str> = self
      .order
      .iter()
      .filter(|name| in_degree.get(name.as_str()) == Some(&0))
      .map(|s| s.as_str())
      .collect();

    let mut sorted = Vec::with_capacity(self.order.len());
    while let Some(current) = queue.pop_front() {
      sorted.push(current.to_string());
      for next in self.downstream(current) {
        if let Some(degree) = in_degree.get_mut(next.as_str()) {
          *degree -= 1;
          if *degree == 0 {
            queue.push_back(next.as_str());
          }
        }
      }
    }

    if sorted.len() == self.order.len() {
      Ok(sorted)
    } else {
      Err(GraphError::Cycle)
    }
  }
}
