use trellis_config::TaskNode;

use crate::error::GraphError;
use crate::graph::Graph;

/// Build the precedence graph of a task list.
///
/// Every task name becomes a vertex (a repeated name overwrites the same
/// vertex), then every `preTasks` entry adds an edge into its task. The
/// first refused edge aborts construction.
pub fn build_task_graph(tasks: &[TaskNode]) -> Result<Graph<&TaskNode>, GraphError> {
  let mut graph = Graph::new();

  for task in tasks {
    graph.add_node(task.name.clone(), task);
  }

  for task in tasks {
    for pre_task in &task.pre_tasks {
      if !graph.add_edge(pre_task, &task.name) {
        return Err(GraphError::IllegalEdge {
          from: pre_task.clone(),
          to: task.name.clone(),
        });
      }
    }
  }

  Ok(graph)
}

/// Whether the task list's precedence edges fail to form a DAG.
///
/// A refused edge during construction counts as a cycle, as does a failed
/// whole-graph check afterwards.
pub fn graph_has_cycle(tasks: &[TaskNode]) -> bool {
  match build_task_graph(tasks) {
    Ok(graph) => graph.has_cycle(),
    Err(_) => true,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn task(name: &str, pre_tasks: &[&str]) -> TaskNode {
    TaskNode {
      name: name.to_string(),
      task_type: "SHELL".to_string(),
      params: json!({ "rawScript": "echo" }),
      pre_tasks: pre_tasks.iter().map(|s| s.to_string()).collect(),
      extras: serde_json::Value::Null,
    }
  }

  #[test]
  fn test_acyclic_chain() {
    let tasks = vec![task("a", &[]), task("b", &["a"]), task("c", &["a", "b"])];
    assert!(!graph_has_cycle(&tasks));

    let graph = build_task_graph(&tasks).unwrap();
    assert_eq!(graph.begin_nodes(), vec!["a"]);
    assert_eq!(graph.upstream("c").len(), 2);
  }

  #[test]
  fn test_three_node_cycle() {
    let tasks = vec![task("a", &["c"]), task("b", &["a"]), task("c", &["b"])];
    assert!(graph_has_cycle(&tasks));
  }

  #[test]
  fn test_unknown_predecessor_counts_as_cycle() {
    let tasks = vec![task("a", &[]), task("b", &["missing"])];
    assert!(graph_has_cycle(&tasks));
    assert_eq!(
      build_task_graph(&tasks).unwrap_err(),
      GraphError::IllegalEdge {
        from: "missing".to_string(),
        to: "b".to_string(),
      }
    );
  }

  #[test]
  fn test_self_reference_counts_as_cycle() {
    let tasks = vec![task("a", &["a"])];
    assert!(graph_has_cycle(&tasks));
  }

  #[test]
  fn test_empty_list_has_no_cycle() {
    assert!(!graph_has_cycle(&[]));
  }

  #[test]
  fn test_duplicate_names_share_a_vertex() {
    let tasks = vec![task("a", &[]), task("a", &[]), task("b", &["a"])];
    let graph = build_task_graph(&tasks).unwrap();
    assert_eq!(graph.len(), 2);
    assert!(!graph.has_cycle());
  }
}
