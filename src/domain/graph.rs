//! Reverse-dependency index
//!
//! Answers "how many tasks depend directly on X" for the dependency term
//! of the score. Edges point from a prerequisite to the task waiting on
//! it, so a node's out-degree is its blocking count. Nothing here walks
//! the graph: cycles are legal and each edge counts once.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction::Outgoing;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use thiserror::Error;

use super::id::TaskId;
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(TaskId),
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<TaskId, ()>,
    nodes: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a set of tasks and the edges between them
    ///
    /// Edges to tasks outside the set and self-edges are dropped, since
    /// neither can block anything being ranked.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let tasks: Vec<&Task> = tasks.into_iter().collect();

        let mut graph = Self::new();
        for task in &tasks {
            graph.add_task(task.id.clone());
        }
        for task in &tasks {
            for prerequisite in &task.depends_on {
                graph.add_dependency(&task.id, prerequisite).ok();
            }
        }

        graph
    }

    /// Registers a task; re-adding an existing ID does nothing
    pub fn add_task(&mut self, task_id: TaskId) {
        if let Entry::Vacant(slot) = self.nodes.entry(task_id) {
            let node = self.graph.add_node(slot.key().clone());
            slot.insert(node);
        }
    }

    fn node(&self, task_id: &TaskId) -> Result<NodeIndex, GraphError> {
        self.nodes
            .get(task_id)
            .copied()
            .ok_or_else(|| GraphError::TaskNotFound(task_id.clone()))
    }

    /// Records that `task` waits on `depends_on`
    ///
    /// Both tasks must be registered. Repeating an edge is a no-op.
    pub fn add_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<(), GraphError> {
        if task == depends_on {
            return Err(GraphError::SelfDependency(task.clone()));
        }

        let waiting = self.node(task)?;
        let prerequisite = self.node(depends_on)?;
        self.graph.update_edge(prerequisite, waiting, ());
        Ok(())
    }

    /// Tasks that wait on `task_id`
    pub fn dependents(&self, task_id: &TaskId) -> Vec<TaskId> {
        let Ok(node) = self.node(task_id) else {
            return Vec::new();
        };

        self.graph
            .neighbors_directed(node, Outgoing)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Blocking count of `task_id`, `None` if it isn't indexed
    pub fn dependent_count(&self, task_id: &TaskId) -> Option<u32> {
        let node = self.node(task_id).ok()?;
        Some(self.out_degree(node))
    }

    /// Blocking count of every indexed task
    pub fn dependent_counts(&self) -> HashMap<TaskId, u32> {
        self.nodes
            .iter()
            .map(|(id, node)| (id.clone(), self.out_degree(*node)))
            .collect()
    }

    fn out_degree(&self, node: NodeIndex) -> u32 {
        let degree = self.graph.neighbors_directed(node, Outgoing).count();
        u32::try_from(degree).unwrap_or(u32::MAX)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
