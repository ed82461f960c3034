use hashbrown::HashMap;

use task::Task;
use util::Hasher;

use crate::{Error, GraphBuilder, NodeId};

/// A directed edge; `from` must run before `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Immutable directed graph of tasks, one node per task, edges pointing from
/// prerequisite to dependent. Derived from the task collection at resolution
/// time and discarded after one resolution.
#[derive(Debug)]
pub struct Graph {
    /// task names in registration order
    pub(crate) nodes: Vec<String>,
    /// lowercased name -> node id
    pub(crate) index: HashMap<String, NodeId, Hasher>,
    /// all edges, in declaration order
    pub(crate) edges: Vec<Edge>,
    /// per node, ids of nodes that must run before it, in declaration order
    pub(crate) incoming: Vec<Vec<NodeId>>,
}

impl Graph {
    /// Build a fresh graph from the given tasks. Fails if a required
    /// dependency target is missing, or a task depends on itself.
    pub fn build<C>(tasks: &[Task<C>]) -> Result<Self, Error> {
        GraphBuilder::build(tasks)
    }

    /// True if a task with the given name (ignoring ASCII case) has a node.
    pub fn exists(&self, name: &str) -> bool {
        self.id(name).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Task names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub(crate) fn id(&self, name: &str) -> Option<NodeId> {
        self.index.get(&name.to_ascii_lowercase()).copied()
    }

    pub(crate) fn name(&self, id: NodeId) -> &str {
        &self.nodes[id]
    }
}
