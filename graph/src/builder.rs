use hashbrown::HashMap;

use task::Task;
use util::Hasher;

use crate::{Edge, Error, Graph, NodeId};

/// Accumulates nodes and raw dependency declarations, then materializes the
/// immutable [`Graph`]. Forward and reverse declarations are both collapsed
/// into one forward edge set here, before any traversal runs, so indirect
/// orderings are visible to cycle detection.
pub struct GraphBuilder {
    nodes: Vec<String>,
    index: HashMap<String, NodeId, Hasher>,
    edges: Vec<Edge>,
    incoming: Vec<Vec<NodeId>>,
}

impl GraphBuilder {
    fn with_capacity(cap: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(cap),
            index: HashMap::with_capacity_and_hasher(cap, Hasher::default()),
            edges: Vec::with_capacity(cap * 2),
            incoming: Vec::with_capacity(cap),
        }
    }

    /// Two passes: add every node first, then resolve declarations into
    /// edges, so reverse declarations can point at tasks registered later.
    pub fn build<C>(tasks: &[Task<C>]) -> Result<Graph, Error> {
        let mut builder = Self::with_capacity(tasks.len());
        for task in tasks {
            builder.add_node(&task.name);
        }
        for task in tasks {
            builder.add_task_edges(task)?;
        }
        Ok(builder.into_graph())
    }

    fn add_node(&mut self, name: &str) {
        let id = self.nodes.len();
        let prev = self.index.insert(name.to_ascii_lowercase(), id);
        // the engine rejects duplicate registrations before we get here:
        debug_assert!(prev.is_none(), "duplicate task name '{name}'");
        self.nodes.push(name.to_owned());
        self.incoming.push(Vec::with_capacity(2));
    }

    fn add_task_edges<C>(&mut self, task: &Task<C>) -> Result<(), Error> {
        let this = match self.id(&task.name) {
            Some(id) => id,
            None => return Ok(()), // unreachable; nodes were added in pass 1
        };

        for dep in &task.dependencies {
            match self.id(&dep.name) {
                Some(from) if from == this => {
                    return Err(Error::ReflexiveTask(task.name.clone()));
                }
                Some(from) => self.connect(from, this),
                None if dep.required => {
                    return Err(Error::MissingDependency {
                        task: task.name.clone(),
                        dependency: dep.name.clone(),
                    });
                }
                None => log::debug!(
                    "dropping optional dependency '{}' of task '{}': no such task",
                    dep.name,
                    task.name,
                ),
            }
        }

        // reverse declarations become forward edges on the target task:
        for dependee in &task.dependees {
            match self.id(&dependee.name) {
                Some(to) if to == this => {
                    return Err(Error::ReflexiveTask(task.name.clone()));
                }
                Some(to) => self.connect(this, to),
                None if dependee.required => {
                    return Err(Error::MissingDependee {
                        task: task.name.clone(),
                        dependee: dependee.name.clone(),
                    });
                }
                None => log::debug!(
                    "dropping optional dependee '{}' of task '{}': no such task",
                    dependee.name,
                    task.name,
                ),
            }
        }

        Ok(())
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        // repeat declarations collapse to a single edge:
        if self.incoming[to].contains(&from) {
            return;
        }
        self.incoming[to].push(from);
        self.edges.push(Edge { from, to });
    }

    fn id(&self, name: &str) -> Option<NodeId> {
        self.index.get(&name.to_ascii_lowercase()).copied()
    }

    fn into_graph(self) -> Graph {
        Graph {
            nodes: self.nodes,
            index: self.index,
            edges: self.edges,
            incoming: self.incoming,
        }
    }
}
