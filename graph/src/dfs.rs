use crate::{Error, Graph, NodeId};

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// One level of the explicit traversal stack: a node and the index of the
/// next prerequisite to visit.
struct Frame {
    node: NodeId,
    next: usize,
}

impl Graph {
    /// Resolve the ordered task list for `target`.
    ///
    /// Depth-first post-order from the target node, visiting prerequisites
    /// in declaration order before the node itself, with duplicates removed
    /// by first occurrence. The target is always last. The walk is iterative
    /// with an explicit stack, so a pathological dependency chain cannot
    /// overflow the call stack, and a cycle reachable from the target is
    /// reported as an error naming the task where it was detected.
    pub fn traverse(&self, target: &str) -> Result<Vec<String>, Error> {
        let root = self
            .id(target)
            .ok_or_else(|| Error::TargetNotFound(target.to_owned()))?;

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::with_capacity(16);

        marks[root] = Mark::InProgress;
        stack.push(Frame {
            node: root,
            next: 0,
        });

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let prereqs = &self.incoming[node];
            if frame.next < prereqs.len() {
                let prereq = prereqs[frame.next];
                frame.next += 1;
                match marks[prereq] {
                    Mark::Unvisited => {
                        marks[prereq] = Mark::InProgress;
                        stack.push(Frame {
                            node: prereq,
                            next: 0,
                        });
                    }
                    // an in-progress node reached again means we walked a loop:
                    Mark::InProgress => {
                        return Err(Error::CircularDependency(self.name(prereq).to_owned()));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                order.push(self.name(node).to_owned());
                stack.pop();
            }
        }

        log::trace!("resolved order for '{target}': {order:?}");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;
    use crate::Graph;
    use task::{Dependency, Task};

    fn task(name: &str, deps: &[&str]) -> Task<()> {
        let mut task = Task::new(name);
        for dep in deps {
            task.add_dependency(Dependency::required(*dep));
        }
        task
    }

    fn order(tasks: &[Task<()>], target: &str) -> Vec<String> {
        Graph::build(tasks).unwrap().traverse(target).unwrap()
    }

    #[test]
    fn dependencies_precede_dependents() {
        // diamond: d -> (b, c) -> a
        let tasks = vec![
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["a"]),
            task("d", &["b", "c"]),
        ];
        let order = order(&tasks, "d");
        assert_eq!(order, ["a", "b", "c", "d"]);

        // every edge in the resolved order points forward:
        let graph = Graph::build(&tasks).unwrap();
        let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
        for edge in graph.edges() {
            assert!(pos(graph.name(edge.from)) < pos(graph.name(edge.to)));
        }
    }

    #[test]
    fn ties_preserve_registration_order() {
        let tasks = vec![
            task("z", &[]),
            task("m", &[]),
            task("a", &[]),
            task("all", &["z", "m", "a"]),
        ];
        // independent prerequisites come out in declaration order, not name order:
        assert_eq!(order(&tasks, "all"), ["z", "m", "a", "all"]);
    }

    #[test]
    fn duplicates_removed_by_first_occurrence() {
        let tasks = vec![
            task("base", &[]),
            task("left", &["base"]),
            task("right", &["base"]),
            task("top", &["left", "right"]),
        ];
        let order = order(&tasks, "top");
        assert_eq!(
            order.iter().filter(|n| *n == "base").count(),
            1,
            "shared dependency appears once"
        );
        assert_eq!(order[0], "base");
    }

    #[test]
    fn only_reachable_tasks_are_included() {
        let tasks = vec![task("a", &[]), task("b", &["a"]), task("unrelated", &[])];
        assert_eq!(order(&tasks, "b"), ["a", "b"]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let tasks = vec![
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["a", "b"]),
            task("d", &["c", "b"]),
        ];
        let graph = Graph::build(&tasks).unwrap();
        let first = graph.traverse("d").unwrap();
        let second = graph.traverse("d").unwrap();
        assert_eq!(first, second);

        // and a rebuilt graph resolves identically:
        let rebuilt = Graph::build(&tasks).unwrap().traverse("d").unwrap();
        assert_eq!(first, rebuilt);
    }

    #[test]
    fn two_task_cycle_is_detected() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"])];
        let e = Graph::build(&tasks).unwrap().traverse("a").unwrap_err();
        assert!(matches!(e, Error::CircularDependency(_)));
    }

    #[test]
    fn indirect_cycle_through_dependee_is_detected() {
        // cycle c -> a -> b -> c, where the a -> b edge only exists because
        // of a's reverse declaration:
        let mut a = task("a", &["c"]);
        a.add_dependee(Dependency::required("b"));
        let tasks = vec![a, task("b", &[]), task("c", &["b"])];
        let e = Graph::build(&tasks).unwrap().traverse("b").unwrap_err();
        assert!(matches!(e, Error::CircularDependency(_)));
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut tasks = vec![task("t0", &[])];
        for i in 1..5000 {
            tasks.push(task(&format!("t{i}"), &[&format!("t{}", i - 1)]));
        }
        let order = order(&tasks, "t4999");
        assert_eq!(order.len(), 5000);
        assert_eq!(order[0], "t0");
        assert_eq!(order[4999], "t4999");
    }

    #[test]
    fn unknown_target_is_an_error() {
        let tasks = vec![task("a", &[])];
        let e = Graph::build(&tasks).unwrap().traverse("ghost").unwrap_err();
        assert!(matches!(e, Error::TargetNotFound(name) if name == "ghost"));
    }

    #[test]
    fn target_name_lookup_ignores_case() {
        let tasks = vec![task("Clean", &[]), task("Build", &["Clean"])];
        assert_eq!(order(&tasks, "build"), ["Clean", "Build"]);
    }
}
