//! Cycle detection utilities for the task graph.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{Prereq, Task};

/// Tracks the visitation state of a node during cycle detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

pub(crate) fn find_cycle(tasks: &IndexMap<String, Task>) -> Option<Vec<String>> {
    let mut detector = CycleDetector::new(tasks);
    for node in tasks.keys() {
        if detector.is_visited(node) {
            continue;
        }
        if let Some(found) = detector.visit(node.clone()) {
            return Some(found);
        }
    }
    None
}

struct CycleDetector<'a> {
    tasks: &'a IndexMap<String, Task>,
    stack: Vec<String>,
    states: HashMap<String, VisitState>,
}

impl<'a> CycleDetector<'a> {
    fn new(tasks: &'a IndexMap<String, Task>) -> Self {
        Self {
            tasks,
            stack: Vec::new(),
            states: HashMap::new(),
        }
    }

    fn is_visited(&self, node: &str) -> bool {
        matches!(self.states.get(node), Some(VisitState::Visited))
    }

    fn visit(&mut self, node: String) -> Option<Vec<String>> {
        match self.states.get(&node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self
                    .stack
                    .iter()
                    .position(|n| n == &node)
                    .unwrap_or_else(|| {
                        debug_assert!(false, "visiting node must be on the stack");
                        0
                    });
                let mut cycle: Vec<String> = self.stack.iter().skip(idx).cloned().collect();
                cycle.push(node);
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(node.clone(), VisitState::Visiting);
            }
        }

        self.stack.push(node.clone());

        if let Some(task) = self.tasks.get(&node) {
            for prereq in &task.prereqs {
                // File and pattern prerequisites cannot close a cycle.
                let Prereq::Task(dep) = prereq else {
                    continue;
                };
                if let Some(cycle) = self.visit(dep.clone()) {
                    return Some(cycle);
                }
            }
        }

        self.stack.pop();
        self.states.insert(node, VisitState::Visited);
        None
    }
}

/// Rotate the cycle so it starts at its smallest node, giving stable error
/// messages regardless of traversal order.
fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        slot.clone_from(&first);
    }
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str, deps: &[&str]) -> Task {
        Task {
            name: name.to_owned(),
            prereqs: deps
                .iter()
                .map(|dep| Prereq::Task((*dep).to_owned()))
                .collect(),
            recipe: Vec::new(),
            phony: false,
        }
    }

    fn graph_of(entries: &[(&str, &[&str])]) -> IndexMap<String, Task> {
        entries
            .iter()
            .map(|(name, deps)| ((*name).to_owned(), task(name, deps)))
            .collect()
    }

    #[test]
    fn detects_self_edge_cycle() {
        let tasks = graph_of(&[("a", &["a"])]);
        let cycle = find_cycle(&tasks).expect("cycle");
        assert_eq!(cycle, vec!["a".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn detects_two_node_cycle() {
        let tasks = graph_of(&[("a", &["b"]), ("b", &["a"])]);
        let cycle = find_cycle(&tasks).expect("cycle");
        assert_eq!(cycle, vec!["a".to_owned(), "b".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn acyclic_graph_reports_no_cycle() {
        let tasks = graph_of(&[("a", &["b"]), ("b", &[]), ("c", &["a", "b"])]);
        assert!(find_cycle(&tasks).is_none());
    }

    #[test]
    fn file_prereqs_do_not_form_cycles() {
        let mut tasks = graph_of(&[("a", &[])]);
        if let Some(entry) = tasks.get_mut("a") {
            entry.prereqs = vec![Prereq::File("a".into())];
        }
        assert!(find_cycle(&tasks).is_none());
    }

    #[test]
    fn canonicalize_cycle_rotates_smallest_node() {
        let cycle: Vec<String> = ["c", "a", "b", "c"].iter().map(|s| (*s).to_owned()).collect();
        let canonical = canonicalize_cycle(cycle);
        let expected: Vec<String> = ["a", "b", "c", "a"].iter().map(|s| (*s).to_owned()).collect();
        assert_eq!(canonical, expected);
    }

    #[test]
    fn canonicalize_cycle_handles_reverse_direction() {
        let cycle: Vec<String> = ["c", "b", "a", "c"].iter().map(|s| (*s).to_owned()).collect();
        let canonical = canonicalize_cycle(cycle);
        let expected: Vec<String> = ["a", "c", "b", "a"].iter().map(|s| (*s).to_owned()).collect();
        assert_eq!(canonical, expected);
    }
}
