//! The task graph.
//!
//! This module defines the immutable dependency graph built once per
//! invocation from a [`TaskManifest`](crate::ast::TaskManifest). Tasks are
//! keyed by name in declaration order; prerequisites are classified as
//! references to other tasks, plain file paths, or glob patterns. The graph
//! is validated for duplicate names and cycles at construction and discarded
//! when the run ends.
//!
//! # Examples
//!
//! ```
//! use tsukuru::{graph::TaskGraph, manifest};
//!
//! let yaml = "version: \"1.0.0\"\ntargets:\n  - name: hello\n    command: echo hi";
//! let manifest = manifest::from_str(yaml).expect("parse");
//! let graph = TaskGraph::from_manifest(&manifest).expect("graph");
//! assert_eq!(graph.default_target.as_deref(), Some("hello"));
//! ```

mod cycle;
mod from_manifest;

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building or querying the task graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two targets share a name.
    #[error("duplicate target '{name}'")]
    DuplicateTarget {
        /// The offending target name.
        name: String,
    },

    /// The prerequisite edges form a cycle.
    #[error("circular dependency: {}", .cycle.join(" -> "))]
    CircularDependency {
        /// The cycle, starting and ending at its smallest node.
        cycle: Vec<String>,
    },

    /// A requested or default target is not declared in the manifest.
    #[error("unknown target '{name}'")]
    UnknownTarget {
        /// The name that failed to resolve.
        name: String,
    },
}

/// A prerequisite of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prereq {
    /// Another declared task, run before this one.
    Task(String),
    /// A file path whose modification time feeds the staleness check.
    File(Utf8PathBuf),
    /// A glob pattern expanded against the working directory at run time.
    /// Patterns that match nothing yield an empty list; that is not an error.
    Pattern(String),
}

/// A single resolved task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Target name; doubles as the output path for file-backed tasks.
    pub name: String,
    /// Classified prerequisites, in declaration order.
    pub prereqs: Vec<Prereq>,
    /// Shell command lines, run in order through `sh -c`.
    pub recipe: Vec<String>,
    /// Phony tasks are always out of date.
    pub phony: bool,
}

/// The validated dependency graph for one invocation.
#[derive(Debug, Default)]
pub struct TaskGraph {
    /// Tasks keyed by name, preserving declaration order.
    pub tasks: IndexMap<String, Task>,
    /// Target selected when the command line names none.
    pub default_target: Option<String>,
}

impl TaskGraph {
    /// Determine the ordered set of tasks to consider for the requested
    /// target names: a depth-first post-order, so every task appears after
    /// its prerequisites and at most once.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownTarget`] when a requested name is not
    /// declared in the manifest.
    pub fn schedule(&self, requested: &[String]) -> Result<Vec<&Task>, GraphError> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for name in requested {
            self.visit(name, &mut seen, &mut order)?;
        }
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &str,
        seen: &mut HashSet<&'a str>,
        order: &mut Vec<&'a Task>,
    ) -> Result<(), GraphError> {
        let Some((key, task)) = self.tasks.get_key_value(name) else {
            return Err(GraphError::UnknownTarget {
                name: name.to_owned(),
            });
        };
        if !seen.insert(key.as_str()) {
            return Ok(());
        }
        for prereq in &task.prereqs {
            if let Prereq::Task(dep) = prereq {
                self.visit(dep, seen, order)?;
            }
        }
        order.push(task);
        Ok(())
    }
}
