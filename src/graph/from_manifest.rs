//! Manifest-to-graph conversion helpers.

use std::collections::HashSet;

use camino::Utf8PathBuf;
use indexmap::IndexMap;

use crate::ast::{Recipe, StringOrList, Target, TaskManifest};

use super::{GraphError, Prereq, Task, TaskGraph, cycle};

impl TaskGraph {
    /// Transform a manifest into a [`TaskGraph`].
    ///
    /// Target names must be unique and the prerequisite edges acyclic. The
    /// default target is the first entry of `defaults` when given, otherwise
    /// the first declared target.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] on duplicate target names, circular
    /// dependencies, or a `defaults` entry naming an undeclared target.
    pub fn from_manifest(manifest: &TaskManifest) -> Result<Self, GraphError> {
        let declared: HashSet<&str> = manifest
            .targets
            .iter()
            .map(|target| target.name.as_str())
            .collect();

        let mut tasks = IndexMap::with_capacity(manifest.targets.len());
        for target in &manifest.targets {
            let task = to_task(target, &declared);
            if tasks.insert(target.name.clone(), task).is_some() {
                return Err(GraphError::DuplicateTarget {
                    name: target.name.clone(),
                });
            }
        }

        for name in &manifest.defaults {
            if !tasks.contains_key(name) {
                return Err(GraphError::UnknownTarget { name: name.clone() });
            }
        }
        let default_target = manifest
            .defaults
            .first()
            .cloned()
            .or_else(|| tasks.keys().next().cloned());

        if let Some(cycle) = cycle::find_cycle(&tasks) {
            return Err(GraphError::CircularDependency { cycle });
        }

        Ok(Self {
            tasks,
            default_target,
        })
    }
}

fn to_task(target: &Target, declared: &HashSet<&str>) -> Task {
    Task {
        name: target.name.clone(),
        prereqs: map_string_or_list(&target.deps, |dep| classify(dep, declared)),
        recipe: recipe_lines(&target.recipe),
        phony: target.phony,
    }
}

/// Classify a dependency string. A name declared as a target wins; make
/// shares one namespace between targets and files, and so does this graph.
fn classify(dep: &str, declared: &HashSet<&str>) -> Prereq {
    if declared.contains(dep) {
        Prereq::Task(dep.to_owned())
    } else if dep.contains(['*', '?', '[']) {
        Prereq::Pattern(dep.to_owned())
    } else {
        Prereq::File(Utf8PathBuf::from(dep))
    }
}

fn recipe_lines(recipe: &Recipe) -> Vec<String> {
    match recipe {
        Recipe::None => Vec::new(),
        Recipe::Command { command } => vec![command.clone()],
        // Trailing whitespace is noise, but leading whitespace can be part
        // of the command (a heredoc body, say), so only the end is trimmed.
        Recipe::Script { script } => script
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim_start().is_empty())
            .map(str::to_owned)
            .collect(),
    }
}

fn map_string_or_list<T, F>(sol: &StringOrList, f: F) -> Vec<T>
where
    F: Fn(&str) -> T,
{
    match sol {
        StringOrList::Empty => Vec::new(),
        StringOrList::String(s) => vec![f(s)],
        StringOrList::List(v) => v.iter().map(|s| f(s)).collect(),
    }
}
