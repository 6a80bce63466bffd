//! Staleness assessment.
//!
//! A task's recipe runs iff the task is phony, no file named after the task
//! exists, a prerequisite task ran earlier in this invocation, or some
//! resolved file prerequisite is newer than the task's file. A declared file
//! prerequisite that does not exist contributes nothing to the comparison;
//! missing prerequisite files are not an error by themselves.

use std::collections::HashSet;
use std::fs;
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};

use crate::graph::{Prereq, Task};

use super::RunnerError;

/// The staleness verdict together with the resolved file prerequisites, in
/// prerequisite order with glob matches sorted.
pub(crate) struct Staleness {
    pub(crate) stale: bool,
    pub(crate) inputs: Vec<Utf8PathBuf>,
}

/// Assess `task` against the filesystem under `root` and the set of task
/// names that already `ran` this invocation.
pub(crate) fn assess(
    root: &Utf8Path,
    task: &Task,
    ran: &HashSet<String>,
) -> Result<Staleness, RunnerError> {
    let mut inputs = Vec::new();
    let mut upstream_ran = false;
    for prereq in &task.prereqs {
        match prereq {
            Prereq::Task(name) => {
                if ran.contains(name) {
                    upstream_ran = true;
                }
            }
            Prereq::File(path) => inputs.push(path.clone()),
            Prereq::Pattern(pattern) => inputs.extend(expand_pattern(root, pattern)?),
        }
    }
    let stale = task.phony || upstream_ran || out_of_date(root, &task.name, &inputs);
    Ok(Staleness { stale, inputs })
}

/// Expand a glob pattern relative to `root`, keeping only regular files.
/// Matches come back sorted; a pattern that matches nothing is an empty list.
fn expand_pattern(root: &Utf8Path, pattern: &str) -> Result<Vec<Utf8PathBuf>, RunnerError> {
    let full = root.join(pattern);
    let entries = glob::glob(full.as_str()).map_err(|source| RunnerError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })?;
    let mut matches = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| RunnerError::Glob {
            pattern: pattern.to_owned(),
            source,
        })?;
        if !path.is_file() {
            continue;
        }
        // Recipes receive these as shell arguments; non-UTF-8 names cannot
        // appear in a manifest and are skipped.
        let Ok(utf) = Utf8PathBuf::from_path_buf(path) else {
            continue;
        };
        let rel = utf
            .strip_prefix(root)
            .map_or_else(|_| utf.clone(), Utf8Path::to_path_buf);
        matches.push(rel);
    }
    matches.sort();
    Ok(matches)
}

fn out_of_date(root: &Utf8Path, name: &str, inputs: &[Utf8PathBuf]) -> bool {
    let Some(out_mtime) = mtime(&root.join(name)) else {
        return true;
    };
    inputs
        .iter()
        .any(|input| mtime(&root.join(input)).is_some_and(|stamp| stamp > out_mtime))
}

fn mtime(path: &Utf8Path) -> Option<SystemTime> {
    fs::metadata(path.as_std_path())
        .and_then(|meta| meta.modified())
        .ok()
}
