//! CLI execution and command dispatch logic.
//!
//! This module keeps [`main`] minimal by providing a single entry point that
//! loads the manifest, builds the task graph, and walks the schedule for the
//! requested targets, running each stale task's recipe through the host
//! shell.

use crate::cli::Cli;
use crate::graph::{Task, TaskGraph};
use crate::interp::{self, InterpError};
use crate::manifest;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::io;
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::{debug, info};

mod stale;

/// Errors raised during task execution.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A recipe command returned a non-zero exit status. The run aborts
    /// immediately; no recovery, no retries.
    #[error("recipe for '{target}' failed with {status}: {command}")]
    CommandFailure {
        /// Name of the task whose recipe failed.
        target: String,
        /// The command line that failed.
        command: String,
        /// Exit status reported by the shell.
        status: ExitStatus,
    },

    /// The shell itself could not be spawned.
    #[error("failed to spawn shell for '{target}'")]
    Spawn {
        /// Name of the task being executed.
        target: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A prerequisite glob pattern is malformed.
    #[error("invalid glob pattern '{pattern}'")]
    InvalidPattern {
        /// The pattern as written in the manifest.
        pattern: String,
        /// Underlying pattern error.
        #[source]
        source: glob::PatternError,
    },

    /// A glob match could not be read.
    #[error("failed to expand glob '{pattern}'")]
    Glob {
        /// The pattern being expanded.
        pattern: String,
        /// Underlying filesystem error.
        #[source]
        source: glob::GlobError,
    },

    /// A recipe line failed interpolation.
    #[error(transparent)]
    Interp(#[from] InterpError),
}

/// Execute the parsed [`Cli`] request.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, the graph is invalid,
/// a requested target is unknown, or a recipe command fails.
pub fn run(cli: &Cli) -> Result<()> {
    let root = cli
        .directory
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from("."));
    let manifest_path = root.join(&cli.file);
    let manifest = manifest::from_path(&manifest_path)
        .with_context(|| format!("loading manifest at {manifest_path}"))?;
    let graph = TaskGraph::from_manifest(&manifest).context("building task graph")?;

    if cli.list {
        for name in graph.tasks.keys() {
            println!("{name}");
        }
        return Ok(());
    }

    let requested = requested_targets(cli, &graph)?;
    let schedule = graph.schedule(&requested)?;
    debug!(
        order = ?schedule.iter().map(|task| task.name.as_str()).collect::<Vec<_>>(),
        "resolved schedule"
    );

    // Names of tasks whose recipe ran this invocation; dependents of a task
    // that ran are stale regardless of timestamps.
    let mut ran: HashSet<String> = HashSet::new();
    for task in schedule {
        let status = stale::assess(&root, task, &ran)?;
        if !status.stale {
            info!(task = %task.name, "up to date");
            continue;
        }
        execute(&root, task, &status.inputs, cli.dry_run)?;
        ran.insert(task.name.clone());
    }
    Ok(())
}

fn requested_targets(cli: &Cli, graph: &TaskGraph) -> Result<Vec<String>> {
    if !cli.targets.is_empty() {
        return Ok(cli.targets.clone());
    }
    graph
        .default_target
        .clone()
        .map(|name| vec![name])
        .context("manifest declares no targets")
}

/// Run a task's recipe, one line at a time, echoing each command before it
/// executes. Child stdio is inherited so output surfaces unmodified.
fn execute(
    root: &Utf8Path,
    task: &Task,
    inputs: &[Utf8PathBuf],
    dry_run: bool,
) -> Result<(), RunnerError> {
    for line in &task.recipe {
        let command = interp::interpolate(line, inputs, &task.name)?;
        println!("{command}");
        if dry_run {
            continue;
        }
        debug!(task = %task.name, %command, "spawning shell");
        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(root.as_std_path())
            .status()
            .map_err(|source| RunnerError::Spawn {
                target: task.name.clone(),
                source,
            })?;
        if !status.success() {
            return Err(RunnerError::CommandFailure {
                target: task.name.clone(),
                command,
                status,
            });
        }
    }
    Ok(())
}
