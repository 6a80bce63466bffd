//! Manifest loading helpers.
//!
//! Parses a `Tsukurufile` into the [`TaskManifest`] AST. The YAML is taken
//! as-is: no templating pass runs over it, and glob patterns in `deps` are
//! kept verbatim for the runner to expand against the working directory.

use crate::ast::TaskManifest;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use thiserror::Error;

/// Errors raised while parsing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The YAML did not match the manifest schema.
    #[error("failed to parse manifest")]
    Parse {
        /// Underlying YAML error with line and column information.
        #[source]
        source: serde_yml::Error,
    },
}

/// Parse a manifest string.
///
/// # Errors
///
/// Returns an error if the YAML fails to parse or violates the schema.
pub fn from_str(yaml: &str) -> Result<TaskManifest> {
    let manifest = serde_yml::from_str(yaml).map_err(|source| ManifestError::Parse { source })?;
    Ok(manifest)
}

/// Load a [`TaskManifest`] from the given file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the YAML fails to parse.
pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<TaskManifest> {
    let path_ref = path.as_ref();
    let data =
        fs::read_to_string(path_ref).with_context(|| format!("failed to read {path_ref}"))?;
    from_str(&data)
}
