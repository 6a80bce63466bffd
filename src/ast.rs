//! Tsukuru manifest Abstract Syntax Tree structures.
//!
//! This module defines the data structures used to represent a parsed
//! `Tsukurufile`. They mirror the YAML schema and are deserialised with
//! `serde_yml`.
//!
//! The following example shows how to parse a minimal manifest string:
//!
//! ```rust
//! use tsukuru::ast::TaskManifest;
//!
//! let yaml = "version: \"1.0.0\"\ntargets:\n  - name: hello\n    command: echo hi";
//! let manifest: TaskManifest = serde_yml::from_str(yaml).expect("parse");
//! assert_eq!(manifest.targets[0].name, "hello");
//! ```

use semver::Version;
use serde::{Deserialize, de::Deserializer};

/// Top-level manifest structure parsed from a `Tsukurufile`.
///
/// Each field mirrors a key in the YAML manifest. Optional collections default
/// to empty to simplify deserialisation.
///
/// ```yaml
/// version: "1.0.0"
/// targets:
///   - name: hello
///     command: echo hi
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskManifest {
    /// Semantic version of the manifest format.
    pub version: Version,

    /// Declared targets, in declaration order. The first target is the
    /// default unless `defaults` says otherwise.
    pub targets: Vec<Target>,

    /// Names of targets run when no command line target is supplied.
    #[serde(default)]
    pub defaults: Vec<String>,
}

/// A single declared target.
///
/// Targets name a unit of work, its prerequisites, and the recipe that
/// produces it. `phony` targets are always considered out of date.
// `deny_unknown_fields` cannot be combined with the flattened recipe, so
// the recipe's deserialiser rejects leftover keys itself.
#[derive(Debug, Deserialize)]
pub struct Target {
    /// Unique name of the target; for file-backed targets this is also the
    /// output path checked for staleness.
    pub name: String,

    /// Prerequisites: other target names, file paths, or glob patterns.
    #[serde(default)]
    pub deps: StringOrList,

    /// How the target is brought up to date.
    #[serde(flatten)]
    pub recipe: Recipe,

    /// Declares that the target does not correspond to a real file.
    #[serde(default)]
    pub phony: bool,
}

/// Execution style for a target.
///
/// At most one of `command` and `script` may be provided. The fields are
/// flattened in the manifest, so the presence of either key determines the
/// variant; a target with neither is an aggregate with no recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Recipe {
    /// No recipe; the target only aggregates its prerequisites.
    #[default]
    None,
    /// A single shell command.
    Command {
        /// The command line, run through `sh -c`.
        command: String,
    },
    /// A multi-line block run one shell line at a time.
    Script {
        /// The script block; blank lines are skipped.
        script: String,
    },
}

impl<'de> Deserialize<'de> for Recipe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawRecipe {
            command: Option<String>,
            script: Option<String>,
            /// Keys the enclosing target did not consume; any entry here is a
            /// typo or an unsupported field.
            #[serde(flatten)]
            extra: std::collections::HashMap<String, serde_yml::Value>,
        }

        let raw = RawRecipe::deserialize(deserializer)?;
        if !raw.extra.is_empty() {
            let mut unknown: Vec<&str> = raw.extra.keys().map(String::as_str).collect();
            unknown.sort_unstable();
            return Err(serde::de::Error::custom(format!(
                "unknown target fields: {}",
                unknown.join(", ")
            )));
        }
        match (raw.command, raw.script) {
            (Some(command), None) => Ok(Self::Command { command }),
            (None, Some(script)) => Ok(Self::Script { script }),
            (None, None) => Ok(Self::None),
            (Some(_), Some(_)) => Err(serde::de::Error::custom(
                "fields command and script are mutually exclusive",
            )),
        }
    }
}

/// A helper for fields that accept either a single string or a list of
/// strings.
///
/// It mirrors YAML syntax where a scalar or sequence is allowed. Empty values
/// deserialize to `StringOrList::Empty`.
///
/// ```yaml
/// # Scalar
/// deps: hello
/// # Sequence
/// deps:
///   - hello
///   - world
/// ```
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrList {
    /// No value provided.
    #[default]
    Empty,
    /// A single string item.
    String(String),
    /// A list of string items.
    List(Vec<String>),
}
