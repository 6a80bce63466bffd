//! Command line interface definition using clap.
//!
//! The surface is deliberately small: targets are data in the manifest, not
//! subcommands, so the only positional arguments are target names.

use camino::Utf8PathBuf;
use clap::Parser;

/// A small make-style task runner driven by a YAML `Tsukurufile`.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the manifest file to use, relative to the working directory.
    #[arg(short, long, value_name = "FILE", default_value = "Tsukurufile")]
    pub file: Utf8PathBuf,

    /// Run as if started in this directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<Utf8PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the commands that would run without executing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// List the declared targets and exit.
    #[arg(long)]
    pub list: bool,

    /// Targets to run; defaults to the manifest's first declared target.
    pub targets: Vec<String>,
}
