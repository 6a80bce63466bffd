//! Tsukuru core library.
//!
//! This library provides the manifest data model, the task graph, and the
//! execution engine for a small make-style task runner driven by a YAML
//! `Tsukurufile`.

pub mod ast;
pub mod cli;
pub mod graph;
pub mod interp;
pub mod manifest;
pub mod runner;
