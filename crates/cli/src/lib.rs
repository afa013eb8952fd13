//! The `mavenkit` command-line front end.
//!
//! Parsing lives in [`cli`], command bodies in [`commands`], logging setup
//! in [`tracing`].

/// Argument parsing, error categories and exit codes.
pub mod cli;
/// Command implementations.
pub mod commands;
/// Tracing and logging configuration.
pub mod tracing;
