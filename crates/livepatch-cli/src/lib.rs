//! # livepatch CLI
//!
//! Inspection tool over the update pipeline. Every command prints JSON (or
//! TOML for `config show`) on stdout; logs go to stderr.

pub mod cli;
pub mod commands;
pub mod logging;
