//! Task definitions, the task registry and per-platform task resolution
//!
//! A task file maps task names to [`definition::TaskDefinition`]s. The whole file
//! is parsed into a [`registry::TaskRegistry`], which is swapped out as a unit
//! whenever the file changes. When a task is run, [`resolve::ResolvedTask`] applies
//! the platform overrides and the configured shell defaults to produce the shell
//! and command line handed to a terminal session.

pub mod definition;
pub mod registry;
pub mod resolve;
