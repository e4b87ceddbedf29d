//! Core implementation of itt, the integrated terminal task runner
//!
//! Tasks are declared in a JSON file in the workspace's `.vscode` directory. Each task
//! names a command, its arguments and optionally a shell, with per-platform overrides
//! for any of them. itt lets the user pick a task and runs it in a new terminal
//! session, reloading the task file and the `integratedTerminalTasks` settings when
//! they change.

pub mod config_file;
pub mod console;
pub mod host;
pub mod logger;
pub mod platform;
pub mod pty;
pub mod tasks;
pub mod watch;
pub mod workspace;

pub use workspace::{Workspace, WorkspaceOptions};
