//! Console implementation of the [`Host`] collaborators

use std::io::Write;
use std::path::{Path, PathBuf};

use inquire::{InquireError, Select};
use log::{debug, warn};

use crate::host::Host;
use crate::pty::command::ShellCommand;
use crate::pty::messages::render_error;
use crate::pty::{PtySession, TerminalError, TerminalSize};

const PICK_PROMPT: &str = "Task to run";

/// Show a selection list of task names on the console.
///
/// Returns `None` if there is nothing to pick or the user cancelled.
#[must_use]
pub fn pick_task(names: &[String]) -> Option<String> {
    if names.is_empty() {
        eprintln!("No tasks configured");
        return None;
    }
    match Select::new(PICK_PROMPT, names.to_vec()).prompt() {
        Ok(name) => Some(name),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            debug!("Task selection cancelled");
            None
        }
        Err(e) => {
            warn!("Task selection failed: {e}");
            None
        }
    }
}

/// Host that talks to the user through the console and runs sessions in PTYs
#[derive(Debug, Clone)]
pub struct ConsoleHost {
    cwd: PathBuf,
}

impl ConsoleHost {
    /// Sessions are started in `cwd`, normally the workspace root.
    #[must_use]
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
        }
    }
}

impl Host for ConsoleHost {
    type Session = PtySession;

    fn show_error(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{} Error: {message}", render_error());
    }

    fn pick(&self, options: &[String]) -> Option<String> {
        pick_task(options)
    }

    fn create_terminal(
        &self,
        name: &str,
        shell: Option<&str>,
        shell_args: &[String],
    ) -> Result<PtySession, TerminalError> {
        let shell = ShellCommand::new(shell, shell_args, &self.cwd);
        PtySession::open(name, &shell, TerminalSize::from_console())
    }
}
