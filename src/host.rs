//! Collaborators the workspace relies on
//!
//! The [`Host`] reads documents, reports errors, offers a selection list and
//! creates [`TerminalSession`]s. The console implementation is
//! [`crate::console::ConsoleHost`]; tests drive the workspace with recording hosts.

use std::io;
use std::path::Path;

use crate::pty::TerminalError;

/// A terminal session created for one task run
pub trait TerminalSession {
    /// Make the session visible. With `preserve_focus` the keyboard stays where it is.
    fn show(&mut self, preserve_focus: bool);

    /// Submit `text` to the session's shell, followed by Enter if `execute` is set.
    ///
    /// # Errors
    ///
    /// Returns `TerminalError` if the session no longer accepts input.
    fn send_text(&mut self, text: &str, execute: bool) -> Result<(), TerminalError>;
}

pub trait Host {
    type Session: TerminalSession;

    /// Read the text of the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the document cannot be read.
    fn read_document(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Show an error message to the user.
    fn show_error(&self, message: &str);

    /// Let the user pick one of `options`; `None` if the selection was cancelled.
    fn pick(&self, options: &[String]) -> Option<String>;

    /// Create a terminal session running `shell` (the user's shell if `None`).
    ///
    /// # Errors
    ///
    /// Returns `TerminalError` if the session cannot be started.
    fn create_terminal(
        &self,
        name: &str,
        shell: Option<&str>,
        shell_args: &[String],
    ) -> Result<Self::Session, TerminalError>;
}
