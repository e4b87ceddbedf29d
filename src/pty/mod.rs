//! Terminal sessions backed by a pseudo-terminal
//!
//! A [`session::PtySession`] runs a shell in a PTY, mirrors its output to the
//! console and either hands it the keyboard or closes its input once the task's
//! command line has been submitted.

pub mod command;
pub mod keys;
pub(crate) mod messages;
pub mod session;

pub use messages::{format_exit_message, format_start_message};
pub use session::{PtySession, TerminalError, TerminalSize};
