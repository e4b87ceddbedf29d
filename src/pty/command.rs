use std::path::{Path, PathBuf};

use log::debug;
use portable_pty::CommandBuilder;

/// Shell program, arguments and working directory of a terminal session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ShellCommand {
    /// Use `shell` if given, otherwise the user's shell.
    #[must_use]
    pub fn new(shell: Option<&str>, args: &[String], cwd: &Path) -> Self {
        Self {
            program: shell.map_or_else(user_shell, str::to_string),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        }
    }
}

/// The user's login shell: `$SHELL`, or `%COMSPEC%` on Windows.
#[must_use]
pub fn user_shell() -> String {
    let (variable, fallback) = if cfg!(target_os = "windows") {
        ("COMSPEC", "cmd.exe")
    } else {
        ("SHELL", "/bin/sh")
    };
    std::env::var(variable)
        .ok()
        .filter(|shell| !shell.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl From<&ShellCommand> for CommandBuilder {
    fn from(shell: &ShellCommand) -> Self {
        debug!(
            "Building shell '{}' {:?} in {}",
            shell.program,
            shell.args,
            shell.cwd.display()
        );
        let mut command_builder = CommandBuilder::new(&shell.program);
        command_builder.args(&shell.args);
        for (key, value) in std::env::vars() {
            command_builder.env(key, value);
        }
        command_builder.env("TERM", "xterm-256color");
        command_builder.cwd(shell.cwd.clone());
        command_builder
    }
}
