use log::debug;
use serde::Serialize;

use super::definition::{ShellOptions, TaskDefinition};
use crate::platform::{Platform, Setting, resolve, resolve_bundle};

/// Prefix of every terminal session name
pub const TERMINAL_NAME_PREFIX: &str = "Integrated Terminal Task";

/// Shell used when a task does not configure its own
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShellDefaults {
    pub shell: Option<String>,
    pub args: Vec<String>,
}

impl ShellDefaults {
    /// Resolve the `defaultShell` setting for `platform`.
    #[must_use]
    pub fn resolve(options: &ShellOptions, platform: Platform) -> Self {
        let shell = resolve_bundle(&options.shell, platform).filter(Setting::is_set);
        let args = options
            .args
            .as_ref()
            .and_then(|args| resolve(args, platform))
            .unwrap_or_default();
        debug!("Default shell for {platform}: {shell:?} {args:?}");
        Self { shell, args }
    }
}

/// A task with all platform overrides and shell defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTask {
    pub name: String,
    /// `None` means the user's own shell
    pub shell: Option<String>,
    pub shell_args: Vec<String>,
    /// `None` when the task has no command for this platform
    pub command: Option<String>,
    pub args: Vec<String>,
    pub steal_focus: bool,
}

impl ResolvedTask {
    /// Resolve each field of `definition` on its own, so a task can combine a
    /// platform specific command with the default shell.
    #[must_use]
    pub fn resolve(
        name: &str,
        definition: &TaskDefinition,
        defaults: &ShellDefaults,
        platform: Platform,
    ) -> Self {
        let shell_options = definition.shell_options.as_ref();
        let shell = shell_options
            .and_then(|options| resolve_bundle(&options.shell, platform))
            .filter(Setting::is_set)
            .or_else(|| defaults.shell.clone());
        let shell_args = shell_options
            .and_then(|options| options.args.as_ref())
            .and_then(|args| resolve(args, platform))
            .filter(Setting::is_set)
            .unwrap_or_else(|| defaults.args.clone());

        let command = definition
            .cmd
            .as_ref()
            .and_then(|cmd| resolve(cmd, platform));
        let args = definition
            .args
            .as_ref()
            .and_then(|args| resolve(args, platform))
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            shell,
            shell_args,
            command,
            args,
            steal_focus: definition.steal_focus,
        }
    }

    /// Command and arguments joined by single spaces. A missing command is left
    /// out, so the line starts with the first argument and has no leading space.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.command
            .iter()
            .chain(self.args.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn terminal_name(&self) -> String {
        format!("{TERMINAL_NAME_PREFIX} - {}", self.name)
    }
}
