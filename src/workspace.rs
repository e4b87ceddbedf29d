//! The workspace context
//!
//! [`Workspace`] owns everything that lives for the duration of a session: the
//! settings, the resolved shell defaults, the task registry and the file watchers.
//! All of it is replaced through [`Workspace::configure`] and [`Workspace::reload`];
//! nothing is updated piecemeal.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::config_file::{ConfigError, SETTINGS_FILE_NAME, Settings, WORKSPACE_CONFIG_DIR};
use crate::host::{Host, TerminalSession};
use crate::platform::Platform;
use crate::tasks::registry::{self, TaskRegistry};
use crate::tasks::resolve::{ResolvedTask, ShellDefaults};
use crate::watch::{WatchHandle, WorkspaceEvent, watch_file};

/// How to set up a [`Workspace`]
#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    pub root: PathBuf,
    /// Settings file; `.vscode/settings.json` in the root when not given
    pub settings_file: Option<PathBuf>,
    /// Overrides the `taskFileName` setting
    pub task_file_name: Option<String>,
    pub platform: Platform,
}

impl WorkspaceOptions {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            settings_file: None,
            task_file_name: None,
            platform: Platform::current(),
        }
    }
}

pub struct Workspace<H: Host> {
    host: H,
    options: WorkspaceOptions,
    settings: Settings,
    defaults: ShellDefaults,
    registry: TaskRegistry,
    events: Option<mpsc::Sender<WorkspaceEvent>>,
    task_watcher: Option<WatchHandle>,
    settings_watcher: Option<WatchHandle>,
}

impl<H: Host> Workspace<H> {
    /// Create the workspace and load its settings and tasks.
    pub fn init(host: H, options: WorkspaceOptions) -> Self {
        let mut workspace = Self {
            host,
            options,
            settings: Settings::default(),
            defaults: ShellDefaults::default(),
            registry: TaskRegistry::default(),
            events: None,
            task_watcher: None,
            settings_watcher: None,
        };
        workspace.configure();
        workspace
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.options.root
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.options.platform
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn shell_defaults(&self) -> &ShellDefaults {
        &self.defaults
    }

    #[must_use]
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.options.settings_file.clone().unwrap_or_else(|| {
            self.options
                .root
                .join(WORKSPACE_CONFIG_DIR)
                .join(SETTINGS_FILE_NAME)
        })
    }

    #[must_use]
    pub fn task_file(&self) -> PathBuf {
        let name = self
            .options
            .task_file_name
            .as_deref()
            .unwrap_or_else(|| self.settings.task_file_name());
        self.options.root.join(WORKSPACE_CONFIG_DIR).join(name)
    }

    fn load_settings(&self) -> Result<Settings, ConfigError> {
        let path = self.settings_path();
        match self.host.read_document(&path) {
            Ok(contents) => Settings::parse(&path, &contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound && self.options.settings_file.is_none() => {
                debug!("No settings file at {}, using defaults", path.display());
                Ok(Settings::default())
            }
            Err(e) => Err(ConfigError::Read { source: e, path }),
        }
    }

    /// Reload settings, re-resolve the shell defaults and reload the tasks.
    ///
    /// Settings that fail to load are reported and replaced by the defaults.
    pub fn configure(&mut self) {
        self.settings = self.load_settings().unwrap_or_else(|e| {
            self.host.show_error(&e.to_string());
            Settings::default()
        });
        self.defaults = ShellDefaults::resolve(&self.settings.default_shell, self.options.platform);
        self.reload();

        if let Some(sender) = self.events.clone() {
            self.task_watcher = None;
            self.task_watcher = self.start_watcher(
                &self.task_file(),
                WorkspaceEvent::TaskFileChanged,
                sender,
            );
        }
    }

    /// Replace the registry with the current contents of the task file.
    ///
    /// On failure the registry is emptied and the error is shown.
    pub fn reload(&mut self) {
        let path = self.task_file();
        self.registry = match registry::load_with(&path, |p| self.host.read_document(p)) {
            Ok(registry) => {
                info!("Loaded {} tasks from {}", registry.len(), path.display());
                registry
            }
            Err(e) => {
                self.host.show_error(&e.to_string());
                TaskRegistry::default()
            }
        };
    }

    fn start_watcher(
        &self,
        path: &Path,
        event: WorkspaceEvent,
        sender: mpsc::Sender<WorkspaceEvent>,
    ) -> Option<WatchHandle> {
        match watch_file(path, event, sender) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Watcher for {} not started: {e}", path.display());
                None
            }
        }
    }

    /// Watch the settings file and the task file, sending their changes to `sender`.
    pub fn watch(&mut self, sender: mpsc::Sender<WorkspaceEvent>) {
        self.settings_watcher = self.start_watcher(
            &self.settings_path(),
            WorkspaceEvent::SettingsChanged,
            sender.clone(),
        );
        self.task_watcher = self.start_watcher(
            &self.task_file(),
            WorkspaceEvent::TaskFileChanged,
            sender.clone(),
        );
        self.events = Some(sender);
    }

    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.events.is_some()
    }

    pub fn handle_event(&mut self, event: WorkspaceEvent) {
        match event {
            WorkspaceEvent::TaskFileChanged => {
                info!("Task file changed, reloading tasks");
                self.reload();
            }
            WorkspaceEvent::SettingsChanged => {
                info!("Settings changed, reconfiguring");
                self.configure();
            }
        }
    }

    /// Task names in file order.
    #[must_use]
    pub fn task_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ResolvedTask> {
        let definition = self.registry.get(name)?;
        Some(ResolvedTask::resolve(
            name,
            definition,
            &self.defaults,
            self.options.platform,
        ))
    }

    /// Every task, resolved for the workspace platform.
    #[must_use]
    pub fn resolve_all(&self) -> Vec<ResolvedTask> {
        self.registry
            .iter()
            .map(|(name, definition)| {
                ResolvedTask::resolve(name, definition, &self.defaults, self.options.platform)
            })
            .collect()
    }

    /// Run the task `name` in a new terminal session.
    ///
    /// A name that is not (or no longer) in the registry does nothing.
    pub fn run(&self, name: &str) -> Option<H::Session> {
        let Some(task) = self.resolve(name) else {
            debug!("Ignoring selection of unknown task '{name}'");
            return None;
        };
        if task.command.is_none() {
            warn!(
                "Task '{name}' has no command for {}",
                self.options.platform
            );
        }

        let mut session = match self.host.create_terminal(
            &task.terminal_name(),
            task.shell.as_deref(),
            &task.shell_args,
        ) {
            Ok(session) => session,
            Err(e) => {
                self.host
                    .show_error(&format!("Failed to start '{name}': {e}"));
                return None;
            }
        };

        session.show(!task.steal_focus);
        let command_line = task.command_line();
        debug!("Sending '{command_line}' to '{}'", task.terminal_name());
        if let Err(e) = session.send_text(&command_line, true) {
            self.host
                .show_error(&format!("Failed to send '{name}' to its terminal: {e}"));
        }
        Some(session)
    }

    /// Let the user pick a task and run it.
    pub fn pick(&self) -> Option<H::Session> {
        let selected = self.host.pick(&self.task_names())?;
        self.run(&selected)
    }

    /// Stop watching. The registry stays usable.
    pub fn dispose(&mut self) {
        let task_watcher = self.task_watcher.take();
        let settings_watcher = self.settings_watcher.take();
        if task_watcher.is_some() || settings_watcher.is_some() {
            info!("Stopped watching {}", self.options.root.display());
        }
        self.events = None;
    }
}
