//! Settings handling for itt
//!
//! Settings live under the `integratedTerminalTasks` namespace of a settings file,
//! by default `.vscode/settings.json` in the workspace. The namespace can be written
//! as a nested object or as flat dotted keys, the way editors store them.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::tasks::definition::ShellOptions;

/// Namespace of all settings read by itt
pub const SETTINGS_NAMESPACE: &str = "integratedTerminalTasks";

/// Task file name used when `taskFileName` is not configured
pub const DEFAULT_TASK_FILE_NAME: &str = "terminal-tasks.json";

/// Directory inside the workspace holding the task and settings files
pub const WORKSPACE_CONFIG_DIR: &str = ".vscode";

/// Default settings file name inside [`WORKSPACE_CONFIG_DIR`]
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Errors that can occur while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read settings file {path}: {source}")]
    Read {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("Unable to parse YAML settings file {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("Unable to parse JSON settings file {path}: {source}")]
    Json {
        source: json5::Error,
        path: PathBuf,
    },
    #[error("Invalid `integratedTerminalTasks` settings in {path}: {source}")]
    Section {
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// The `integratedTerminalTasks` settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub default_shell: ShellOptions,
    #[serde(default = "default_task_file_name")]
    pub task_file_name: String,
}

fn default_task_file_name() -> String {
    DEFAULT_TASK_FILE_NAME.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_shell: ShellOptions::default(),
            task_file_name: default_task_file_name(),
        }
    }
}

impl Settings {
    /// Parse the contents of a settings file. Files ending in `.yaml`/`.yml` are
    /// read as YAML, anything else as JSON with comments and trailing commas allowed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Yaml`/`ConfigError::Json` if the file does not parse,
    /// or `ConfigError::Section` if the settings namespace has the wrong shape.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        let document: Value = if is_yaml {
            serde_yaml::from_str(contents).map_err(|e| ConfigError::Yaml {
                source: e,
                path: path.to_path_buf(),
            })?
        } else {
            json5::from_str(contents).map_err(|e| ConfigError::Json {
                source: e,
                path: path.to_path_buf(),
            })?
        };
        Self::from_document(document).map_err(|e| ConfigError::Section {
            source: e,
            path: path.to_path_buf(),
        })
    }

    /// Extract the settings namespace from a parsed settings document.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the namespace has the wrong shape.
    pub fn from_document(document: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(extract_section(document))
    }

    /// The configured task file name, or the default when it is empty.
    #[must_use]
    pub fn task_file_name(&self) -> &str {
        if self.task_file_name.trim().is_empty() {
            DEFAULT_TASK_FILE_NAME
        } else {
            &self.task_file_name
        }
    }
}

/// Collect the namespace from both its nested and its dotted-key form.
fn extract_section(document: Value) -> Value {
    let Value::Object(entries) = document else {
        return document;
    };
    let mut section = match entries.get(SETTINGS_NAMESPACE) {
        Some(Value::Object(nested)) => nested.clone(),
        _ => Map::new(),
    };
    let prefix = format!("{SETTINGS_NAMESPACE}.");
    for (key, value) in entries {
        if let Some(path) = key.strip_prefix(&prefix) {
            insert_dotted(&mut section, path, value);
        }
    }
    Value::Object(section)
}

fn insert_dotted(target: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            target.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_dotted(child, rest, value);
            }
        }
    }
}

/// Searches for the workspace root, the nearest directory containing `.vscode`,
/// starting at `start` and walking up its parents. Falls back to `start`.
#[must_use]
pub fn find_workspace_root(start: &Path) -> PathBuf {
    let mut path = start.to_path_buf();
    debug!("Searching for workspace root from {}", start.display());
    loop {
        if path.join(WORKSPACE_CONFIG_DIR).is_dir() {
            info!("Found workspace root: {}", path.display());
            return path;
        }
        if !path.pop() {
            debug!("No {WORKSPACE_CONFIG_DIR} directory found, using {}", start.display());
            return start.to_path_buf();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Platform, PlatformValue};
    use crate::tasks::resolve::ShellDefaults;

    #[test]
    fn test_nested_settings() {
        let settings = Settings::parse(
            Path::new("settings.json"),
            r#"{
                "editor.tabSize": 4,
                "integratedTerminalTasks": {
                    "defaultShell": {"default": "bash", "windows": "pwsh", "args": {"default": ["-l"]}},
                    "taskFileName": "my-tasks.json"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(settings.default_shell.shell.default.as_deref(), Some("bash"));
        assert_eq!(settings.default_shell.shell.windows.as_deref(), Some("pwsh"));
        assert_eq!(settings.task_file_name(), "my-tasks.json");
    }

    #[test]
    fn test_dotted_settings_match_nested() {
        let dotted = Settings::parse(
            Path::new("settings.json"),
            r#"{
                "integratedTerminalTasks.defaultShell.default": "bash",
                "integratedTerminalTasks.defaultShell.linux": "zsh",
                "integratedTerminalTasks.defaultShell.args.default": ["-l"],
                "integratedTerminalTasks.defaultShell.args.linux": ["-i"],
                "integratedTerminalTasks.taskFileName": "tasks.local.json"
            }"#,
        )
        .unwrap();
        let nested = Settings::parse(
            Path::new("settings.json"),
            r#"{
                "integratedTerminalTasks": {
                    "defaultShell": {
                        "default": "bash",
                        "linux": "zsh",
                        "args": {"default": ["-l"], "linux": ["-i"]}
                    },
                    "taskFileName": "tasks.local.json"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(dotted, nested);
    }

    #[test]
    fn test_dotted_keys_override_nested() {
        let settings = Settings::parse(
            Path::new("settings.json"),
            r#"{
                "integratedTerminalTasks": {"taskFileName": "a.json"},
                "integratedTerminalTasks.taskFileName": "b.json"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.task_file_name(), "b.json");
    }

    #[test]
    fn test_shell_args_override_lands_in_args() {
        let settings = Settings::parse(
            Path::new("settings.json"),
            r#"{
                "integratedTerminalTasks.defaultShell.default": "bash",
                "integratedTerminalTasks.defaultShell.args.linux": ["--norc"]
            }"#,
        )
        .unwrap();
        let defaults = ShellDefaults::resolve(&settings.default_shell, Platform::Linux);
        assert_eq!(defaults.shell.as_deref(), Some("bash"));
        assert_eq!(defaults.args, vec!["--norc"]);
    }

    #[test]
    fn test_missing_namespace_is_default() {
        let settings =
            Settings::parse(Path::new("settings.json"), r#"{"files.eol": "\n"}"#).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.task_file_name(), DEFAULT_TASK_FILE_NAME);
    }

    #[test]
    fn test_empty_task_file_name_uses_default() {
        let settings = Settings::parse(
            Path::new("settings.json"),
            r#"{"integratedTerminalTasks.taskFileName": ""}"#,
        )
        .unwrap();
        assert_eq!(settings.task_file_name(), DEFAULT_TASK_FILE_NAME);
    }

    #[test]
    fn test_yaml_settings() {
        let settings = Settings::parse(
            Path::new("settings.yaml"),
            "integratedTerminalTasks:\n  defaultShell:\n    default: fish\n    args:\n      - -l\n",
        )
        .unwrap();
        assert_eq!(settings.default_shell.shell.default.as_deref(), Some("fish"));
        assert_eq!(
            settings.default_shell.args,
            Some(PlatformValue::Value(vec!["-l".to_string()]))
        );
    }

    #[test]
    fn test_invalid_json_error_names_file() {
        let result = Settings::parse(Path::new(".vscode/settings.json"), "{ nope");
        match result {
            Err(ConfigError::Json { path, .. }) => {
                assert_eq!(path, PathBuf::from(".vscode/settings.json"));
            }
            other => panic!("Expected ConfigError::Json, got: {other:?}"),
        }
    }

    #[test]
    fn test_settings_with_comments_and_trailing_commas() {
        let settings = Settings::parse(
            Path::new("settings.json"),
            "{\n  // editor settings\n  \"integratedTerminalTasks.defaultShell.linux\": \"zsh\",\n  /* shell args */\n  \"integratedTerminalTasks.defaultShell.args.linux\": [\"-l\",],\n}\n",
        )
        .unwrap();
        let defaults = ShellDefaults::resolve(&settings.default_shell, Platform::Linux);
        assert_eq!(defaults.shell.as_deref(), Some("zsh"));
        assert_eq!(defaults.args, vec!["-l"]);
    }

    #[test]
    fn test_wrong_section_shape() {
        let result = Settings::parse(
            Path::new("settings.json"),
            r#"{"integratedTerminalTasks.taskFileName": 3}"#,
        );
        assert!(matches!(result, Err(ConfigError::Section { .. })));
    }

    #[test]
    fn test_find_workspace_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(WORKSPACE_CONFIG_DIR)).unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_workspace_root(&nested), dir.path());
    }
}
