use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use super::definition::TaskDefinition;

/// Errors that can occur while loading the task file
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unable to read task file {path}: {source}")]
    Read { source: io::Error, path: PathBuf },
    #[error("Unable to parse task file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// All tasks of one task file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TaskRegistry {
    tasks: IndexMap<String, TaskDefinition>,
}

impl TaskRegistry {
    /// Parse the text of a task file.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is not a JSON object of task definitions.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.get(name)
    }

    /// Task names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskDefinition)> {
        self.tasks
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl FromIterator<(String, TaskDefinition)> for TaskRegistry {
    fn from_iter<I: IntoIterator<Item = (String, TaskDefinition)>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

/// Read and parse the task file at `path` using `read` to fetch its text.
///
/// # Errors
///
/// Returns `RegistryError::Read` if `read` fails, or `RegistryError::Json` if the
/// text is not a valid task file.
pub fn load_with<F>(path: &Path, read: F) -> Result<TaskRegistry, RegistryError>
where
    F: FnOnce(&Path) -> io::Result<String>,
{
    let contents = read(path).map_err(|e| RegistryError::Read {
        source: e,
        path: path.to_path_buf(),
    })?;
    let registry = TaskRegistry::parse(&contents).map_err(|e| RegistryError::Json {
        source: e,
        path: path.to_path_buf(),
    })?;
    debug!("Loaded {} tasks from {}", registry.len(), path.display());
    Ok(registry)
}
