//! Settings file: project, execution contexts, and task configurations.
//!
//! ```toml
//! [project]
//! name = "demo"
//!
//! [contexts.dev]
//! username = "dev@example.com"
//! environment_id = "00D000000000001"
//!
//! [tasks.say_hello]
//! variant = "echo"
//! options = { message = "hello" }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ExecutionContext, ProjectConfig, TaskConfig};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown task '{0}'")]
    UnknownTask(String),

    #[error("unknown execution context '{0}'")]
    UnknownContext(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub contexts: BTreeMap<String, ExecutionContext>,

    #[serde(default)]
    pub tasks: BTreeMap<String, TaskConfig>,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn task(&self, name: &str) -> Result<&TaskConfig, SettingsError> {
        self.tasks
            .get(name)
            .ok_or_else(|| SettingsError::UnknownTask(name.to_string()))
    }

    pub fn context(&self, name: &str) -> Result<&ExecutionContext, SettingsError> {
        self.contexts
            .get(name)
            .ok_or_else(|| SettingsError::UnknownContext(name.to_string()))
    }
}
