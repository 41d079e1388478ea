//! Configuration sources handed to a task at construction.
//!
//! The core treats these as opaque key/value sources. Only
//! `TaskConfig::options` and the identity fields of `ExecutionContext` are
//! read directly.

use serde::{Deserialize, Serialize};

use super::options::OptionValues;

/// Project-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: Option<String>,

    /// Free-form values (package metadata, service endpoints, ...).
    #[serde(default)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            values: serde_json::Map::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Dotted-path lookup, e.g. `"package.namespace"`.
    pub fn lookup(&self, path: &str) -> Option<&serde_json::Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.values.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

/// Task-level configuration: supplied option values plus descriptive settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Which built-in variant runs this task (used by the CLI).
    #[serde(default)]
    pub variant: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub options: Option<OptionValues>,
}

impl TaskConfig {
    pub fn with_options(options: OptionValues) -> Self {
        Self {
            options: Some(options),
            ..Self::default()
        }
    }
}

/// An external environment a task may act in (an authenticated account).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Acting identity.
    pub username: String,

    /// Target environment identifier.
    pub environment_id: String,

    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionContext {
    pub fn new(username: impl Into<String>, environment_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            environment_id: environment_id.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Reference to the enclosing flow. Only its presence is observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRef {
    pub name: String,
}

impl FlowRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
