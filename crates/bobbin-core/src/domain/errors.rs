//! Errors - タスクの構築・実行で発生するエラーと失敗分類
//!
//! - `TaskError`: construction and invocation errors surfaced to the caller.
//! - `Failure`: the typed result of a failed attempt, classified by `FailureKind`
//!   so a retry predicate can decide without inspecting the error's origin.

use std::fmt;

use thiserror::Error;

/// FailureKind classifies a failed attempt.
///
/// - Transient: 一時的なエラー（リトライ推奨）
/// - Permanent: 恒久的なエラー（リトライ無意味）
/// - Infrastructure: 外部環境の障害（network, remote API, filesystem）
/// - NotImplemented: the variant never provided an attempt operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transient,
    Permanent,
    Infrastructure,
    NotImplemented,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Transient => "transient",
            FailureKind::Permanent => "permanent",
            FailureKind::Infrastructure => "infrastructure",
            FailureKind::NotImplemented => "not_implemented",
        };
        f.write_str(s)
    }
}

/// A failed attempt.
///
/// The retry loop hands this value back to the invoker exactly as the attempt
/// produced it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Failure {
    kind: FailureKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transient, message)
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Permanent, message)
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Infrastructure, message)
    }

    pub fn not_implemented(task: &str) -> Self {
        Self::new(
            FailureKind::NotImplemented,
            format!("{task} does not provide an attempt operation"),
        )
    }

    /// Attach the underlying error.
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// TaskError はタスクの構築・実行エラー
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{task} requires an execution context but none was passed to the task constructor")]
    RequiresContext { task: String },

    #[error("{task} requires the options ({}) and no values were provided", .names.join(", "))]
    MissingOptions { task: String, names: Vec<String> },

    #[error("{task} does not implement {operation}")]
    NotImplemented { task: String, operation: &'static str },

    #[error("invalid value for option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    #[error(transparent)]
    Failure(#[from] Failure),

    #[error("{0}")]
    Other(String),
}

impl TaskError {
    /// Names reported by `MissingOptions`, empty for every other variant.
    pub fn missing_options(&self) -> &[String] {
        match self {
            TaskError::MissingOptions { names, .. } => names,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_options_message_lists_every_name() {
        let err = TaskError::MissingOptions {
            task: "DeployTask".to_string(),
            names: vec!["path".to_string(), "namespace".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "DeployTask requires the options (path, namespace) and no values were provided"
        );
        assert_eq!(err.missing_options(), ["path", "namespace"]);
    }

    #[test]
    fn failure_is_transparent_inside_task_error() {
        let failure = Failure::transient("connection reset");
        let err: TaskError = failure.into();
        assert_eq!(err.to_string(), "connection reset");
        match err {
            TaskError::Failure(f) => assert_eq!(f.kind(), FailureKind::Transient),
            other => panic!("expected Failure, got {other:?}"),
        }
    }

    #[test]
    fn failure_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let failure = Failure::infrastructure("upload failed").with_source(io);
        let source = std::error::Error::source(&failure).expect("source");
        assert_eq!(source.to_string(), "timed out");
    }
}
