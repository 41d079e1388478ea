//! bobbin-core
//!
//! The execution contract of a single task: option schema and validation,
//! lifecycle hooks, begin-of-run logging, and a retry loop with linear backoff.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（options, config sources, errors, state, run records）
//! - **ports**: 抽象化レイヤー（Clock, Sleeper, IdGenerator）
//! - **retry**: RetryPolicy, Decision, Attempt trait, retry loop
//! - **app**: TaskVariant, TaskBuilder, TaskContext, Task
//! - **settings**: TOML 設定ファイル

pub mod app;
pub mod domain;
pub mod ports;
pub mod retry;
pub mod settings;

pub use app::{Task, TaskBuilder, TaskContext, TaskVariant};
pub use domain::{
    ExecutionContext, Failure, FailureKind, FlowRef, OptionSchema, OptionSpec, OptionValues,
    ProjectConfig, ReturnValues, TaskConfig, TaskError, TaskState,
};
pub use retry::{Attempt, AttemptExt, RetryPolicy};
pub use settings::{Settings, SettingsError};
