//! TaskBuilder - タスクの構築と起動時検証
//!
//! # Fail-fast 設計
//! `build()` は以下を順番に行い、失敗した時点で止まる:
//! 1. capability check: context が必要なのに無ければ `RequiresContext`
//! 2. options の合成（task_config.options → overrides が上書き）
//! 3. schema 検証（不足している required option を全て集めて `MissingOptions`）
//! 4. `update_credentials` hook
//! 5. `init_task` hook

use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    ExecutionContext, FlowRef, OptionValues, ProjectConfig, TaskConfig, TaskError, TaskState,
};
use crate::ports::{Clock, IdGenerator, Sleeper, SystemClock, ThreadSleeper, UlidGenerator};

use super::context::TaskContext;
use super::task::Task;
use super::variant::TaskVariant;

/// # 使用例
/// ```ignore
/// let task = TaskBuilder::new(Deploy)
///     .task_config(task_config)
///     .context(ExecutionContext::new("admin@example.com", "00D000000000001"))
///     .option("path", "src")
///     .build()?;
/// ```
pub struct TaskBuilder<V> {
    variant: V,
    project: ProjectConfig,
    task_config: TaskConfig,
    context: Option<ExecutionContext>,
    flow: Option<FlowRef>,
    overrides: OptionValues,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl<V: TaskVariant> TaskBuilder<V> {
    pub fn new(variant: V) -> Self {
        Self {
            variant,
            project: ProjectConfig::default(),
            task_config: TaskConfig::default(),
            context: None,
            flow: None,
            overrides: OptionValues::new(),
            sleeper: Arc::new(ThreadSleeper),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator::new(SystemClock)),
        }
    }

    pub fn project(mut self, project: ProjectConfig) -> Self {
        self.project = project;
        self
    }

    pub fn task_config(mut self, task_config: TaskConfig) -> Self {
        self.task_config = task_config;
        self
    }

    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn maybe_context(mut self, context: Option<ExecutionContext>) -> Self {
        self.context = context;
        self
    }

    pub fn flow(mut self, flow: FlowRef) -> Self {
        self.flow = Some(flow);
        self
    }

    pub fn maybe_flow(mut self, flow: Option<FlowRef>) -> Self {
        self.flow = flow;
        self
    }

    /// Override a single option. Overrides win over `task_config.options`.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.overrides.insert(name, value);
        self
    }

    pub fn options(mut self, overrides: OptionValues) -> Self {
        self.overrides.merge(overrides);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn build(self) -> Result<Task<V>, TaskError> {
        let Self {
            mut variant,
            project,
            task_config,
            context,
            flow,
            overrides,
            sleeper,
            clock,
            ids,
        } = self;
        let name = variant.name().to_string();

        if variant.requires_context() && context.is_none() {
            return Err(TaskError::RequiresContext { task: name });
        }

        let mut options = task_config.options.clone().unwrap_or_default();
        options.merge(overrides);

        let missing = variant.option_schema().missing_required(&options);
        if !missing.is_empty() {
            return Err(TaskError::MissingOptions {
                task: name,
                names: missing,
            });
        }

        let mut ctx = TaskContext::new(
            name, project, task_config, context, flow, options, sleeper,
        );
        variant.update_credentials(&mut ctx)?;
        variant.init_task(&mut ctx)?;
        debug!(task = ctx.task_name(), options = ctx.options().len(), "task ready");

        Ok(Task::from_parts(variant, ctx, clock, ids, TaskState::Ready))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptionSchema;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the order hooks run in.
    struct Deploy {
        needs_context: bool,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Deploy {
        fn new(needs_context: bool) -> (Self, Arc<Mutex<Vec<&'static str>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    needs_context,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl TaskVariant for Deploy {
        type Output = ();

        fn requires_context(&self) -> bool {
            self.needs_context
        }

        fn option_schema(&self) -> OptionSchema {
            OptionSchema::new()
                .required("path", "Directory to deploy")
                .optional("namespace", "Namespace token")
                .required("api_version", "API version")
        }

        fn update_credentials(&mut self, ctx: &mut TaskContext) -> Result<(), TaskError> {
            self.calls.lock().unwrap().push("update_credentials");
            if let Some(org) = ctx.execution_context_mut() {
                org.extra.insert("access_token".into(), json!("refreshed"));
            }
            Ok(())
        }

        fn init_task(&mut self, ctx: &mut TaskContext) -> Result<(), TaskError> {
            self.calls.lock().unwrap().push("init_task");
            if ctx.options().get("namespace").is_none() {
                ctx.options_mut().insert("namespace", "");
            }
            Ok(())
        }
    }

    fn full_config() -> TaskConfig {
        TaskConfig::with_options(
            [("path", json!("src")), ("api_version", json!("60.0"))]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn missing_context_fails_before_any_hook() {
        let (variant, calls) = Deploy::new(true);
        let err = TaskBuilder::new(variant)
            .task_config(full_config())
            .build()
            .unwrap_err();

        assert!(matches!(err, TaskError::RequiresContext { ref task } if task == "Deploy"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_context_wins_over_missing_options() {
        let (variant, _) = Deploy::new(true);
        let err = TaskBuilder::new(variant).build().unwrap_err();
        assert!(matches!(err, TaskError::RequiresContext { .. }));
    }

    #[test]
    fn every_missing_option_is_reported() {
        let (variant, calls) = Deploy::new(false);
        let err = TaskBuilder::new(variant).build().unwrap_err();

        assert_eq!(err.missing_options(), ["path", "api_version"]);
        assert!(err.to_string().starts_with("Deploy requires the options (path, api_version)"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn overrides_can_satisfy_required_options() {
        let (variant, _) = Deploy::new(false);
        let task = TaskBuilder::new(variant)
            .option("path", "force-app")
            .option("api_version", "61.0")
            .build()
            .unwrap();
        assert_eq!(task.options().get("path"), Some(&json!("force-app")));
    }

    #[test]
    fn overrides_win_over_task_config() {
        let (variant, _) = Deploy::new(false);
        let task = TaskBuilder::new(variant)
            .task_config(full_config())
            .options([("path", json!("override"))].into_iter().collect())
            .build()
            .unwrap();

        assert_eq!(task.options().get("path"), Some(&json!("override")));
        assert_eq!(task.options().get("api_version"), Some(&json!("60.0")));
    }

    #[test]
    fn hooks_run_in_order_after_validation() {
        let (variant, calls) = Deploy::new(true);
        let task = TaskBuilder::new(variant)
            .task_config(full_config())
            .context(ExecutionContext::new("admin@example.com", "00D000000000001"))
            .build()
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["update_credentials", "init_task"]);
        assert_eq!(task.options().get("namespace"), Some(&json!("")));
        assert_eq!(
            task.execution_context().unwrap().extra.get("access_token"),
            Some(&json!("refreshed"))
        );
        assert_eq!(task.state(), TaskState::Ready);
    }

    #[test]
    fn failing_hook_aborts_construction() {
        struct Broken;
        impl TaskVariant for Broken {
            type Output = ();
            fn update_credentials(&mut self, _ctx: &mut TaskContext) -> Result<(), TaskError> {
                Err(TaskError::Other("token exchange refused".into()))
            }
        }

        let err = TaskBuilder::new(Broken).build().unwrap_err();
        assert_eq!(err.to_string(), "token exchange refused");
    }
}
