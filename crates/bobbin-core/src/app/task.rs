//! Task: a validated, loggable, invocable unit of work.

use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::domain::{
    ExecutionContext, FlowRef, OptionValues, ProjectConfig, ReturnValues, RunRecord, TaskConfig,
    TaskError, TaskState,
};
use crate::ports::{Clock, IdGenerator};

use super::builder::TaskBuilder;
use super::context::TaskContext;
use super::variant::TaskVariant;

pub struct Task<V: TaskVariant> {
    variant: V,
    ctx: TaskContext,
    state: TaskState,
    result: Option<V::Output>,
    last_run: Option<RunRecord>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl<V: TaskVariant> Task<V> {
    /// Construct and validate a task.
    ///
    /// `overrides` win over `task_config.options` on key collision.
    pub fn new(
        variant: V,
        project: ProjectConfig,
        task_config: TaskConfig,
        context: Option<ExecutionContext>,
        flow: Option<FlowRef>,
        overrides: OptionValues,
    ) -> Result<Self, TaskError> {
        TaskBuilder::new(variant)
            .project(project)
            .task_config(task_config)
            .maybe_context(context)
            .maybe_flow(flow)
            .options(overrides)
            .build()
    }

    pub fn builder(variant: V) -> TaskBuilder<V> {
        TaskBuilder::new(variant)
    }

    pub(crate) fn from_parts(
        variant: V,
        ctx: TaskContext,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        state: TaskState,
    ) -> Self {
        Self {
            variant,
            ctx,
            state,
            result: None,
            last_run: None,
            clock,
            ids,
        }
    }

    /// Invoke the task: log the beginning, run the variant, keep its output
    /// as the result, and hand back the return values.
    ///
    /// Calling again is allowed, but state consumed by the first call
    /// (options changed by hooks, return values) is not reset.
    pub fn call(&mut self) -> Result<ReturnValues, TaskError> {
        let run_id = self.ids.generate_run_id();
        let span = info_span!("task", task = self.ctx.task_name(), %run_id);
        let _enter = span.enter();

        self.transition(TaskState::Running);
        let mut run = RunRecord::start(run_id, self.ctx.task_name(), self.clock.now());

        for line in begin_log_lines(
            self.ctx.task_name(),
            self.variant.requires_context(),
            self.ctx.execution_context(),
            self.ctx.is_nested(),
        ) {
            info!("{line}");
        }

        let outcome = self.variant.run_task(&mut self.ctx);
        let finished_at = self.clock.now();
        let returned = match outcome {
            Ok(output) => {
                self.result = Some(output);
                run.succeed(finished_at);
                self.transition(TaskState::Succeeded);
                Ok(self.ctx.return_values().clone())
            }
            Err(err) => {
                debug!(error = %err, "task failed");
                run.fail(finished_at, err.to_string());
                self.transition(TaskState::Failed);
                Err(err)
            }
        };
        self.last_run = Some(run);
        returned
    }

    fn transition(&mut self, next: TaskState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    pub fn name(&self) -> &str {
        self.ctx.task_name()
    }

    pub fn variant(&self) -> &V {
        &self.variant
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Output of the last successful invocation.
    pub fn result(&self) -> Option<&V::Output> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<V::Output> {
        self.result.take()
    }

    pub fn return_values(&self) -> &ReturnValues {
        self.ctx.return_values()
    }

    pub fn options(&self) -> &OptionValues {
        self.ctx.options()
    }

    pub fn project(&self) -> &ProjectConfig {
        self.ctx.project()
    }

    pub fn execution_context(&self) -> Option<&ExecutionContext> {
        self.ctx.execution_context()
    }

    pub fn flow(&self) -> Option<&FlowRef> {
        self.ctx.flow()
    }

    pub fn last_run(&self) -> Option<&RunRecord> {
        self.last_run.as_ref()
    }
}

impl<V> std::fmt::Debug for Task<V>
where
    V: TaskVariant,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.ctx.task_name())
            .field("state", &self.state)
            .field("ctx", &self.ctx)
            .field("last_run", &self.last_run)
            .finish_non_exhaustive()
    }
}

/// Lines logged when a task begins.
///
/// The acting identity and environment are only logged for tasks that
/// require a context and run standalone; inside a flow they are left out.
pub fn begin_log_lines(
    task: &str,
    requires_context: bool,
    context: Option<&ExecutionContext>,
    nested: bool,
) -> Vec<String> {
    let mut lines = vec![format!("Beginning task: {task}")];
    if requires_context && !nested {
        if let Some(ctx) = context {
            lines.push(format!("{:>15} {}", "As user:", ctx.username));
            lines.push(format!("{:>15} {}", "In org:", ctx.environment_id));
        }
    }
    lines
}
