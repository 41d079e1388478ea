//! TaskContext: everything a variant's hooks can see and write.

use std::sync::Arc;

use crate::domain::{
    ExecutionContext, Failure, FlowRef, OptionValues, ProjectConfig, ReturnValues, TaskConfig,
    TaskError,
};
use crate::ports::Sleeper;
use crate::retry::{self, Attempt, RetryPolicy};

pub struct TaskContext {
    task_name: String,
    project: ProjectConfig,
    task_config: TaskConfig,
    execution_context: Option<ExecutionContext>,
    flow: Option<FlowRef>,
    options: OptionValues,
    return_values: ReturnValues,
    sleeper: Arc<dyn Sleeper>,
}

impl TaskContext {
    pub(crate) fn new(
        task_name: String,
        project: ProjectConfig,
        task_config: TaskConfig,
        execution_context: Option<ExecutionContext>,
        flow: Option<FlowRef>,
        options: OptionValues,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            task_name,
            project,
            task_config,
            execution_context,
            flow,
            options,
            return_values: ReturnValues::new(),
            sleeper,
        }
    }

    /// A context with empty configuration, for driving a variant or an
    /// attempt outside of a `Task`.
    pub fn detached(task_name: impl Into<String>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self::new(
            task_name.into(),
            ProjectConfig::default(),
            TaskConfig::default(),
            None,
            None,
            OptionValues::new(),
            sleeper,
        )
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    pub fn task_config(&self) -> &TaskConfig {
        &self.task_config
    }

    pub fn execution_context(&self) -> Option<&ExecutionContext> {
        self.execution_context.as_ref()
    }

    /// Mutable access for credential refresh.
    pub fn execution_context_mut(&mut self) -> Option<&mut ExecutionContext> {
        self.execution_context.as_mut()
    }

    /// The execution context, or `RequiresContext` when there is none.
    pub fn require_context(&self) -> Result<&ExecutionContext, TaskError> {
        self.execution_context
            .as_ref()
            .ok_or_else(|| TaskError::RequiresContext {
                task: self.task_name.clone(),
            })
    }

    pub fn flow(&self) -> Option<&FlowRef> {
        self.flow.as_ref()
    }

    /// Whether the task runs inside an enclosing flow.
    pub fn is_nested(&self) -> bool {
        self.flow.is_some()
    }

    pub fn options(&self) -> &OptionValues {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionValues {
        &mut self.options
    }

    /// Option value rendered as a string; `InvalidOption` when absent.
    pub fn required_str(&self, name: &str) -> Result<String, TaskError> {
        self.options
            .get_str(name)
            .ok_or_else(|| TaskError::InvalidOption {
                name: name.to_string(),
                reason: "no value".to_string(),
            })
    }

    pub fn return_values(&self) -> &ReturnValues {
        &self.return_values
    }

    pub fn return_values_mut(&mut self) -> &mut ReturnValues {
        &mut self.return_values
    }

    pub fn sleeper(&self) -> Arc<dyn Sleeper> {
        Arc::clone(&self.sleeper)
    }

    /// Retry policy read from the current options.
    pub fn retry_policy(&self) -> Result<RetryPolicy, TaskError> {
        RetryPolicy::from_options(&self.options)
    }

    /// Run `attempt` under the policy read from the options.
    pub fn retry<A>(&mut self, attempt: &mut A) -> Result<A::Output, TaskError>
    where
        A: Attempt + ?Sized,
    {
        let mut policy = self.retry_policy()?;
        Ok(retry::run(attempt, self, &mut policy)?)
    }

    /// Run `attempt` under a caller-owned policy, which is updated in place.
    pub fn retry_with<A>(
        &mut self,
        attempt: &mut A,
        policy: &mut RetryPolicy,
    ) -> Result<A::Output, Failure>
    where
        A: Attempt + ?Sized,
    {
        retry::run(attempt, self, policy)
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("task_name", &self.task_name)
            .field("execution_context", &self.execution_context)
            .field("flow", &self.flow)
            .field("options", &self.options)
            .field("return_values", &self.return_values)
            .finish_non_exhaustive()
    }
}
