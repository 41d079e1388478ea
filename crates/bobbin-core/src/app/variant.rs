//! TaskVariant - タスクの種類ごとの振る舞い
//!
//! A variant declares its option schema and capability flag, and overrides
//! only the hooks it needs. Every hook has a default: the credential and init
//! hooks do nothing, `run_task` reports `TaskError::NotImplemented`.

use crate::domain::{OptionSchema, TaskError};

use super::context::TaskContext;

/// # 使用例
/// ```ignore
/// struct Deploy;
///
/// impl TaskVariant for Deploy {
///     type Output = u32;
///
///     fn option_schema(&self) -> OptionSchema {
///         OptionSchema::new().required("path", "Directory to deploy")
///     }
///
///     fn run_task(&mut self, ctx: &mut TaskContext) -> Result<u32, TaskError> {
///         ctx.return_values_mut().set("deployed", true);
///         Ok(0)
///     }
/// }
/// ```
pub trait TaskVariant {
    /// Result retained on the task after a successful invocation.
    type Output;

    /// Name used in log lines and error messages. Defaults to the type name.
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }

    /// Whether construction must be given an `ExecutionContext`.
    fn requires_context(&self) -> bool {
        false
    }

    fn option_schema(&self) -> OptionSchema {
        OptionSchema::new()
    }

    /// Exchange or renew external credentials before the task runs.
    fn update_credentials(&mut self, _ctx: &mut TaskContext) -> Result<(), TaskError> {
        Ok(())
    }

    /// Setup that depends on validated options.
    fn init_task(&mut self, _ctx: &mut TaskContext) -> Result<(), TaskError> {
        Ok(())
    }

    fn run_task(&mut self, ctx: &mut TaskContext) -> Result<Self::Output, TaskError> {
        Err(TaskError::NotImplemented {
            task: ctx.task_name().to_string(),
            operation: "run_task",
        })
    }
}

impl<V: TaskVariant + ?Sized> TaskVariant for Box<V> {
    type Output = V::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn requires_context(&self) -> bool {
        (**self).requires_context()
    }

    fn option_schema(&self) -> OptionSchema {
        (**self).option_schema()
    }

    fn update_credentials(&mut self, ctx: &mut TaskContext) -> Result<(), TaskError> {
        (**self).update_credentials(ctx)
    }

    fn init_task(&mut self, ctx: &mut TaskContext) -> Result<(), TaskError> {
        (**self).init_task(ctx)
    }

    fn run_task(&mut self, ctx: &mut TaskContext) -> Result<Self::Output, TaskError> {
        (**self).run_task(ctx)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
