//! Built-in task variants.

use std::process::Command as Process;

use bobbin_core::{
    Attempt, Failure, FailureKind, OptionSchema, TaskContext, TaskError, TaskVariant,
};
use serde_json::{Value, json};
use tracing::info;

/// Logs a message and returns it.
pub struct Echo;

impl TaskVariant for Echo {
    type Output = Value;

    fn option_schema(&self) -> OptionSchema {
        OptionSchema::new().required("message", "Text to log")
    }

    fn run_task(&mut self, ctx: &mut TaskContext) -> Result<Value, TaskError> {
        let message = ctx.required_str("message")?;
        info!("{message}");
        ctx.return_values_mut().set("message", message.clone());
        Ok(Value::String(message))
    }
}

/// Runs a shell command, retrying failed exits.
///
/// A non-zero exit is transient unless `retry_on_exit_codes` is set and does
/// not list the code. A command that cannot be spawned is permanent.
#[derive(Default)]
pub struct Command {
    command: String,
    retry_on_exit_codes: Vec<i32>,
}

impl Command {
    fn classify_exit(&self, code: Option<i32>) -> FailureKind {
        match code {
            Some(code)
                if self.retry_on_exit_codes.is_empty()
                    || self.retry_on_exit_codes.contains(&code) =>
            {
                FailureKind::Transient
            }
            // killed by a signal
            None if self.retry_on_exit_codes.is_empty() => FailureKind::Transient,
            _ => FailureKind::Permanent,
        }
    }
}

impl TaskVariant for Command {
    type Output = Value;

    fn option_schema(&self) -> OptionSchema {
        OptionSchema::new()
            .required("command", "Shell command to run")
            .optional("retries", "Number of times to retry a failed command")
            .optional("retry_interval", "Seconds to sleep before a retry")
            .optional("retry_interval_add", "Seconds added to the interval after each retry")
            .optional("retry_on_exit_codes", "Exit codes worth retrying (default: any)")
    }

    fn init_task(&mut self, ctx: &mut TaskContext) -> Result<(), TaskError> {
        self.command = ctx.required_str("command")?;
        self.retry_on_exit_codes = match ctx.options().get("retry_on_exit_codes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_i64()
                        .and_then(|n| i32::try_from(n).ok())
                        .ok_or_else(|| TaskError::InvalidOption {
                            name: "retry_on_exit_codes".to_string(),
                            reason: format!("{item} is not an exit code"),
                        })
                })
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(TaskError::InvalidOption {
                    name: "retry_on_exit_codes".to_string(),
                    reason: format!("expected a list of exit codes, got {other}"),
                });
            }
        };
        Ok(())
    }

    fn run_task(&mut self, ctx: &mut TaskContext) -> Result<Value, TaskError> {
        ctx.retry(self)
    }
}

impl Attempt for Command {
    type Output = Value;

    fn attempt(&mut self, ctx: &mut TaskContext) -> Result<Value, Failure> {
        let output = shell(&self.command).output().map_err(|e| {
            Failure::permanent(format!("failed to run '{}'", self.command)).with_source(e)
        })?;

        let code = output.status.code();
        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        ctx.return_values_mut().set("returncode", json!(code));
        ctx.return_values_mut().set("stdout", stdout.clone());

        if output.status.success() {
            return Ok(json!({ "returncode": code, "stdout": stdout }));
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        Err(Failure::new(
            self.classify_exit(code),
            format!("'{}' exited with {}: {}", self.command, output.status, stderr),
        ))
    }

    fn is_retry_valid(&self, failure: &Failure) -> bool {
        failure.kind() == FailureKind::Transient
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Process {
    let mut process = Process::new("sh");
    process.arg("-c").arg(command);
    process
}

#[cfg(windows)]
fn shell(command: &str) -> Process {
    let mut process = Process::new("cmd");
    process.arg("/C").arg(command);
    process
}

/// Reports the identity it would act as. Requires an execution context.
pub struct OrgInfo;

impl TaskVariant for OrgInfo {
    type Output = Value;

    fn requires_context(&self) -> bool {
        true
    }

    fn run_task(&mut self, ctx: &mut TaskContext) -> Result<Value, TaskError> {
        let org = ctx.require_context()?;
        let info = json!({
            "username": org.username,
            "environment_id": org.environment_id,
        });
        ctx.return_values_mut().set("org", info.clone());
        Ok(info)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use bobbin_core::ports::RecordingSleeper;
    use bobbin_core::{ExecutionContext, Task};
    use rstest::rstest;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn echo_returns_its_message() {
        let mut task = Task::builder(Echo).option("message", "hi").build().unwrap();
        let values = task.call().unwrap();
        assert_eq!(values.get("message"), Some(&json!("hi")));
    }

    #[test]
    fn command_success_reports_stdout() {
        let mut task = Task::builder(Command::default())
            .option("command", "echo hello")
            .build()
            .unwrap();
        let values = task.call().unwrap();
        assert_eq!(values.get("stdout"), Some(&json!("hello")));
        assert_eq!(values.get("returncode"), Some(&json!(0)));
    }

    #[test]
    fn failing_command_is_retried_then_propagated() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let mut task = Task::builder(Command::default())
            .option("command", "exit 3")
            .option("retries", 2)
            .option("retry_interval", 1)
            .option("retry_interval_add", 1)
            .sleeper(sleeper.clone())
            .build()
            .unwrap();

        let err = task.call().unwrap_err();

        assert!(matches!(err, TaskError::Failure(ref f) if f.kind() == FailureKind::Transient));
        assert_eq!(
            sleeper.calls(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[rstest]
    #[case::listed(vec![3], 2)]
    #[case::unlisted(vec![1, 2], 0)]
    fn exit_code_filter_controls_retries(#[case] codes: Vec<i32>, #[case] want_sleeps: usize) {
        let sleeper = Arc::new(RecordingSleeper::new());
        let mut task = Task::builder(Command::default())
            .option("command", "exit 3")
            .option("retries", 2)
            .option("retry_interval", 1)
            .option("retry_on_exit_codes", json!(codes))
            .sleeper(sleeper.clone())
            .build()
            .unwrap();

        task.call().unwrap_err();
        assert_eq!(sleeper.calls().len(), want_sleeps);
    }

    #[test]
    fn bad_exit_code_list_fails_construction() {
        let err = Task::builder(Command::default())
            .option("command", "true")
            .option("retry_on_exit_codes", "3")
            .build()
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidOption { .. }));
    }

    #[test]
    fn org_info_needs_a_context() {
        let err = Task::builder(OrgInfo).build().unwrap_err();
        assert!(matches!(err, TaskError::RequiresContext { .. }));

        let mut task = Task::builder(OrgInfo)
            .context(ExecutionContext::new("dev@example.com", "00D1"))
            .build()
            .unwrap();
        let values = task.call().unwrap();
        assert_eq!(values.get("org").unwrap()["username"], "dev@example.com");
    }
}
