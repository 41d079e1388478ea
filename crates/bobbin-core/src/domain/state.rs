//! State - タスクのライフサイクル
//!
//! # 状態遷移
//! - ready: 構築・検証済み
//! - running: 実行中
//! - succeeded: 成功
//! - failed: 失敗
//!
//! A terminal task may be invoked again; it re-enters `Running`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Ready,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, next),
            (Ready, Running)
                | (Running, Succeeded)
                | (Running, Failed)
                | (Succeeded, Running)
                | (Failed, Running)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::start(TaskState::Ready, TaskState::Running, true)]
    #[case::succeed(TaskState::Running, TaskState::Succeeded, true)]
    #[case::fail(TaskState::Running, TaskState::Failed, true)]
    #[case::rerun_after_success(TaskState::Succeeded, TaskState::Running, true)]
    #[case::rerun_after_failure(TaskState::Failed, TaskState::Running, true)]
    #[case::skip_running(TaskState::Ready, TaskState::Succeeded, false)]
    #[case::back_to_ready(TaskState::Running, TaskState::Ready, false)]
    fn transitions(#[case] from: TaskState, #[case] to: TaskState, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn serializes_as_snake_case() {
        let s = serde_json::to_string(&TaskState::Succeeded).unwrap();
        assert_eq!(s, "\"succeeded\"");
    }
}
