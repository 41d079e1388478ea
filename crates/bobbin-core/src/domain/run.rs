//! RunRecord: bookkeeping of one task invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RunId;
use super::state::TaskState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: RunId,
    pub task: String,
    pub state: TaskState,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Message of the error that ended the run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunRecord {
    pub fn start(run_id: RunId, task: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            task: task.into(),
            state: TaskState::Running,
            started_at,
            finished_at: None,
            error: None,
        }
    }

    pub fn succeed(&mut self, at: DateTime<Utc>) {
        self.state = TaskState::Succeeded;
        self.finished_at = Some(at);
    }

    pub fn fail(&mut self, at: DateTime<Utc>, error: impl Into<String>) {
        self.state = TaskState::Failed;
        self.finished_at = Some(at);
        self.error = Some(error.into());
    }

    /// Wall-clock duration, once finished.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}
