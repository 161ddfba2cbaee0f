use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Time budget attached to the task. Reserved: the gate does not consume it.
    pub allowed_minutes: u32,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: TaskId, title: String, allowed_minutes: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            allowed_minutes,
            is_completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Marks the task done. Returns false if it already was.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_completed {
            return false;
        }
        self.is_completed = true;
        self.completed_at = Some(now);
        true
    }
}

/// Status-card view of the gate: lock state plus "N / M tasks completed".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateSnapshot {
    pub unlocked: bool,
    pub completed: usize,
    pub total: usize,
    /// Bumped on every task or app mutation so subscribers can re-read lists.
    pub revision: u64,
}
