use chrono::{DateTime, Utc};

use crate::error::{GateError, Result};
use crate::models::{GateSnapshot, Task, TaskId};

/// Parses the minutes field as typed by the user.
pub fn parse_minutes(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| GateError::InvalidInput(format!("'{raw}' is not a whole number of minutes")))
}

/// In-memory task list plus the id allocator.
///
/// Holds no lock of its own; `Gate` wraps it in a mutex shared by the UI
/// and the focus monitor.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted rows. The allocator resumes past both
    /// the stored counter and every restored id so ids are never reused.
    pub fn restore(tasks: Vec<Task>, next_id: TaskId) -> Self {
        let past_max = tasks
            .iter()
            .map(|task| task.id.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self {
            tasks,
            next_id: next_id.max(past_max),
        }
    }

    pub fn add_task(&mut self, title: &str, allowed_minutes: i64, now: DateTime<Utc>) -> Result<Task> {
        if title.trim().is_empty() {
            return Err(GateError::InvalidInput("task title must not be blank".into()));
        }
        if allowed_minutes <= 0 {
            return Err(GateError::InvalidInput(format!(
                "allowed minutes must be positive, got {allowed_minutes}"
            )));
        }
        let allowed_minutes = u32::try_from(allowed_minutes).map_err(|_| {
            GateError::InvalidInput(format!("allowed minutes {allowed_minutes} is too large"))
        })?;

        let task = Task::new(self.next_id, title.to_string(), allowed_minutes, now);
        self.next_id += 1;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Idempotent: completing a finished task returns it unchanged.
    pub fn complete_task(&mut self, id: TaskId, now: DateTime<Utc>) -> Result<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(GateError::TaskNotFound(id))?;
        task.complete(now);
        Ok(task.clone())
    }

    pub fn remove_task(&mut self, id: TaskId) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(GateError::TaskNotFound(id))?;
        Ok(self.tasks.remove(index))
    }

    /// An empty list is locked, never vacuously complete.
    pub fn is_unlocked(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|task| task.is_completed)
    }

    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            unlocked: self.is_unlocked(),
            completed: self.tasks.iter().filter(|task| task.is_completed).count(),
            total: self.tasks.len(),
            revision: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn next_id(&self) -> TaskId {
        self.next_id
    }
}
