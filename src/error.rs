use thiserror::Error;

use crate::models::TaskId;

/// Failures surfaced to the UI by the task store and app registry.
/// None of them mutate state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("app '{0}' not found")]
    AppNotFound(String),

    #[error("apps are locked until every task is completed")]
    LockedState,
}

impl GateError {
    /// Both lookup failures are the same `NotFound` kind to callers.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GateError::TaskNotFound(_) | GateError::AppNotFound(_))
    }
}

pub type Result<T, E = GateError> = std::result::Result<T, E>;
