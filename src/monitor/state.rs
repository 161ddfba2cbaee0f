use serde::Serialize;

use crate::gating::Decision;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MonitorState {
    /// No redirect in flight.
    #[default]
    Idle,
    /// A redirect was dispatched and focus has not yet left the gated app.
    Redirecting,
}

impl MonitorState {
    /// Next state for a foreground-change decision. Redirecting re-evaluates
    /// every event: an allowed focus (including the control surface itself)
    /// settles back to Idle, a gated one dispatches again.
    pub fn next(self, decision: Decision) -> MonitorState {
        match decision {
            Decision::Allow => MonitorState::Idle,
            Decision::Intercept => MonitorState::Redirecting,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub state: MonitorState,
    pub events_processed: u64,
    pub intercepts_dispatched: u64,
    pub dispatch_failures: u64,
    pub last_package: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        assert_eq!(MonitorState::Idle.next(Decision::Allow), MonitorState::Idle);
        assert_eq!(MonitorState::Idle.next(Decision::Intercept), MonitorState::Redirecting);
        assert_eq!(MonitorState::Redirecting.next(Decision::Allow), MonitorState::Idle);
        assert_eq!(
            MonitorState::Redirecting.next(Decision::Intercept),
            MonitorState::Redirecting
        );
    }
}
