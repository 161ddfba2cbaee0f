use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// The foreground window changed. The only kind the gate acts on.
    WindowStateChanged,
    WindowContentChanged,
    ViewFocused,
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::WindowStateChanged => "window_state_changed",
            EventKind::WindowContentChanged => "window_content_changed",
            EventKind::ViewFocused => "view_focused",
            EventKind::Other => "other",
        }
    }
}

impl FromStr for EventKind {
    type Err = std::convert::Infallible;

    /// Unknown kinds map to `Other` so they are ignored rather than rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "window_state_changed" | "TYPE_WINDOW_STATE_CHANGED" => EventKind::WindowStateChanged,
            "window_content_changed" | "TYPE_WINDOW_CONTENT_CHANGED" => {
                EventKind::WindowContentChanged
            }
            "view_focused" | "TYPE_VIEW_FOCUSED" => EventKind::ViewFocused,
            _ => EventKind::Other,
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusEvent {
    pub event_kind: EventKind,
    pub package_identifier: String,
}

impl FocusEvent {
    pub fn new(event_kind: EventKind, package_identifier: impl Into<String>) -> Self {
        Self {
            event_kind,
            package_identifier: package_identifier.into(),
        }
    }

    /// Shorthand for a foreground-change notification.
    pub fn foreground(package_identifier: impl Into<String>) -> Self {
        Self::new(EventKind::WindowStateChanged, package_identifier)
    }

    pub fn is_foreground_change(&self) -> bool {
        self.event_kind == EventKind::WindowStateChanged
    }
}
