use serde::Serialize;

use crate::apps::BlockedAppRegistry;
use crate::models::FocusEvent;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    Intercept,
    Allow,
}

/// Decides whether a focus change must be redirected to the control surface.
///
/// Pure: no hidden state, the same inputs always give the same answer.
pub fn decide(event: &FocusEvent, unlocked: bool, registry: &BlockedAppRegistry) -> Decision {
    if !event.is_foreground_change() || unlocked {
        return Decision::Allow;
    }
    if registry.is_blocked(&event.package_identifier) {
        Decision::Intercept
    } else {
        Decision::Allow
    }
}
