use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::gating::{Decision, Gate};
use crate::intercept::ControlSurface;
use crate::models::FocusEvent;

use super::controller::FocusReceiver;
use super::state::MonitorStatus;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Consumes focus events one at a time, in delivery order, until the
/// platform closes the stream or the process tears the monitor down.
pub async fn focus_loop(
    gate: Gate,
    surface: Arc<dyn ControlSurface>,
    mut events: FocusReceiver,
    status_tx: watch::Sender<MonitorStatus>,
    cancel_token: CancellationToken,
) {
    let mut status = MonitorStatus::default();

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("focus monitor shutting down after {} events", status.events_processed);
                break;
            }
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    log_info!("focus event source closed; monitor stopping");
                    break;
                };
                handle_event(&gate, surface.as_ref(), &event, &mut status);
                status_tx.send_replace(status.clone());
            }
        }
    }
}

/// Applies one event to the monitor status. Never blocks on the UI.
pub fn handle_event(
    gate: &Gate,
    surface: &dyn ControlSurface,
    event: &FocusEvent,
    status: &mut MonitorStatus,
) {
    status.events_processed += 1;

    if !event.is_foreground_change() {
        return;
    }
    status.last_package = Some(event.package_identifier.clone());

    let decision = gate.evaluate(event);
    status.state = status.state.next(decision);

    if decision == Decision::Intercept {
        match surface.bring_to_foreground(&event.package_identifier) {
            Ok(()) => {
                status.intercepts_dispatched += 1;
                log_info!("Intercepted {} while locked", event.package_identifier);
            }
            Err(err) => {
                // Stay Redirecting; the next event retries.
                status.dispatch_failures += 1;
                log_warn!("Intercept of {} failed: {err}", event.package_identifier);
            }
        }
    }
}
