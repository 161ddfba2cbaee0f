use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::gating::Gate;
use crate::intercept::ControlSurface;
use crate::models::FocusEvent;

use super::loop_worker::focus_loop;
use super::state::MonitorStatus;

pub type FocusSender = mpsc::UnboundedSender<FocusEvent>;
pub type FocusReceiver = mpsc::UnboundedReceiver<FocusEvent>;

/// Unbounded so the platform side never blocks or drops a notification.
pub fn focus_channel() -> (FocusSender, FocusReceiver) {
    mpsc::unbounded_channel()
}

/// Owns the focus monitor task for the lifetime of the process.
pub struct MonitorController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    status_rx: Option<watch::Receiver<MonitorStatus>>,
}

impl MonitorController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            status_rx: None,
        }
    }

    /// Starts consuming `events`. The gate must already hold restored state.
    pub fn start(
        &mut self,
        gate: Gate,
        surface: Arc<dyn ControlSurface>,
        events: FocusReceiver,
    ) -> Result<watch::Receiver<MonitorStatus>> {
        if self.handle.is_some() {
            bail!("focus monitor already active");
        }

        let cancel_token = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(MonitorStatus::default());

        let handle = tokio::spawn(focus_loop(
            gate,
            surface,
            events,
            status_tx,
            cancel_token.clone(),
        ));

        info!("Focus monitor started");
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.status_rx = Some(status_rx.clone());
        Ok(status_rx)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn status(&self) -> Option<MonitorStatus> {
        self.status_rx.as_ref().map(|rx| rx.borrow().clone())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("focus monitor task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for MonitorController {
    fn default() -> Self {
        Self::new()
    }
}
