//! Redirect back to the control surface when a gated app takes focus.

use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::thread;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterceptError {
    #[error("platform refused to bring the control surface forward: {0}")]
    DispatchFailed(String),
}

/// Brings the control surface to the foreground and clears the activity
/// stack above it so back-navigation cannot return to the gated app.
///
/// Implementations must return promptly. Any acknowledgement from the
/// platform arrives later as an ordinary focus event.
pub trait ControlSurface: Send + Sync {
    fn bring_to_foreground(&self, blocked_package: &str) -> Result<(), InterceptError>;
}

/// Surface used when no launcher is configured: the redirect is only logged.
pub struct LoggingControlSurface {
    package: String,
}

impl LoggingControlSurface {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

impl ControlSurface for LoggingControlSurface {
    fn bring_to_foreground(&self, blocked_package: &str) -> Result<(), InterceptError> {
        log::info!(
            "Redirecting from {} to {} (clear stack)",
            blocked_package,
            self.package
        );
        Ok(())
    }
}

/// Launches a configured command that raises the control surface, e.g.
/// `["am", "start", "--activity-clear-top", "-n", "com.example.app/.MainActivity"]`.
///
/// The child is not awaited; a reaper thread collects its exit status.
pub struct CommandControlSurface {
    argv: Vec<String>,
}

impl CommandControlSurface {
    pub fn new(argv: Vec<String>) -> Result<Self, InterceptError> {
        if argv.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(InterceptError::DispatchFailed(
                "control surface command is empty".into(),
            ));
        }
        Ok(Self { argv })
    }
}

impl ControlSurface for CommandControlSurface {
    fn bring_to_foreground(&self, blocked_package: &str) -> Result<(), InterceptError> {
        let mut child = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .env("TASKGATE_BLOCKED_PACKAGE", blocked_package)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|err| InterceptError::DispatchFailed(format!("{}: {err}", self.argv[0])))?;

        let program = self.argv[0].clone();
        thread::Builder::new()
            .name("taskgate-reaper".into())
            .spawn(move || match child.wait() {
                Ok(status) if !status.success() => {
                    log::warn!("Control surface command {program} exited with {status}")
                }
                Ok(_) => {}
                Err(err) => log::warn!("Failed to wait on control surface command {program}: {err}"),
            })
            .map_err(|err| InterceptError::DispatchFailed(format!("reaper thread: {err}")))?;

        Ok(())
    }
}

/// Records every redirect; can be told to refuse them. Used by tests and
/// embedders that drive the platform themselves.
#[derive(Default)]
pub struct RecordingControlSurface {
    dispatched: Mutex<Vec<String>>,
    refuse: Mutex<bool>,
}

impl RecordingControlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_refuse(&self, refuse: bool) {
        *self.refuse.lock().unwrap_or_else(|p| p.into_inner()) = refuse;
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl ControlSurface for RecordingControlSurface {
    fn bring_to_foreground(&self, blocked_package: &str) -> Result<(), InterceptError> {
        if *self.refuse.lock().unwrap_or_else(|p| p.into_inner()) {
            return Err(InterceptError::DispatchFailed("refused".into()));
        }
        self.dispatched
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(blocked_package.to_string());
        Ok(())
    }
}
