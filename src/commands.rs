//! Entry points for the UI collaborator.
//!
//! Mutations land in the in-memory gate first, so the focus monitor sees
//! them on its very next event, then are written through to SQLite.

use log::error;

use crate::db::Database;
use crate::gating::Gate;
use crate::models::{BlockedApp, GateSnapshot, Task, TaskId};
use crate::settings::{GateSettings, SettingsStore};
use crate::tasks::parse_minutes;

pub struct AppState {
    pub db: Database,
    pub gate: Gate,
    pub settings: SettingsStore,
}

pub async fn add_task(
    state: &AppState,
    title: String,
    allowed_minutes: String,
) -> Result<Task, String> {
    let minutes = parse_minutes(&allowed_minutes).map_err(|e| e.to_string())?;
    let task = state
        .gate
        .add_task(&title, minutes)
        .map_err(|e| e.to_string())?;

    if let Err(err) = state.db.insert_task(&task).await {
        error!("Failed to persist task {}: {err:?}", task.id);
    }
    if let Err(err) = state.db.set_next_task_id(state.gate.next_task_id()).await {
        error!("Failed to persist task id allocator: {err:?}");
    }
    Ok(task)
}

pub async fn complete_task(state: &AppState, id: TaskId) -> Result<Task, String> {
    let task = state.gate.complete_task(id).map_err(|e| e.to_string())?;
    if let Some(completed_at) = task.completed_at {
        if let Err(err) = state.db.mark_task_completed(id, completed_at).await {
            error!("Failed to persist completion of task {id}: {err:?}");
        }
    }
    Ok(task)
}

pub async fn remove_task(state: &AppState, id: TaskId) -> Result<(), String> {
    state.gate.remove_task(id).map_err(|e| e.to_string())?;
    if let Err(err) = state.db.delete_task(id).await {
        error!("Failed to delete task {id}: {err:?}");
    }
    Ok(())
}

pub async fn toggle_app(state: &AppState, package_identifier: String) -> Result<BlockedApp, String> {
    let app = state
        .gate
        .toggle_selection(&package_identifier)
        .map_err(|e| e.to_string())?;
    if let Err(err) = state.db.save_app_selection(&app).await {
        error!("Failed to persist selection for {package_identifier}: {err:?}");
    }
    Ok(app)
}

pub fn list_tasks(state: &AppState) -> Vec<Task> {
    state.gate.tasks()
}

pub fn list_apps(state: &AppState) -> Vec<BlockedApp> {
    state.gate.apps()
}

pub fn gate_status(state: &AppState) -> GateSnapshot {
    state.gate.snapshot()
}

pub fn get_settings(state: &AppState) -> GateSettings {
    state.settings.get()
}

/// Stores the launcher for the control surface; an empty argv clears it.
/// Applies from the next start, the running monitor keeps its surface.
pub fn set_control_surface_command(
    state: &AppState,
    argv: Vec<String>,
) -> Result<GateSettings, String> {
    let mut settings = state.settings.get();
    settings.control_surface_command = if argv.is_empty() { None } else { Some(argv) };
    state.settings.update(settings.clone()).map_err(|e| e.to_string())?;
    Ok(settings)
}
