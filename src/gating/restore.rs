use anyhow::{Context, Result};
use log::{info, warn};

use crate::apps::BlockedAppRegistry;
use crate::db::Database;
use crate::settings::GateSettings;
use crate::tasks::TaskStore;

use super::gate::Gate;

/// Rebuilds the gate from disk. Must complete before the focus monitor
/// starts, otherwise an empty store would read as locked-by-default rather
/// than locked-pending-restore.
pub async fn restore_gate(db: &Database, settings: &GateSettings) -> Result<Gate> {
    let tasks = db.load_tasks().await.context("failed to load tasks")?;
    let next_id = db
        .next_task_id()
        .await
        .context("failed to load task id allocator")?
        .unwrap_or(0);
    let store = TaskStore::restore(tasks, next_id);

    let seed = settings.blocked_apps.iter().filter(|app| {
        let is_surface = app.package_identifier == settings.control_surface_package;
        if is_surface {
            warn!(
                "Control surface {} is listed as a blocked app; it will not be gated",
                app.package_identifier
            );
        }
        !is_surface
    });
    let mut registry = BlockedAppRegistry::seeded(seed.cloned());
    for (package, selected) in db
        .load_app_selections()
        .await
        .context("failed to load app selections")?
    {
        if !registry.restore_selection(&package, selected) {
            warn!("Stored selection for {package} has no matching blocked app; ignoring");
        }
    }

    let gate = Gate::new(store, registry);
    let snapshot = gate.snapshot();
    info!(
        "Restored {} tasks ({} completed), gate {}",
        snapshot.total,
        snapshot.completed,
        if snapshot.unlocked { "unlocked" } else { "locked" }
    );
    Ok(gate)
}
