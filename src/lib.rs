pub mod apps;
pub mod commands;
pub mod console;
pub mod db;
pub mod error;
pub mod gating;
pub mod intercept;
pub mod models;
pub mod monitor;
pub mod platform;
pub mod settings;
pub mod tasks;
mod utils;

use std::{env, future::Future, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use tokio::io::BufReader;
use tokio::task::JoinHandle;

use commands::AppState;
use console::{describe_status, run_console};
use db::Database;
use gating::restore_gate;
use intercept::{CommandControlSurface, ControlSurface, LoggingControlSurface};
use monitor::{focus_channel, FocusSender, MonitorController};
use platform::pump_focus_events;
use settings::{GateSettings, SettingsStore};

fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("TASKGATE_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("taskgate"))
        .ok_or_else(|| anyhow!("no data directory available; set TASKGATE_DATA_DIR"))
}

fn control_surface(settings: &GateSettings) -> Arc<dyn ControlSurface> {
    if let Some(argv) = &settings.control_surface_command {
        match CommandControlSurface::new(argv.clone()) {
            Ok(surface) => return Arc::new(surface),
            Err(err) => warn!("Ignoring control surface command: {err}"),
        }
    }
    Arc::new(LoggingControlSurface::new(
        settings.control_surface_package.clone(),
    ))
}

/// Opens the platform's focus stream and pumps it into the monitor. The open
/// happens inside the task: on a FIFO it waits for the writer, and startup
/// must not wait with it.
fn spawn_focus_source(path: PathBuf, events: FocusSender) -> JoinHandle<Result<u64>> {
    tokio::spawn(async move {
        let result = async {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open focus source {}", path.display()))?;
            pump_focus_events(BufReader::new(file), events).await
        }
        .await;
        match &result {
            Ok(count) => info!("Focus source closed after {count} events"),
            Err(err) => error!("Focus source failed: {err:?}"),
        }
        result
    })
}

/// Runs the console until `shutdown` fires. Closing stdin ends the console
/// only; gating continues until the process is told to stop.
async fn run_until_shutdown<C, S>(console: C, shutdown: S) -> Result<()>
where
    C: Future<Output = Result<()>>,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    tokio::select! {
        result = console => {
            result?;
            info!("Console input closed; gating continues until interrupted");
            shutdown.await;
        }
        _ = &mut shutdown => {}
    }
    info!("Shutting down");
    Ok(())
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var, info by default)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("TaskGate starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let result = runtime.block_on(serve());
    // stdin reads park a blocking thread that never returns on its own
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn serve() -> Result<()> {
    let data_dir = data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let database = Database::new(data_dir.join("taskgate.sqlite3"))?;
    let settings_store = SettingsStore::new(data_dir.join("settings.json"))?;
    let settings = settings_store.get();

    // Restore before the monitor sees a single event.
    let gate = restore_gate(&database, &settings).await?;

    let (events_tx, events_rx) = focus_channel();
    let mut monitor = MonitorController::new();
    monitor.start(gate.clone(), control_surface(&settings), events_rx)?;

    let mut changes = gate.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let snapshot = *changes.borrow_and_update();
            info!("Gate changed (rev {}): {}", snapshot.revision, describe_status(&snapshot));
        }
    });

    if let Some(path) = env::var_os("TASKGATE_FOCUS_SOURCE") {
        spawn_focus_source(PathBuf::from(path), events_tx.clone());
    }

    let state = AppState {
        db: database,
        gate,
        settings: settings_store,
    };

    println!("{}", describe_status(&state.gate.snapshot()));

    run_until_shutdown(
        run_console(BufReader::new(tokio::io::stdin()), &state, &events_tx),
        async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for ctrl-c: {err}");
                std::future::pending::<()>().await;
            }
        },
    )
    .await?;

    if !monitor.is_running() {
        warn!("Focus monitor exited before shutdown was requested");
    }
    monitor.stop().await?;
    if let Some(status) = monitor.status() {
        info!(
            "Focus monitor stopped: {} events, {} intercepts, {} failed dispatches",
            status.events_processed, status.intercepts_dispatched, status.dispatch_failures
        );
    }
    Ok(())
}
