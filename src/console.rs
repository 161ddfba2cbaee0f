//! Line-oriented front end on stdin. `focus ...` lines are platform
//! notifications and go to the monitor; everything else is a UI command.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::commands::{self, AppState};
use crate::models::{GateSnapshot, Task, TaskId};
use crate::monitor::FocusSender;
use crate::platform::parse_focus_line;

const HELP: &str = "commands: add <minutes> <title> | done <id> | rm <id> | toggle <package> \
| tasks | apps | status | settings | surface [argv...] | focus [kind] <package> | help";

pub async fn run_console<R>(reader: R, state: &AppState, events: &FocusSender) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if let Some(reply) = handle_line(state, events, &line).await? {
            println!("{reply}");
        }
    }
    Ok(())
}

/// Returns the text to show the user, if any. Errs only when the monitor
/// has stopped receiving events.
pub async fn handle_line(
    state: &AppState,
    events: &FocusSender,
    line: &str,
) -> Result<Option<String>> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let reply = match verb {
        "" => return Ok(None),
        "focus" => {
            let Some(event) = parse_focus_line(rest) else {
                return Ok(Some("usage: focus [kind] <package>".into()));
            };
            events
                .send(event)
                .context("focus monitor is no longer receiving events")?;
            return Ok(None);
        }
        "add" => {
            let (minutes, title) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            match commands::add_task(state, title.trim().to_string(), minutes.to_string()).await {
                Ok(task) => format!("added {}", describe_task(&task)),
                Err(err) => format!("error: {err}"),
            }
        }
        "done" | "rm" => match rest.parse::<TaskId>() {
            Ok(id) if verb == "done" => match commands::complete_task(state, id).await {
                Ok(task) => format!("completed {}", describe_task(&task)),
                Err(err) => format!("error: {err}"),
            },
            Ok(id) => match commands::remove_task(state, id).await {
                Ok(()) => format!("removed task {id}"),
                Err(err) => format!("error: {err}"),
            },
            Err(_) => format!("error: '{rest}' is not a task id"),
        },
        "toggle" => match commands::toggle_app(state, rest.to_string()).await {
            Ok(app) => format!(
                "{} ({}) {}",
                app.name,
                app.package_identifier,
                if app.is_selected { "selected" } else { "deselected" }
            ),
            Err(err) => format!("error: {err}"),
        },
        "tasks" => {
            let tasks = commands::list_tasks(state);
            if tasks.is_empty() {
                "no tasks".into()
            } else {
                tasks.iter().map(describe_task).collect::<Vec<_>>().join("\n")
            }
        }
        "apps" => {
            let unlocked = commands::gate_status(state).unlocked;
            commands::list_apps(state)
                .iter()
                .map(|app| {
                    format!(
                        "[{}] {} ({}) {}",
                        if app.is_selected { "x" } else { " " },
                        app.name,
                        app.package_identifier,
                        if unlocked { "unlocked" } else { "locked until tasks complete" }
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        "status" => describe_status(&commands::gate_status(state)),
        "settings" => {
            let settings = commands::get_settings(state);
            format!(
                "control surface: {} (launcher: {})",
                settings.control_surface_package,
                describe_launcher(settings.control_surface_command.as_deref())
            )
        }
        "surface" => {
            let argv = rest.split_whitespace().map(str::to_string).collect();
            match commands::set_control_surface_command(state, argv) {
                Ok(settings) => format!(
                    "launcher set to {}; takes effect on next start",
                    describe_launcher(settings.control_surface_command.as_deref())
                ),
                Err(err) => format!("error: {err}"),
            }
        }
        "help" => HELP.into(),
        other => format!("unknown command '{other}'; {HELP}"),
    };
    Ok(Some(reply))
}

fn describe_task(task: &Task) -> String {
    format!(
        "#{} [{}] {} (allowed: {} min)",
        task.id,
        if task.is_completed { "x" } else { " " },
        task.title,
        task.allowed_minutes
    )
}

fn describe_launcher(argv: Option<&[String]>) -> String {
    match argv {
        Some(argv) => argv.join(" "),
        None => "none, redirects are logged".into(),
    }
}

pub fn describe_status(snapshot: &GateSnapshot) -> String {
    format!(
        "{}: {} / {} tasks completed",
        if snapshot.unlocked { "apps unlocked" } else { "apps locked" },
        snapshot.completed,
        snapshot.total
    )
}
