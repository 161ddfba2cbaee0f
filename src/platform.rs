//! Adapter for the host's focus notifications.
//!
//! The host pushes one notification per line as `<event-kind> <package>`,
//! e.g. `TYPE_WINDOW_STATE_CHANGED com.instagram.android`. A bare package
//! name is treated as a foreground change.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::models::{EventKind, FocusEvent};
use crate::monitor::FocusSender;

pub fn parse_focus_line(line: &str) -> Option<FocusEvent> {
    let mut parts = line.split_whitespace();
    let first = parts.next()?;
    match parts.next() {
        Some(package) => {
            let kind = first.parse::<EventKind>().unwrap_or(EventKind::Other);
            Some(FocusEvent::new(kind, package))
        }
        None => Some(FocusEvent::foreground(first)),
    }
}

/// Forwards every parsed line into the monitor channel, in order. Returns
/// the number of events delivered once the reader reaches EOF.
pub async fn pump_focus_events<R>(reader: R, events: FocusSender) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut delivered = 0;
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read focus notification")?
    {
        let Some(event) = parse_focus_line(&line) else {
            continue;
        };
        events
            .send(event)
            .context("focus monitor is no longer receiving events")?;
        delivered += 1;
    }
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::focus_channel;

    #[test]
    fn parses_kind_and_package() {
        let event = parse_focus_line("TYPE_WINDOW_STATE_CHANGED com.instagram.android").unwrap();
        assert_eq!(event, FocusEvent::foreground("com.instagram.android"));

        let event = parse_focus_line("view_focused com.facebook.katana").unwrap();
        assert_eq!(event.event_kind, EventKind::ViewFocused);

        let event = parse_focus_line("TYPE_ANNOUNCEMENT com.facebook.katana").unwrap();
        assert_eq!(event.event_kind, EventKind::Other);
    }

    #[test]
    fn bare_package_is_foreground_change() {
        let event = parse_focus_line("  com.google.android.youtube ").unwrap();
        assert!(event.is_foreground_change());
        assert_eq!(event.package_identifier, "com.google.android.youtube");
        assert!(parse_focus_line("   ").is_none());
    }

    #[tokio::test]
    async fn pump_preserves_order_and_skips_blank_lines() {
        let input: &[u8] = b"com.a\n\nwindow_content_changed com.b\ncom.c\n";
        let (tx, mut rx) = focus_channel();

        let delivered = pump_focus_events(input, tx).await.unwrap();
        assert_eq!(delivered, 3);

        let mut packages = Vec::new();
        while let Some(event) = rx.recv().await {
            packages.push(event.package_identifier);
        }
        assert_eq!(packages, ["com.a", "com.b", "com.c"]);
    }

    #[tokio::test]
    async fn pump_fails_when_monitor_is_gone() {
        let (tx, rx) = focus_channel();
        drop(rx);
        assert!(pump_focus_events(&b"com.a\n"[..], tx).await.is_err());
    }
}
