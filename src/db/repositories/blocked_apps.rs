use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::params;

use crate::db::Database;
use crate::models::BlockedApp;

impl Database {
    /// Stores the selection flag for one app.
    pub async fn save_app_selection(&self, app: &BlockedApp) -> Result<()> {
        let record = app.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO blocked_apps (package_identifier, name, is_selected, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(package_identifier) DO UPDATE SET
                     name = excluded.name,
                     is_selected = excluded.is_selected,
                     updated_at = excluded.updated_at",
                params![
                    record.package_identifier,
                    record.name,
                    record.is_selected,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("failed to save app selection")?;
            Ok(())
        })
        .await
    }

    /// `(package_identifier, is_selected)` for every app ever toggled.
    pub async fn load_app_selections(&self) -> Result<Vec<(String, bool)>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT package_identifier, is_selected FROM blocked_apps
                 ORDER BY package_identifier ASC",
            )?;
            let selections = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(selections)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn selection_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("taskgate.sqlite3")).unwrap();

        let mut app = BlockedApp::new("YouTube", "com.google.android.youtube");
        app.is_selected = true;
        db.save_app_selection(&app).await.unwrap();
        app.is_selected = false;
        db.save_app_selection(&app).await.unwrap();

        assert_eq!(
            db.load_app_selections().await.unwrap(),
            vec![("com.google.android.youtube".to_string(), false)]
        );
    }
}
