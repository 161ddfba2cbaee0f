use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::db::{
    helpers::{parse_datetime, parse_optional_datetime, to_i64, to_u64},
    Database,
};
use crate::models::{Task, TaskId};

const NEXT_TASK_ID_KEY: &str = "next_task_id";

impl Database {
    pub async fn insert_task(&self, task: &Task) -> Result<()> {
        let record = task.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, title, allowed_minutes, is_completed, created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    to_i64(record.id)?,
                    record.title,
                    record.allowed_minutes,
                    record.is_completed,
                    record.created_at.to_rfc3339(),
                    record.completed_at.map(|dt| dt.to_rfc3339()),
                ],
            )
            .context("failed to insert task")?;
            Ok(())
        })
        .await
    }

    /// Only ever sets the flag; a completed row is never reverted.
    pub async fn mark_task_completed(&self, id: TaskId, completed_at: DateTime<Utc>) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "UPDATE tasks
                 SET is_completed = 1,
                     completed_at = COALESCE(completed_at, ?1)
                 WHERE id = ?2",
                params![completed_at.to_rfc3339(), to_i64(id)?],
            )
            .context("failed to mark task completed")?;
            Ok(())
        })
        .await
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![to_i64(id)?])
                .context("failed to delete task")?;
            Ok(())
        })
        .await
    }

    pub async fn load_tasks(&self) -> Result<Vec<Task>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, allowed_minutes, is_completed, created_at, completed_at
                 FROM tasks
                 ORDER BY id ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(Task {
                    id: to_u64(row.get::<_, i64>(0)?, "id")?,
                    title: row.get(1)?,
                    allowed_minutes: row.get(2)?,
                    is_completed: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?, "created_at")?,
                    completed_at: parse_optional_datetime(row.get(5)?, "completed_at")?,
                });
            }

            Ok(tasks)
        })
        .await
    }

    pub async fn set_next_task_id(&self, next_id: TaskId) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO gate_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![NEXT_TASK_ID_KEY, next_id.to_string()],
            )
            .context("failed to store task id allocator")?;
            Ok(())
        })
        .await
    }

    pub async fn next_task_id(&self) -> Result<Option<TaskId>> {
        self.execute(|conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT value FROM gate_meta WHERE key = ?1",
                    params![NEXT_TASK_ID_KEY],
                    |row| row.get(0),
                )
                .optional()?;

            raw.map(|value| {
                value
                    .parse::<TaskId>()
                    .with_context(|| format!("invalid {NEXT_TASK_ID_KEY} '{value}'"))
            })
            .transpose()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("taskgate.sqlite3")).unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn tasks_survive_reopen() {
        let (dir, db) = open();
        let now = Utc::now();
        db.insert_task(&Task::new(0, "write report".into(), 45, now)).await.unwrap();
        db.insert_task(&Task::new(1, "gym".into(), 60, now)).await.unwrap();
        db.mark_task_completed(1, now).await.unwrap();
        db.set_next_task_id(2).await.unwrap();
        drop(db);

        let db = Database::new(dir.path().join("taskgate.sqlite3")).unwrap();
        let tasks = db.load_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "write report");
        assert!(!tasks[0].is_completed);
        assert!(tasks[1].is_completed);
        assert!(tasks[1].completed_at.is_some());
        assert_eq!(db.next_task_id().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn completion_keeps_first_timestamp() {
        let (_dir, db) = open();
        let first = Utc::now();
        db.insert_task(&Task::new(0, "read".into(), 10, first)).await.unwrap();
        db.mark_task_completed(0, first).await.unwrap();
        db.mark_task_completed(0, first + chrono::Duration::minutes(5)).await.unwrap();

        let tasks = db.load_tasks().await.unwrap();
        assert_eq!(
            tasks[0].completed_at.map(|dt| dt.timestamp()),
            Some(first.timestamp())
        );
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let (_dir, db) = open();
        db.insert_task(&Task::new(3, "call mom".into(), 5, Utc::now())).await.unwrap();
        db.delete_task(3).await.unwrap();
        assert!(db.load_tasks().await.unwrap().is_empty());
        assert_eq!(db.next_task_id().await.unwrap(), None);
    }
}
