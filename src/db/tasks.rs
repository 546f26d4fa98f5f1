//! Task CRUD operations.

use super::Database;
use crate::error::{StoreError, StoreResult};
use crate::types::{NewTask, Task};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

const SELECT_TASK: &str = "SELECT id, title, text, status FROM tasks";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        text: row.get("text")?,
        status: row.get("status")?,
    })
}

/// Internal helper to get a task using an existing connection.
fn get_task_internal(conn: &Connection, task_id: i64) -> StoreResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{SELECT_TASK} WHERE id = ?1"))?;
    let task = stmt.query_row(params![task_id], parse_task_row).optional()?;
    Ok(task)
}

impl Database {
    /// Insert a new task and return it with its assigned id.
    pub fn create_task(&self, new_task: NewTask) -> StoreResult<Task> {
        let task = self.with_session(|tx| {
            tx.execute(
                "INSERT INTO tasks (title, text, status) VALUES (?1, ?2, ?3)",
                params![new_task.title, new_task.text, new_task.status],
            )?;
            let id = tx.last_insert_rowid();
            Ok(Task {
                id,
                title: new_task.title,
                text: new_task.text,
                status: new_task.status,
            })
        })?;

        debug!(task_id = task.id, "Created task");
        Ok(task)
    }

    /// Get a task by id.
    pub fn get_task(&self, task_id: i64) -> StoreResult<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// List every task, oldest first.
    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_TASK} ORDER BY id"))?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// List tasks whose status matches `done`, oldest first.
    pub fn list_tasks_by_status(&self, done: bool) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_TASK} WHERE status = ?1 ORDER BY id"))?;
            let tasks = stmt
                .query_map(params![done], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Mark a task as done. Marking an already-done task succeeds without change.
    pub fn mark_task_done(&self, task_id: i64) -> StoreResult<Task> {
        self.with_session(|tx| {
            let mut task =
                get_task_internal(tx, task_id)?.ok_or(StoreError::NotFound(task_id))?;

            if !task.status {
                tx.execute("UPDATE tasks SET status = 1 WHERE id = ?1", params![task_id])?;
                task.status = true;
                debug!(task_id, "Marked task done");
            }

            Ok(task)
        })
    }

    /// Permanently delete a task.
    pub fn delete_task(&self, task_id: i64) -> StoreResult<()> {
        self.with_session(|tx| {
            let deleted = tx.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            if deleted == 0 {
                return Err(StoreError::NotFound(task_id));
            }
            debug!(task_id, "Deleted task");
            Ok(())
        })
    }
}
