//! Notification query functions.

use rusqlite::Connection;
use revshare_engine::store::NotificationEntry;
use serde::Serialize;

use crate::{DbError, Result};

/// Append a notification for a user.
pub fn insert(
    conn: &Connection,
    id: &str,
    user_id: &str,
    entry: &NotificationEntry,
    created_at: u64,
) -> Result<()> {
    let data = serde_json::to_string(&entry.data)
        .map_err(|e| DbError::Serialization(e.to_string()))?;
    conn.execute(
        "INSERT INTO notifications (id, user_id, kind, title, message, data, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id,
            user_id,
            entry.kind,
            entry.title,
            entry.message,
            data,
            created_at as i64,
        ],
    )?;
    Ok(())
}

/// Notifications for a user, newest first.
pub fn list_for_user(
    conn: &Connection,
    user_id: &str,
    unread_only: bool,
) -> Result<Vec<NotificationRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, title, message, data, is_read, created_at
         FROM notifications
         WHERE user_id = ?1 AND (?2 = 0 OR is_read = 0)
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let raw = stmt
        .query_map(rusqlite::params![user_id, unread_only], |row| {
            Ok((
                NotificationRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    kind: row.get(2)?,
                    title: row.get(3)?,
                    message: row.get(4)?,
                    data: serde_json::Value::Null,
                    read: row.get(6)?,
                    created_at: row.get::<_, i64>(7)? as u64,
                },
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(mut row, data)| {
            row.data = serde_json::from_str(&data)
                .map_err(|e| DbError::Serialization(e.to_string()))?;
            Ok(row)
        })
        .collect()
}

/// Mark a notification as read.
pub fn mark_read(conn: &Connection, id: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1",
        [id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("notification '{id}'")));
    }
    Ok(())
}

/// A raw notification row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub read: bool,
    pub created_at: u64,
}
