use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub title_en: String,
    pub message: String,
    pub message_en: String,
    pub kind: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationForm {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub title_en: String,
    pub message: String,
    #[serde(default)]
    pub message_en: String,
    pub kind: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl Notification {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Notification {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            title_en: row.get(3)?,
            message: row.get(4)?,
            message_en: row.get(5)?,
            kind: row.get(6)?,
            link: row.get(7)?,
            is_read: row.get::<_, i64>(8)? != 0,
            created_at: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        })
    }

    pub fn create(pool: &DbPool, form: &NotificationForm) -> Result<i64, AppError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO notifications (user_id, title, title_en, message, message_en, kind, link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                form.user_id,
                form.title,
                form.title_en,
                form.message,
                form.message_en,
                form.kind,
                form.link
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_for_user(
        pool: &DbPool,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Notification>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, title_en, message, message_en, kind, link, is_read, created_at
             FROM notifications WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn unread_count(pool: &DbPool, user_id: i64) -> Result<i64, AppError> {
        let conn = pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Mark one of the user's notifications read. Another user's id is
    /// reported as not found.
    pub fn mark_read(pool: &DbPool, user_id: i64, id: i64) -> Result<(), AppError> {
        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("notification {}", id)));
        }
        Ok(())
    }
}
