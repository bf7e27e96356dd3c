use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::DbPool;
use crate::error::AppError;

/// One named row of the settings table. The value column holds JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: Value,
}

impl Setting {
    /// `Ok(None)` when the row does not exist. A row whose text is not valid
    /// JSON is reported as `Invalid`, never silently dropped.
    pub fn get(pool: &DbPool, key: &str) -> Result<Option<Value>, AppError> {
        let conn = pool.get()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Upsert the whole value.
    pub fn put(pool: &DbPool, key: &str, value: &Value) -> Result<(), AppError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = CURRENT_TIMESTAMP",
            params![key, value.to_string()],
        )?;
        Ok(())
    }

    /// Partial update: top-level fields of `partial` replace the stored
    /// ones, every other stored field is kept. The row must already exist.
    pub fn patch(pool: &DbPool, key: &str, partial: &Value) -> Result<Value, AppError> {
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        let raw: String = tx
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("setting '{}'", key)))?;

        let mut stored: Value = serde_json::from_str(&raw)?;
        merge_fields(&mut stored, partial)?;

        tx.execute(
            "UPDATE settings SET value = ?2, updated_at = CURRENT_TIMESTAMP WHERE key = ?1",
            params![key, stored.to_string()],
        )?;
        tx.commit()?;
        Ok(stored)
    }

    pub fn all(pool: &DbPool) -> Result<Vec<Setting>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (key, text) = row?;
            let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
            out.push(Setting { key, value });
        }
        Ok(out)
    }
}

/// Shallow merge of object fields. Both sides must be JSON objects.
pub fn merge_fields(stored: &mut Value, partial: &Value) -> Result<(), AppError> {
    let (Some(target), Some(fields)) = (stored.as_object_mut(), partial.as_object()) else {
        return Err(AppError::Invalid(
            "partial updates require object values".to_string(),
        ));
    };
    for (k, v) in fields {
        target.insert(k.clone(), v.clone());
    }
    Ok(())
}
