use rusqlite::params;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::DbPool;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageSection {
    pub id: i64,
    pub page_key: String,
    pub section_key: String,
    pub is_visible: bool,
    pub order_index: i64,
    pub settings: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionForm {
    pub page_key: String,
    pub section_key: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default)]
    pub settings: Value,
}

fn default_visible() -> bool {
    true
}

impl PageSection {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let raw: String = row.get(5)?;
        Ok(PageSection {
            id: row.get(0)?,
            page_key: row.get(1)?,
            section_key: row.get(2)?,
            is_visible: row.get::<_, i64>(3)? != 0,
            order_index: row.get(4)?,
            // An unparsable payload is kept as Null so the renderer uses defaults
            settings: serde_json::from_str(&raw).unwrap_or(Value::Null),
        })
    }

    const SELECT_COLS: &'static str =
        "id, page_key, section_key, is_visible, order_index, settings";

    /// All sections of a page, hidden ones included, in display order.
    pub fn list_for_page(pool: &DbPool, page_key: &str) -> Result<Vec<PageSection>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM page_sections WHERE page_key = ?1 ORDER BY order_index, id",
            Self::SELECT_COLS
        ))?;
        let rows = stmt.query_map(params![page_key], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Insert or replace the section identified by (page_key, section_key).
    pub fn upsert(pool: &DbPool, form: &SectionForm) -> Result<i64, AppError> {
        if form.page_key.trim().is_empty() || form.section_key.trim().is_empty() {
            return Err(AppError::Invalid("page_key and section_key are required".into()));
        }
        let conn = pool.get()?;
        let id: i64 = conn.query_row(
            "INSERT INTO page_sections (page_key, section_key, is_visible, order_index, settings)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(page_key, section_key) DO UPDATE SET
                is_visible = ?3, order_index = ?4, settings = ?5, updated_at = CURRENT_TIMESTAMP
             RETURNING id",
            params![
                form.page_key,
                form.section_key,
                form.is_visible as i64,
                form.order_index,
                form.settings.to_string()
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn set_visibility(pool: &DbPool, id: i64, visible: bool) -> Result<(), AppError> {
        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE page_sections SET is_visible = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
            params![id, visible as i64],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("section {}", id)));
        }
        Ok(())
    }
}
