use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Interest {
    pub id: i64,
    pub club_id: i64,
    pub player_id: i64,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterestForm {
    pub player_id: i64,
    #[serde(default)]
    pub note: Option<String>,
}

impl Interest {
    /// Register a club's interest in a player. A second registration for
    /// the same pair surfaces as `AppError::Duplicate`.
    pub fn create(pool: &DbPool, club_id: i64, form: &InterestForm) -> Result<i64, AppError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO player_interests (club_id, player_id, note) VALUES (?1, ?2, ?3)",
            params![club_id, form.player_id, form.note],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_for_club(pool: &DbPool, club_id: i64) -> Result<Vec<Interest>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, club_id, player_id, note, created_at FROM player_interests
             WHERE club_id = ?1 ORDER BY id DESC",
        )?;
        let rows = stmt.query_map(params![club_id], |row| {
            Ok(Interest {
                id: row.get(0)?,
                club_id: row.get(1)?,
                player_id: row.get(2)?,
                note: row.get(3)?,
                created_at: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
