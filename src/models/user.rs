use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Club,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Club => "club",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Role {
        match s {
            "admin" => Role::Admin,
            "club" => Role::Club,
            _ => Role::Player,
        }
    }
}

/// Application-side profile. Credentials and sessions are owned upstream.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: String,
}

impl User {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            full_name: row.get(2)?,
            role: Role::parse(&row.get::<_, String>(3)?),
            created_at: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        })
    }

    const SELECT_COLS: &'static str = "id, email, full_name, role, created_at";

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_club(&self) -> bool {
        self.role == Role::Club
    }

    pub fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, AppError> {
        let conn = pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", Self::SELECT_COLS),
                params![id],
                Self::from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_by_role(pool: &DbPool, role: Role) -> Result<Vec<User>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE role = ?1 ORDER BY id",
            Self::SELECT_COLS
        ))?;
        let rows = stmt.query_map(params![role.as_str()], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    #[cfg(test)]
    pub fn create(pool: &DbPool, email: &str, full_name: &str, role: Role) -> Result<i64, AppError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO users (email, full_name, role) VALUES (?1, ?2, ?3)",
            params![email, full_name, role.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
