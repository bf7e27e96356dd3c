use chrono::NaiveDateTime;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{format_ts, ts_column};
use crate::db::DbPool;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub name_en: String,
    pub duration_days: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub status: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub auto_renew: bool,
}

/// A subscription eligible for renewal, with its plan when the plan row
/// still exists.
#[derive(Debug, Clone)]
pub struct RenewalCandidate {
    pub subscription: Subscription,
    pub plan: Option<Plan>,
}

impl Plan {
    #[cfg(test)]
    pub fn create(
        pool: &DbPool,
        name: &str,
        name_en: &str,
        duration_days: i64,
        price: f64,
    ) -> Result<i64, AppError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO plans (name, name_en, duration_days, price) VALUES (?1, ?2, ?3, ?4)",
            params![name, name_en, duration_days, price],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl Subscription {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Subscription {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            plan_id: row.get("plan_id")?,
            status: row.get("status")?,
            start_date: ts_column(row, "start_date")?,
            end_date: ts_column(row, "end_date")?,
            auto_renew: row.get::<_, i64>("auto_renew")? != 0,
        })
    }

    #[cfg(test)]
    pub fn create(
        pool: &DbPool,
        user_id: i64,
        plan_id: i64,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
        auto_renew: bool,
    ) -> Result<i64, AppError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO subscriptions (user_id, plan_id, status, start_date, end_date, auto_renew)
             VALUES (?1, ?2, 'active', ?3, ?4, ?5)",
            params![
                user_id,
                plan_id,
                format_ts(&start_date),
                format_ts(&end_date),
                auto_renew as i64
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    #[cfg(test)]
    pub fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Subscription>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare("SELECT * FROM subscriptions WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], Self::from_row)?;
        Ok(rows.next().transpose()?)
    }

    /// Active, auto-renewing subscriptions ending inside `[from, until]`.
    pub fn due_for_renewal(
        pool: &DbPool,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<RenewalCandidate>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT s.*, p.id AS p_id, p.name AS p_name, p.name_en AS p_name_en,
                    p.duration_days AS p_duration_days, p.price AS p_price
             FROM subscriptions s
             LEFT JOIN plans p ON p.id = s.plan_id
             WHERE s.status = 'active' AND s.auto_renew = 1
               AND s.end_date >= ?1 AND s.end_date <= ?2
             ORDER BY s.end_date, s.id",
        )?;
        let rows = stmt.query_map(params![format_ts(&from), format_ts(&until)], |row| {
            let plan = match row.get::<_, Option<i64>>("p_id")? {
                Some(id) => Some(Plan {
                    id,
                    name: row.get("p_name")?,
                    name_en: row.get("p_name_en")?,
                    duration_days: row.get("p_duration_days")?,
                    price: row.get("p_price")?,
                }),
                None => None,
            };
            Ok(RenewalCandidate {
                subscription: Self::from_row(row)?,
                plan,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Move `end_date` forward to `new_end`. Returns `false` when the row
    /// already ends there or later, i.e. another run renewed it first.
    pub fn extend(pool: &DbPool, id: i64, new_end: NaiveDateTime) -> Result<bool, AppError> {
        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE subscriptions SET end_date = ?2, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?1 AND end_date < ?2",
            params![id, format_ts(&new_end)],
        )?;
        Ok(changed == 1)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewalLog {
    pub id: i64,
    pub subscription_id: i64,
    pub user_id: i64,
    pub status: String,
    pub old_end_date: String,
    pub new_end_date: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
}

impl RenewalLog {
    pub fn log(
        pool: &DbPool,
        subscription_id: i64,
        user_id: i64,
        status: &str,
        old_end_date: &NaiveDateTime,
        new_end_date: Option<&NaiveDateTime>,
        error_message: Option<&str>,
    ) -> Result<(), AppError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO subscription_renewal_logs
                (subscription_id, user_id, status, old_end_date, new_end_date, error_message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                subscription_id,
                user_id,
                status,
                format_ts(old_end_date),
                new_end_date.map(format_ts),
                error_message
            ],
        )?;
        Ok(())
    }

    pub fn list(
        pool: &DbPool,
        subscription_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RenewalLog>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, subscription_id, user_id, status, old_end_date, new_end_date,
                    error_message, created_at
             FROM subscription_renewal_logs
             WHERE (?1 IS NULL OR subscription_id = ?1)
             ORDER BY id DESC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![subscription_id, limit, offset], |row| {
            Ok(RenewalLog {
                id: row.get(0)?,
                subscription_id: row.get(1)?,
                user_id: row.get(2)?,
                status: row.get(3)?,
                old_end_date: row.get(4)?,
                new_end_date: row.get(5)?,
                error_message: row.get(6)?,
                created_at: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn cleanup(pool: &DbPool, max_age_days: i64) -> Result<usize, AppError> {
        let conn = pool.get()?;
        let deleted = conn.execute(
            "DELETE FROM subscription_renewal_logs WHERE created_at < datetime('now', ?1)",
            params![format!("-{} days", max_age_days)],
        )?;
        Ok(deleted)
    }
}
