use chrono::{NaiveDate, NaiveTime};
use rusqlite::params;
use serde::Serialize;

use crate::db::DbPool;
use crate::error::AppError;

/// Who a reminder flag covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderTarget {
    Player,
    Admin,
}

impl ReminderTarget {
    fn column(self) -> &'static str {
        match self {
            ReminderTarget::Player => "player_reminder_sent",
            ReminderTarget::Admin => "admin_reminder_sent",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: i64,
    pub player_id: i64,
    pub booking_date: String,
    pub start_time: String,
    pub status: String,
    pub player_reminder_sent: bool,
    pub admin_reminder_sent: bool,
}

impl Booking {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Booking {
            id: row.get(0)?,
            player_id: row.get(1)?,
            booking_date: row.get(2)?,
            start_time: row.get(3)?,
            status: row.get(4)?,
            player_reminder_sent: row.get::<_, i64>(5)? != 0,
            admin_reminder_sent: row.get::<_, i64>(6)? != 0,
        })
    }

    const SELECT_COLS: &'static str = "id, player_id, booking_date, start_time, status, \
         player_reminder_sent, admin_reminder_sent";

    #[cfg(test)]
    pub fn create(
        pool: &DbPool,
        player_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        status: &str,
    ) -> Result<i64, AppError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO consultation_bookings (player_id, booking_date, start_time, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                player_id,
                date.format("%Y-%m-%d").to_string(),
                start.format("%H:%M:%S").to_string(),
                status
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    #[cfg(test)]
    pub fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Booking>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM consultation_bookings WHERE id = ?1",
            Self::SELECT_COLS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::from_row)?;
        Ok(rows.next().transpose()?)
    }

    /// Confirmed bookings on `date` starting inside `[from, until]`.
    /// Times are stored zero-padded so text comparison orders correctly.
    pub fn starting_between(
        pool: &DbPool,
        date: NaiveDate,
        from: NaiveTime,
        until: NaiveTime,
    ) -> Result<Vec<Booking>, AppError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM consultation_bookings
             WHERE status = 'confirmed' AND booking_date = ?1
               AND start_time >= ?2 AND start_time <= ?3
             ORDER BY start_time, id",
            Self::SELECT_COLS
        ))?;
        let rows = stmt.query_map(
            params![
                date.format("%Y-%m-%d").to_string(),
                from.format("%H:%M:%S").to_string(),
                until.format("%H:%M:%S").to_string()
            ],
            Self::from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Take the reminder flag for one recipient group. Only the caller that
    /// flips it from 0 to 1 gets `true`, so concurrent runs never both send.
    pub fn claim_reminder(pool: &DbPool, id: i64, target: ReminderTarget) -> Result<bool, AppError> {
        let conn = pool.get()?;
        let changed = conn.execute(
            &format!(
                "UPDATE consultation_bookings SET {col} = 1 WHERE id = ?1 AND {col} = 0",
                col = target.column()
            ),
            params![id],
        )?;
        Ok(changed == 1)
    }

    /// Hand a claimed flag back after a failed send so the next run retries.
    pub fn release_reminder(pool: &DbPool, id: i64, target: ReminderTarget) -> Result<(), AppError> {
        let conn = pool.get()?;
        conn.execute(
            &format!(
                "UPDATE consultation_bookings SET {} = 0 WHERE id = ?1",
                target.column()
            ),
            params![id],
        )?;
        Ok(())
    }
}
