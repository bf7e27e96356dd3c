use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::booking::{Booking, ReminderTarget};
use crate::models::interest::{Interest, InterestForm};
use crate::models::notification::{Notification, NotificationForm};
use crate::models::section::{PageSection, SectionForm};
use crate::models::settings::Setting;
use crate::models::subscription::{RenewalCandidate, RenewalLog, Subscription};
use crate::models::user::{Role, User};

use super::Store;

/// SQLite-backed implementation of the Store trait.
/// Wraps the r2d2 connection pool and delegates to model methods.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool).map_err(|e| e.to_string())
    }

    fn seed_defaults(&self) -> Result<(), String> {
        crate::db::seed_defaults(&self.pool).map_err(|e| e.to_string())
    }

    // ── Settings ────────────────────────────────────────────────────

    fn setting_get(&self, key: &str) -> Result<Option<Value>, AppError> {
        Setting::get(&self.pool, key)
    }

    fn setting_put(&self, key: &str, value: &Value) -> Result<(), AppError> {
        Setting::put(&self.pool, key, value)
    }

    fn setting_patch(&self, key: &str, partial: &Value) -> Result<Value, AppError> {
        Setting::patch(&self.pool, key, partial)
    }

    fn setting_all(&self) -> Result<Vec<Setting>, AppError> {
        Setting::all(&self.pool)
    }

    // ── Page sections ───────────────────────────────────────────────

    fn section_list(&self, page_key: &str) -> Result<Vec<PageSection>, AppError> {
        PageSection::list_for_page(&self.pool, page_key)
    }

    fn section_upsert(&self, form: &SectionForm) -> Result<i64, AppError> {
        PageSection::upsert(&self.pool, form)
    }

    fn section_set_visibility(&self, id: i64, visible: bool) -> Result<(), AppError> {
        PageSection::set_visibility(&self.pool, id, visible)
    }

    // ── Users ───────────────────────────────────────────────────────

    fn user_get(&self, id: i64) -> Result<Option<User>, AppError> {
        User::get_by_id(&self.pool, id)
    }

    fn user_list_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        User::list_by_role(&self.pool, role)
    }

    // ── Subscriptions ───────────────────────────────────────────────

    fn subscription_due_for_renewal(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<RenewalCandidate>, AppError> {
        Subscription::due_for_renewal(&self.pool, from, until)
    }

    fn subscription_extend(&self, id: i64, new_end: NaiveDateTime) -> Result<bool, AppError> {
        Subscription::extend(&self.pool, id, new_end)
    }

    fn renewal_log(
        &self,
        subscription_id: i64,
        user_id: i64,
        status: &str,
        old_end_date: &NaiveDateTime,
        new_end_date: Option<&NaiveDateTime>,
        error_message: Option<&str>,
    ) -> Result<(), AppError> {
        RenewalLog::log(
            &self.pool,
            subscription_id,
            user_id,
            status,
            old_end_date,
            new_end_date,
            error_message,
        )
    }

    fn renewal_log_list(
        &self,
        subscription_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RenewalLog>, AppError> {
        RenewalLog::list(&self.pool, subscription_id, limit, offset)
    }

    fn renewal_log_cleanup(&self, max_age_days: i64) -> Result<usize, AppError> {
        RenewalLog::cleanup(&self.pool, max_age_days)
    }

    // ── Consultation bookings ───────────────────────────────────────

    fn booking_starting_between(
        &self,
        date: NaiveDate,
        from: NaiveTime,
        until: NaiveTime,
    ) -> Result<Vec<Booking>, AppError> {
        Booking::starting_between(&self.pool, date, from, until)
    }

    fn booking_claim_reminder(&self, id: i64, target: ReminderTarget) -> Result<bool, AppError> {
        Booking::claim_reminder(&self.pool, id, target)
    }

    fn booking_release_reminder(&self, id: i64, target: ReminderTarget) -> Result<(), AppError> {
        Booking::release_reminder(&self.pool, id, target)
    }

    // ── Notifications ───────────────────────────────────────────────

    fn notification_create(&self, form: &NotificationForm) -> Result<i64, AppError> {
        Notification::create(&self.pool, form)
    }

    fn notification_list(&self, user_id: i64, limit: i64) -> Result<Vec<Notification>, AppError> {
        Notification::list_for_user(&self.pool, user_id, limit)
    }

    fn notification_unread_count(&self, user_id: i64) -> Result<i64, AppError> {
        Notification::unread_count(&self.pool, user_id)
    }

    fn notification_mark_read(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        Notification::mark_read(&self.pool, user_id, id)
    }

    // ── Interests ───────────────────────────────────────────────────

    fn interest_create(&self, club_id: i64, form: &InterestForm) -> Result<i64, AppError> {
        Interest::create(&self.pool, club_id, form)
    }

    fn interest_list_for_club(&self, club_id: i64) -> Result<Vec<Interest>, AppError> {
        Interest::list_for_club(&self.pool, club_id)
    }
}
