use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::error::AppError;
use crate::models::booking::{Booking, ReminderTarget};
use crate::models::interest::{Interest, InterestForm};
use crate::models::notification::{Notification, NotificationForm};
use crate::models::section::{PageSection, SectionForm};
use crate::models::settings::Setting;
use crate::models::subscription::{RenewalCandidate, RenewalLog};
use crate::models::user::{Role, User};

pub mod sqlite;

/// Unified data-access trait. Every database operation goes through here,
/// so the backing platform can be swapped without touching the handlers.
/// Implementation: `SqliteStore` (wraps rusqlite/r2d2).
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), String>;
    fn seed_defaults(&self) -> Result<(), String>;

    // ── Settings ────────────────────────────────────────────────────
    fn setting_get(&self, key: &str) -> Result<Option<Value>, AppError>;
    fn setting_put(&self, key: &str, value: &Value) -> Result<(), AppError>;
    fn setting_patch(&self, key: &str, partial: &Value) -> Result<Value, AppError>;
    fn setting_all(&self) -> Result<Vec<Setting>, AppError>;
    fn setting_get_i64(&self, key: &str, default: i64) -> i64 {
        self.setting_get(key)
            .ok()
            .flatten()
            .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(default)
    }

    // ── Page sections ───────────────────────────────────────────────
    fn section_list(&self, page_key: &str) -> Result<Vec<PageSection>, AppError>;
    fn section_upsert(&self, form: &SectionForm) -> Result<i64, AppError>;
    fn section_set_visibility(&self, id: i64, visible: bool) -> Result<(), AppError>;

    // ── Users ───────────────────────────────────────────────────────
    fn user_get(&self, id: i64) -> Result<Option<User>, AppError>;
    fn user_list_by_role(&self, role: Role) -> Result<Vec<User>, AppError>;

    // ── Subscriptions ───────────────────────────────────────────────
    fn subscription_due_for_renewal(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<RenewalCandidate>, AppError>;
    fn subscription_extend(&self, id: i64, new_end: NaiveDateTime) -> Result<bool, AppError>;
    fn renewal_log(
        &self,
        subscription_id: i64,
        user_id: i64,
        status: &str,
        old_end_date: &NaiveDateTime,
        new_end_date: Option<&NaiveDateTime>,
        error_message: Option<&str>,
    ) -> Result<(), AppError>;
    fn renewal_log_list(
        &self,
        subscription_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RenewalLog>, AppError>;
    fn renewal_log_cleanup(&self, max_age_days: i64) -> Result<usize, AppError>;

    // ── Consultation bookings ───────────────────────────────────────
    fn booking_starting_between(
        &self,
        date: NaiveDate,
        from: NaiveTime,
        until: NaiveTime,
    ) -> Result<Vec<Booking>, AppError>;
    fn booking_claim_reminder(&self, id: i64, target: ReminderTarget) -> Result<bool, AppError>;
    fn booking_release_reminder(&self, id: i64, target: ReminderTarget) -> Result<(), AppError>;

    // ── Notifications ───────────────────────────────────────────────
    fn notification_create(&self, form: &NotificationForm) -> Result<i64, AppError>;
    fn notification_list(&self, user_id: i64, limit: i64) -> Result<Vec<Notification>, AppError>;
    fn notification_unread_count(&self, user_id: i64) -> Result<i64, AppError>;
    fn notification_mark_read(&self, user_id: i64, id: i64) -> Result<(), AppError>;

    // ── Interests ───────────────────────────────────────────────────
    fn interest_create(&self, club_id: i64, form: &InterestForm) -> Result<i64, AppError>;
    fn interest_list_for_club(&self, club_id: i64) -> Result<Vec<Interest>, AppError>;
}
