use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::AppError;
use crate::models::booking::{Booking, ReminderTarget};
use crate::models::notification::NotificationForm;
use crate::models::user::Role;
use crate::notify::NotificationHub;
use crate::store::Store;

/// Bookings starting within this many minutes get a reminder.
pub const REMINDER_LEAD_MINUTES: i64 = 60;

const REMINDER_KIND: &str = "consultation_reminder";
const REMINDER_LINK: &str = "/consultations";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminReminder {
    pub booking_id: i64,
    pub admin_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSummary {
    pub success: bool,
    pub message: String,
    /// Booking ids whose player was notified in this run.
    pub player_reminders: Vec<i64>,
    pub admin_reminders: Vec<AdminReminder>,
}

/// End of the reminder window, clamped to the end of the current day.
fn window_end(start: NaiveTime) -> NaiveTime {
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(REMINDER_LEAD_MINUTES));
    if wrapped != 0 {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(start)
    } else {
        end
    }
}

fn display_time(start_time: &str) -> &str {
    start_time.get(..5).unwrap_or(start_time)
}

fn player_notice(booking: &Booking) -> NotificationForm {
    let at = display_time(&booking.start_time);
    NotificationForm {
        user_id: booking.player_id,
        title: "تذكير بموعد الاستشارة".to_string(),
        title_en: "Consultation reminder".to_string(),
        message: format!("تبدأ استشارتك اليوم الساعة {}", at),
        message_en: format!("Your consultation starts today at {}", at),
        kind: REMINDER_KIND.to_string(),
        link: Some(REMINDER_LINK.to_string()),
    }
}

fn admin_notice(booking: &Booking, admin_id: i64) -> NotificationForm {
    let at = display_time(&booking.start_time);
    NotificationForm {
        user_id: admin_id,
        title: "استشارة قادمة".to_string(),
        title_en: "Upcoming consultation".to_string(),
        message: format!("استشارة رقم {} تبدأ اليوم الساعة {}", booking.id, at),
        message_en: format!("Consultation #{} starts today at {}", booking.id, at),
        kind: REMINDER_KIND.to_string(),
        link: Some(format!("/admin/consultations/{}", booking.id)),
    }
}

/// Take a reminder flag. A run that loses the race, or cannot reach the
/// store, leaves the booking to whoever holds the flag.
fn claim(store: &dyn Store, booking_id: i64, target: ReminderTarget) -> bool {
    match store.booking_claim_reminder(booking_id, target) {
        Ok(claimed) => claimed,
        Err(e) => {
            log::error!(
                "[functions] could not claim {:?} reminder for booking {}: {}",
                target,
                booking_id,
                e
            );
            false
        }
    }
}

fn release(store: &dyn Store, booking_id: i64, target: ReminderTarget) {
    if let Err(e) = store.booking_release_reminder(booking_id, target) {
        log::error!(
            "[functions] could not release {:?} reminder for booking {}: {}",
            target,
            booking_id,
            e
        );
    }
}

/// Remind players and admins of confirmed consultations starting within the
/// next hour today. Each flag is claimed before sending and released again
/// when a send fails.
pub fn run_consultation_reminders(
    store: &dyn Store,
    hub: &NotificationHub,
    now: NaiveDateTime,
) -> Result<ReminderSummary, AppError> {
    let from = now.time();
    let bookings = store.booking_starting_between(now.date(), from, window_end(from))?;
    let admins = store.user_list_by_role(Role::Admin)?;

    let mut player_reminders = Vec::new();
    let mut admin_reminders = Vec::new();

    for booking in &bookings {
        if !booking.player_reminder_sent && claim(store, booking.id, ReminderTarget::Player) {
            match store.notification_create(&player_notice(booking)) {
                Ok(_) => {
                    hub.publish(booking.player_id);
                    player_reminders.push(booking.id);
                }
                Err(e) => {
                    log::error!(
                        "[functions] player reminder for booking {} failed: {}",
                        booking.id,
                        e
                    );
                    release(store, booking.id, ReminderTarget::Player);
                }
            }
        }

        if !booking.admin_reminder_sent && claim(store, booking.id, ReminderTarget::Admin) {
            let mut all_sent = true;
            for admin in &admins {
                match store.notification_create(&admin_notice(booking, admin.id)) {
                    Ok(_) => {
                        hub.publish(admin.id);
                        admin_reminders.push(AdminReminder {
                            booking_id: booking.id,
                            admin_id: admin.id,
                        });
                    }
                    Err(e) => {
                        all_sent = false;
                        log::error!(
                            "[functions] admin reminder for booking {} to {} failed: {}",
                            booking.id,
                            admin.id,
                            e
                        );
                    }
                }
            }
            if !all_sent {
                release(store, booking.id, ReminderTarget::Admin);
            }
        }
    }

    Ok(ReminderSummary {
        success: true,
        message: format!(
            "Processed {} bookings: {} player reminders, {} admin reminders",
            bookings.len(),
            player_reminders.len(),
            admin_reminders.len()
        ),
        player_reminders,
        admin_reminders,
    })
}
