//! Scheduled functions. An external scheduler calls these over HTTP with
//! the service credential; the background tasks call the same entry points
//! in-process.

use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

use crate::error::AppError;
use crate::notify::NotificationHub;
use crate::security::auth::ServiceCaller;
use crate::store::Store;

pub mod reminders;
pub mod renewal;

pub use reminders::{run_consultation_reminders, ReminderSummary};
pub use renewal::{run_auto_renewal, RenewalSummary};

#[post("/auto-renew-subscriptions")]
pub fn auto_renew_subscriptions(
    _caller: ServiceCaller,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<RenewalSummary>, AppError> {
    let summary = run_auto_renewal(&**store.inner(), Utc::now().naive_utc())?;
    log::info!("[functions] auto-renewal processed {} subscriptions", summary.processed);
    Ok(Json(summary))
}

#[post("/consultation-reminders")]
pub fn consultation_reminders(
    _caller: ServiceCaller,
    store: &State<Arc<dyn Store>>,
    hub: &State<Arc<NotificationHub>>,
) -> Result<Json<ReminderSummary>, AppError> {
    let summary =
        run_consultation_reminders(&**store.inner(), hub, Utc::now().naive_utc())?;
    log::info!("[functions] {}", summary.message);
    Ok(Json(summary))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![auto_renew_subscriptions, consultation_reminders]
}
