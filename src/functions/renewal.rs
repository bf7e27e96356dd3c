use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::error::AppError;
use crate::models::format_ts;
use crate::models::subscription::RenewalCandidate;
use crate::store::Store;

/// Subscriptions ending within this window are renewed.
pub const RENEWAL_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenewalStatus {
    Success,
    Failed,
}

impl RenewalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenewalStatus::Success => "success",
            RenewalStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalResult {
    pub subscription_id: i64,
    pub user_id: i64,
    pub status: RenewalStatus,
    pub old_end_date: String,
    pub new_end_date: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewalSummary {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<RenewalResult>,
}

/// Extend every active auto-renewing subscription that ends within the next
/// day by its plan's duration. Records are handled one at a time; a failed
/// record is logged and the run moves on.
pub fn run_auto_renewal(store: &dyn Store, now: NaiveDateTime) -> Result<RenewalSummary, AppError> {
    let until = now + Duration::hours(RENEWAL_WINDOW_HOURS);
    let due = store.subscription_due_for_renewal(now, until)?;
    let results: Vec<RenewalResult> = due.iter().filter_map(|c| renew_one(store, c)).collect();
    Ok(RenewalSummary {
        success: true,
        processed: results.len(),
        results,
    })
}

/// `end + days`, or `None` when the duration is not positive or the date
/// would leave chrono's range.
fn extended_end(end: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    if days <= 0 {
        return None;
    }
    Duration::try_days(days).and_then(|d| end.checked_add_signed(d))
}

/// `None` when another run renewed the subscription first; that run owns
/// the result and the log row.
fn renew_one(store: &dyn Store, candidate: &RenewalCandidate) -> Option<RenewalResult> {
    let sub = &candidate.subscription;
    let outcome = match &candidate.plan {
        None => Err(format!("plan {} not found", sub.plan_id)),
        Some(plan) => match extended_end(sub.end_date, plan.duration_days) {
            None => Err(format!(
                "plan {} has an unusable duration of {} days",
                plan.id, plan.duration_days
            )),
            Some(new_end) => match store.subscription_extend(sub.id, new_end) {
                Ok(true) => Ok(new_end),
                Ok(false) => {
                    log::info!("[functions] subscription {} already renewed", sub.id);
                    return None;
                }
                Err(e) => Err(e.to_string()),
            },
        },
    };

    let (status, new_end, error) = match outcome {
        Ok(new_end) => (RenewalStatus::Success, Some(new_end), None),
        Err(e) => {
            log::error!("[functions] renewal of subscription {} failed: {}", sub.id, e);
            (RenewalStatus::Failed, None, Some(e))
        }
    };

    if let Err(e) = store.renewal_log(
        sub.id,
        sub.user_id,
        status.as_str(),
        &sub.end_date,
        new_end.as_ref(),
        error.as_deref(),
    ) {
        log::error!("[functions] renewal log for subscription {} not written: {}", sub.id, e);
    }

    Some(RenewalResult {
        subscription_id: sub.id,
        user_id: sub.user_id,
        status,
        old_end_date: format_ts(&sub.end_date),
        new_end_date: new_end.as_ref().map(format_ts),
        error,
    })
}
