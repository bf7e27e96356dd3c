use chrono::Utc;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::tokio;
use rocket::{Orbit, Rocket};
use std::sync::Arc;
use std::time::Duration;

use crate::functions::{run_auto_renewal, run_consultation_reminders};
use crate::notify::NotificationHub;
use crate::settings::keys;
use crate::store::Store;

/// In-process scheduler for the scheduled functions, for deployments with
/// no external caller. Intervals are in minutes and re-read every cycle.
pub struct BackgroundTasks;

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Background Tasks",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let (Some(store), Some(hub)) = (
            rocket.state::<Arc<dyn Store>>().cloned(),
            rocket.state::<Arc<NotificationHub>>().cloned(),
        ) else {
            log::error!("[task] store or notification hub not managed, tasks disabled");
            return;
        };

        // Subscription auto-renewal
        let s = Arc::clone(&store);
        tokio::spawn(async move {
            loop {
                let interval = get_interval(&*s, keys::TASK_AUTO_RENEW_INTERVAL, 60);
                tokio::time::sleep(interval).await;
                match run_auto_renewal(&*s, Utc::now().naive_utc()) {
                    Ok(summary) => {
                        if summary.processed > 0 {
                            log::info!(
                                "[task] Auto-renewal processed {} subscriptions",
                                summary.processed
                            );
                        }
                    }
                    Err(e) => log::error!("[task] Auto-renewal failed: {}", e),
                }
            }
        });

        // Consultation reminders
        let s = Arc::clone(&store);
        tokio::spawn(async move {
            loop {
                let interval = get_interval(&*s, keys::TASK_REMINDER_INTERVAL, 5);
                tokio::time::sleep(interval).await;
                match run_consultation_reminders(&*s, &hub, Utc::now().naive_utc()) {
                    Ok(summary) => {
                        let sent = summary.player_reminders.len() + summary.admin_reminders.len();
                        if sent > 0 {
                            log::info!("[task] Sent {} consultation reminders", sent);
                        }
                    }
                    Err(e) => log::error!("[task] Consultation reminders failed: {}", e),
                }
            }
        });

        // Renewal log cleanup
        let s = Arc::clone(&store);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                let max_age = s.setting_get_i64(keys::TASK_RENEWAL_LOG_MAX_AGE_DAYS, 180).max(1);
                match s.renewal_log_cleanup(max_age) {
                    Ok(count) => {
                        if count > 0 {
                            log::info!("[task] Cleaned up {} old renewal log entries", count);
                        }
                    }
                    Err(e) => log::error!("[task] Renewal log cleanup failed: {}", e),
                }
            }
        });

        log::info!("[task] Background tasks started");
    }
}

/// Sleep between runs. The setting is in minutes, at least one.
fn get_interval(store: &dyn Store, key: &str, default: i64) -> Duration {
    minutes(store.setting_get_i64(key, default))
}

fn minutes(value: i64) -> Duration {
    Duration::from_secs((value.max(1) as u64).saturating_mul(60))
}
