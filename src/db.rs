use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde_json::json;

use crate::settings::content::{FooterSettings, HeroSlider, MenuItems, SiteSettings};
use crate::settings::keys;
use crate::theme::ThemeColors;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool_at(path: &str) -> Result<DbPool, String> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(10)
        .build(manager)
        .map_err(|e| e.to_string())?;

    // WAL for concurrent readers while an admin or a scheduled function writes
    let conn = pool.get().map_err(|e| e.to_string())?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .map_err(|e| e.to_string())?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Settings (key -> JSON value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Page sections
        CREATE TABLE IF NOT EXISTS page_sections (
            id INTEGER PRIMARY KEY,
            page_key TEXT NOT NULL,
            section_key TEXT NOT NULL,
            is_visible INTEGER NOT NULL DEFAULT 1,
            order_index INTEGER NOT NULL DEFAULT 0,
            settings TEXT NOT NULL DEFAULT '{}',
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(page_key, section_key)
        );

        CREATE INDEX IF NOT EXISTS idx_sections_page ON page_sections(page_key, order_index);

        -- Users (identity lives upstream; this holds profile + role)
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            full_name TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT 'player',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Subscription plans
        CREATE TABLE IF NOT EXISTS plans (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            name_en TEXT NOT NULL DEFAULT '',
            duration_days INTEGER NOT NULL,
            price REAL NOT NULL DEFAULT 0
        );

        -- Subscriptions
        CREATE TABLE IF NOT EXISTS subscriptions (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            plan_id INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            start_date DATETIME NOT NULL,
            end_date DATETIME NOT NULL,
            auto_renew INTEGER NOT NULL DEFAULT 0,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOREIGN KEY (plan_id) REFERENCES plans(id)
        );

        CREATE INDEX IF NOT EXISTS idx_subscriptions_renew
            ON subscriptions(status, auto_renew, end_date);

        -- One row per auto-renewal attempt
        CREATE TABLE IF NOT EXISTS subscription_renewal_logs (
            id INTEGER PRIMARY KEY,
            subscription_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            status TEXT NOT NULL,
            old_end_date DATETIME NOT NULL,
            new_end_date DATETIME,
            error_message TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Consultation bookings
        CREATE TABLE IF NOT EXISTS consultation_bookings (
            id INTEGER PRIMARY KEY,
            player_id INTEGER NOT NULL,
            booking_date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            player_reminder_sent INTEGER NOT NULL DEFAULT 0,
            admin_reminder_sent INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (player_id) REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_date ON consultation_bookings(booking_date, status);

        -- Notifications
        CREATE TABLE IF NOT EXISTS notifications (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            title_en TEXT NOT NULL DEFAULT '',
            message TEXT NOT NULL,
            message_en TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL DEFAULT 'info',
            link TEXT,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read);

        -- Club interest in players
        CREATE TABLE IF NOT EXISTS player_interests (
            id INTEGER PRIMARY KEY,
            club_id INTEGER NOT NULL,
            player_id INTEGER NOT NULL,
            note TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(club_id, player_id),
            FOREIGN KEY (club_id) REFERENCES users(id),
            FOREIGN KEY (player_id) REFERENCES users(id)
        );
        ",
    )?;

    Ok(())
}

/// Insert default rows for required settings. Existing rows are never
/// touched. Optional settings (advanced social list, style overrides) are
/// deliberately absent so legacy and fresh installs read the same way.
pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let defaults = vec![
        (keys::THEME_COLORS, serde_json::to_value(ThemeColors::default())?),
        (keys::SITE_SETTINGS, serde_json::to_value(SiteSettings::default())?),
        (keys::MENU_ITEMS, serde_json::to_value(MenuItems::default())?),
        (keys::HERO_SLIDER, serde_json::to_value(HeroSlider::default())?),
        (keys::FOOTER_SETTINGS, serde_json::to_value(FooterSettings::default())?),
        (keys::TASK_AUTO_RENEW_INTERVAL, json!(60)),
        (keys::TASK_REMINDER_INTERVAL, json!(5)),
        (keys::TASK_RENEWAL_LOG_MAX_AGE_DAYS, json!(180)),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value.to_string()],
        )?;
    }

    Ok(())
}
