#![cfg(test)]

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{run_migrations, seed_defaults, DbPool};
use crate::error::AppError;
use crate::functions::renewal::RenewalStatus;
use crate::functions::{run_auto_renewal, run_consultation_reminders};
use crate::i18n::Lang;
use crate::models::booking::{Booking, ReminderTarget};
use crate::models::interest::InterestForm;
use crate::models::section::SectionForm;
use crate::models::subscription::{Plan, Subscription};
use crate::models::user::{Role, User};
use crate::notify::NotificationHub;
use crate::sections::compose_section;
use crate::settings::content::SiteSettings;
use crate::settings::{keys, Fetched, Missing, SettingsClient};
use crate::storage::StorageService;
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Create a fresh in-memory SQLite pool with all migrations + seed defaults applied.
/// Uses a named shared-cache in-memory DB so multiple connections see the same data.
fn test_pool() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:testdb_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    }
    run_migrations(&pool).expect("Failed to run migrations");
    seed_defaults(&pool).expect("Failed to seed defaults");
    pool
}

fn test_store() -> (DbPool, Arc<dyn Store>) {
    let pool = test_pool();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool.clone()));
    (pool, store)
}

fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(time.0, time.1, time.2)
        .unwrap()
}

fn test_config(secret: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.functions.service_secret = secret.to_string();
    config.storage.signing_key = "test-signing-key".to_string();
    config.storage.root = std::env::temp_dir()
        .join(format!("kora-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    config
}

fn client(store: Arc<dyn Store>, config: AppConfig) -> Client {
    Client::tracked(crate::app(store, config)).expect("valid rocket instance")
}

// ═══════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════

#[test]
fn seeded_settings_present() {
    let (_pool, store) = test_store();
    for key in [
        keys::THEME_COLORS,
        keys::SITE_SETTINGS,
        keys::MENU_ITEMS,
        keys::HERO_SLIDER,
        keys::FOOTER_SETTINGS,
    ] {
        assert!(store.setting_get(key).unwrap().is_some(), "{} not seeded", key);
    }
    assert!(store.setting_get(keys::SOCIAL_PLATFORMS).unwrap().is_none());
    assert_eq!(store.setting_get_i64(keys::TASK_REMINDER_INTERVAL, 99), 5);
}

#[test]
fn seed_does_not_overwrite() {
    let (pool, store) = test_store();
    store
        .setting_put(keys::SITE_SETTINGS, &json!({"site_name": "نادي"}))
        .unwrap();
    seed_defaults(&pool).unwrap();
    let value = store.setting_get(keys::SITE_SETTINGS).unwrap().unwrap();
    assert_eq!(value["site_name"], "نادي");
}

#[test]
fn patch_keeps_unspecified_fields() {
    let (_pool, store) = test_store();
    let updated = store
        .setting_patch(keys::SITE_SETTINGS, &json!({"site_name": "كورة برو"}))
        .unwrap();
    assert_eq!(updated["site_name"], "كورة برو");
    assert_eq!(updated["site_name_en"], "Kora");
    let stored = store.setting_get(keys::SITE_SETTINGS).unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[test]
fn patch_of_missing_key_is_not_found() {
    let (_pool, store) = test_store();
    let err = store
        .setting_patch(keys::SOCIAL_PLATFORMS, &json!({"platforms": []}))
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn client_sees_its_own_writes() {
    let (_pool, store) = test_store();
    let client = SettingsClient::new(Arc::clone(&store));
    let before: SiteSettings = client.load_or_default(keys::SITE_SETTINGS, Missing::Fail);
    assert_eq!(before.site_name_en, "Kora");

    client
        .patch(keys::SITE_SETTINGS, &json!({"site_name_en": "Kora Pro"}))
        .unwrap();
    let after: SiteSettings = client.load_or_default(keys::SITE_SETTINGS, Missing::Fail);
    assert_eq!(after.site_name_en, "Kora Pro");
    assert_eq!(after.site_name, before.site_name);
}

#[test]
fn missing_policy_decides_absence() {
    let (_pool, store) = test_store();
    let client = SettingsClient::new(store);
    assert!(matches!(
        client.fetch(keys::SOCIAL_PLATFORMS, Missing::UseDefault),
        Fetched::UsingDefault
    ));
    match client.fetch("no_such_key", Missing::Fail) {
        Fetched::Failed(e) => assert!(matches!(e, AppError::NotFound(_))),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn wrong_shape_is_a_failure_not_a_partial_parse() {
    let (_pool, store) = test_store();
    store
        .setting_put(keys::HERO_SLIDER, &json!({"slides": "oops"}))
        .unwrap();
    let client = SettingsClient::new(store);
    let fetched = client.fetch_as::<crate::settings::content::HeroSlider>(
        keys::HERO_SLIDER,
        Missing::Fail,
    );
    assert!(matches!(fetched, Fetched::Failed(AppError::Invalid(_))));
}

// ═══════════════════════════════════════════════════════════
// Page sections
// ═══════════════════════════════════════════════════════════

fn services_form(settings: Value) -> SectionForm {
    SectionForm {
        page_key: "home".to_string(),
        section_key: "services".to_string(),
        is_visible: true,
        order_index: 0,
        settings,
    }
}

#[test]
fn stored_section_resolves_bilingually() {
    let (_pool, store) = test_store();
    store
        .section_upsert(&services_form(json!({
            "title": "خدمات",
            "title_en": "",
            "cards": [{"icon": "Trophy", "title": "بطولات", "title_en": "Tournaments"}]
        })))
        .unwrap();
    let records = store.section_list("home").unwrap();
    let section = compose_section(&records, "home", "services", Lang::En).unwrap();
    assert_eq!(section.title, "خدمات");
    assert_eq!(section.items[0].title, "Tournaments");
    assert!(!section.from_default);
}

#[test]
fn upsert_replaces_same_key() {
    let (_pool, store) = test_store();
    let payload = json!({"title": "أ", "cards": [{"title": "ب"}]});
    let first = store.section_upsert(&services_form(payload.clone())).unwrap();
    let mut form = services_form(payload);
    form.order_index = 5;
    let second = store.section_upsert(&form).unwrap();
    assert_eq!(first, second);
    let records = store.section_list("home").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].order_index, 5);
}

#[test]
fn hidden_section_renders_nothing() {
    let (_pool, store) = test_store();
    let id = store
        .section_upsert(&services_form(json!({"title": "أ", "cards": [{"title": "ب"}]})))
        .unwrap();
    store.section_set_visibility(id, false).unwrap();
    let records = store.section_list("home").unwrap();
    assert!(compose_section(&records, "home", "services", Lang::Ar).is_none());
    assert!(matches!(
        store.section_set_visibility(9999, true),
        Err(AppError::NotFound(_))
    ));
}

// ═══════════════════════════════════════════════════════════
// Auto-renewal
// ═══════════════════════════════════════════════════════════

#[test]
fn renews_subscription_ending_within_a_day() {
    let (pool, store) = test_store();
    let now = at((2026, 3, 1), (10, 0, 0));
    let user = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let plan = Plan::create(&pool, "شهري", "Monthly", 30, 99.0).unwrap();
    let end = now + Duration::hours(12);
    let sub = Subscription::create(&pool, user, plan, now - Duration::days(18), end, true).unwrap();

    let summary = run_auto_renewal(&*store, now).unwrap();
    assert!(summary.success);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.results[0].status, RenewalStatus::Success);

    let renewed = Subscription::find_by_id(&pool, sub).unwrap().unwrap();
    assert_eq!(renewed.end_date, end + Duration::days(30));

    let logs = store.renewal_log_list(Some(sub), 10, 0).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, "success");
}

#[test]
fn renewal_skips_ineligible_subscriptions() {
    let (pool, store) = test_store();
    let now = at((2026, 3, 1), (10, 0, 0));
    let user = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let plan = Plan::create(&pool, "شهري", "Monthly", 30, 99.0).unwrap();
    let start = now - Duration::days(20);
    // No auto-renew
    Subscription::create(&pool, user, plan, start, now + Duration::hours(2), false).unwrap();
    // Ends outside the window
    Subscription::create(&pool, user, plan, start, now + Duration::hours(30), true).unwrap();
    // Already ended
    Subscription::create(&pool, user, plan, start, now - Duration::hours(1), true).unwrap();

    let summary = run_auto_renewal(&*store, now).unwrap();
    assert_eq!(summary.processed, 0);
    assert!(store.renewal_log_list(None, 10, 0).unwrap().is_empty());
}

#[test]
fn missing_plan_is_logged_and_run_continues() {
    let (pool, store) = test_store();
    let now = at((2026, 3, 1), (10, 0, 0));
    let user = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let plan = Plan::create(&pool, "شهري", "Monthly", 30, 99.0).unwrap();
    let good = Subscription::create(
        &pool,
        user,
        plan,
        now - Duration::days(20),
        now + Duration::hours(6),
        true,
    )
    .unwrap();
    {
        let conn = pool.get().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys=OFF;
             INSERT INTO subscriptions (user_id, plan_id, status, start_date, end_date, auto_renew)
             VALUES (1, 777, 'active', '2026-02-01 10:00:00', '2026-03-01 12:00:00', 1);
             PRAGMA foreign_keys=ON;",
        )
        .unwrap();
    }

    let summary = run_auto_renewal(&*store, now).unwrap();
    assert_eq!(summary.processed, 2);
    let failed: Vec<_> = summary
        .results
        .iter()
        .filter(|r| r.status == RenewalStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].error.as_deref().unwrap_or("").contains("777"));

    let statuses: Vec<String> = store
        .renewal_log_list(None, 10, 0)
        .unwrap()
        .into_iter()
        .map(|l| l.status)
        .collect();
    assert_eq!(statuses.len(), 2);
    assert!(statuses.contains(&"failed".to_string()));
    assert_eq!(store.renewal_log_list(Some(good), 10, 0).unwrap()[0].status, "success");
}

#[test]
fn oversized_plan_duration_fails_without_stopping_the_run() {
    let (pool, store) = test_store();
    let now = at((2026, 3, 1), (10, 0, 0));
    let user = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let broken = Plan::create(&pool, "أبدي", "Forever", 1_000_000_000, 1.0).unwrap();
    let monthly = Plan::create(&pool, "شهري", "Monthly", 30, 99.0).unwrap();
    let start = now - Duration::days(20);
    let bad = Subscription::create(&pool, user, broken, start, now + Duration::hours(2), true)
        .unwrap();
    let good = Subscription::create(&pool, user, monthly, start, now + Duration::hours(3), true)
        .unwrap();

    let summary = run_auto_renewal(&*store, now).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.results[0].subscription_id, bad);
    assert_eq!(summary.results[0].status, RenewalStatus::Failed);
    assert_eq!(summary.results[1].status, RenewalStatus::Success);

    let untouched = Subscription::find_by_id(&pool, bad).unwrap().unwrap();
    assert_eq!(untouched.end_date, now + Duration::hours(2));
    assert_eq!(store.renewal_log_list(Some(bad), 10, 0).unwrap()[0].status, "failed");
    assert_eq!(store.renewal_log_list(Some(good), 10, 0).unwrap()[0].status, "success");
}

#[test]
fn extension_applies_once() {
    let (pool, store) = test_store();
    let now = at((2026, 3, 1), (10, 0, 0));
    let user = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let plan = Plan::create(&pool, "شهري", "Monthly", 30, 99.0).unwrap();
    let end = now + Duration::hours(5);
    let sub = Subscription::create(&pool, user, plan, now - Duration::days(25), end, true).unwrap();

    let new_end = end + Duration::days(30);
    assert!(store.subscription_extend(sub, new_end).unwrap());
    assert!(!store.subscription_extend(sub, new_end).unwrap());
    let row = Subscription::find_by_id(&pool, sub).unwrap().unwrap();
    assert_eq!(row.end_date, new_end);
}

#[test]
fn corrupt_end_date_is_an_error() {
    let (pool, _store) = test_store();
    let user = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let plan = Plan::create(&pool, "شهري", "Monthly", 30, 99.0).unwrap();
    let id = {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO subscriptions (user_id, plan_id, status, start_date, end_date, auto_renew)
             VALUES (?1, ?2, 'active', '2026-02-01 10:00:00', 'not a date', 1)",
            rusqlite::params![user, plan],
        )
        .unwrap();
        conn.last_insert_rowid()
    };
    assert!(matches!(
        Subscription::find_by_id(&pool, id),
        Err(AppError::Database(_))
    ));
}

// ═══════════════════════════════════════════════════════════
// Consultation reminders
// ═══════════════════════════════════════════════════════════

#[test]
fn reminders_notify_player_and_each_admin_once() {
    let (pool, store) = test_store();
    let hub = NotificationHub::default();
    let now = at((2026, 3, 1), (10, 0, 0));
    let today = now.date();
    let player = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let admin_a = User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    let admin_b = User::create(&pool, "b@example.com", "مدير ٢", Role::Admin).unwrap();
    let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

    let due = Booking::create(&pool, player, today, t(10, 30), "confirmed").unwrap();
    Booking::create(&pool, player, today, t(12, 0), "confirmed").unwrap();
    Booking::create(&pool, player, today, t(10, 15), "pending").unwrap();
    Booking::create(&pool, player, today.succ_opt().unwrap(), t(10, 30), "confirmed").unwrap();

    let summary = run_consultation_reminders(&*store, &hub, now).unwrap();
    assert!(summary.success);
    assert_eq!(summary.player_reminders, vec![due]);
    assert_eq!(summary.admin_reminders.len(), 2);

    assert_eq!(store.notification_unread_count(player).unwrap(), 1);
    assert_eq!(store.notification_unread_count(admin_a).unwrap(), 1);
    assert_eq!(store.notification_unread_count(admin_b).unwrap(), 1);

    let booking = Booking::find_by_id(&pool, due).unwrap().unwrap();
    assert!(booking.player_reminder_sent);
    assert!(booking.admin_reminder_sent);

    let notice = &store.notification_list(player, 5).unwrap()[0];
    assert!(!notice.title.is_empty());
    assert!(!notice.title_en.is_empty());

    let again = run_consultation_reminders(&*store, &hub, now).unwrap();
    assert!(again.player_reminders.is_empty());
    assert!(again.admin_reminders.is_empty());
    assert_eq!(store.notification_unread_count(player).unwrap(), 1);
}

#[test]
fn reminder_flag_is_claimed_once() {
    let (pool, store) = test_store();
    let player = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let start = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
    let id = Booking::create(&pool, player, day, start, "confirmed").unwrap();

    assert!(store.booking_claim_reminder(id, ReminderTarget::Player).unwrap());
    assert!(!store.booking_claim_reminder(id, ReminderTarget::Player).unwrap());
    assert!(store.booking_claim_reminder(id, ReminderTarget::Admin).unwrap());

    store.booking_release_reminder(id, ReminderTarget::Player).unwrap();
    assert!(store.booking_claim_reminder(id, ReminderTarget::Player).unwrap());
}

#[test]
fn claimed_booking_is_not_reminded_again() {
    let (pool, store) = test_store();
    let hub = NotificationHub::default();
    let now = at((2026, 3, 1), (10, 0, 0));
    let player = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    let start = NaiveTime::from_hms_opt(10, 20, 0).unwrap();
    let id = Booking::create(&pool, player, now.date(), start, "confirmed").unwrap();

    // Another run holds both flags.
    store.booking_claim_reminder(id, ReminderTarget::Player).unwrap();
    store.booking_claim_reminder(id, ReminderTarget::Admin).unwrap();

    let summary = run_consultation_reminders(&*store, &hub, now).unwrap();
    assert!(summary.player_reminders.is_empty());
    assert!(summary.admin_reminders.is_empty());
    assert_eq!(store.notification_unread_count(player).unwrap(), 0);
}

#[test]
fn failed_reminder_releases_its_flag() {
    let (pool, store) = test_store();
    let hub = NotificationHub::default();
    let now = at((2026, 3, 1), (10, 0, 0));
    let player = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    let start = NaiveTime::from_hms_opt(10, 20, 0).unwrap();
    let id = Booking::create(&pool, player, now.date(), start, "confirmed").unwrap();
    pool.get()
        .unwrap()
        .execute_batch("DROP TABLE notifications;")
        .unwrap();

    let summary = run_consultation_reminders(&*store, &hub, now).unwrap();
    assert!(summary.player_reminders.is_empty());
    assert!(summary.admin_reminders.is_empty());

    let booking = Booking::find_by_id(&pool, id).unwrap().unwrap();
    assert!(!booking.player_reminder_sent);
    assert!(!booking.admin_reminder_sent);
}

#[test]
fn mark_read_is_scoped_to_owner() {
    let (pool, store) = test_store();
    let owner = User::create(&pool, "o@example.com", "أ", Role::Player).unwrap();
    let other = User::create(&pool, "x@example.com", "ب", Role::Player).unwrap();
    let id = store
        .notification_create(&crate::models::notification::NotificationForm {
            user_id: owner,
            title: "عنوان".to_string(),
            title_en: String::new(),
            message: "رسالة".to_string(),
            message_en: String::new(),
            kind: "info".to_string(),
            link: None,
        })
        .unwrap();
    assert!(matches!(
        store.notification_mark_read(other, id),
        Err(AppError::NotFound(_))
    ));
    store.notification_mark_read(owner, id).unwrap();
    assert_eq!(store.notification_unread_count(owner).unwrap(), 0);
}

// ═══════════════════════════════════════════════════════════
// Interests
// ═══════════════════════════════════════════════════════════

#[test]
fn duplicate_interest_is_duplicate() {
    let (pool, store) = test_store();
    let club = User::create(&pool, "c@example.com", "نادي", Role::Club).unwrap();
    let player = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let form = InterestForm {
        player_id: player,
        note: None,
    };
    store.interest_create(club, &form).unwrap();
    let err = store.interest_create(club, &form).unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));
    assert_eq!(store.interest_list_for_club(club).unwrap().len(), 1);
}

// ═══════════════════════════════════════════════════════════
// HTTP: scheduled functions
// ═══════════════════════════════════════════════════════════

#[test]
fn functions_reject_missing_or_wrong_credentials() {
    let (_pool, store) = test_store();
    let client = client(store, test_config("s3cret"));
    let uri = "/functions/v1/auto-renew-subscriptions";

    assert_eq!(client.post(uri).dispatch().status(), Status::Unauthorized);
    for bad in ["Bearer wrong", "Bearer s3cret-extra", "Bearer s3cre", "s3cret", "Bearer  s3cret"] {
        let res = client
            .post(uri)
            .header(Header::new("Authorization", bad))
            .dispatch();
        assert_eq!(res.status(), Status::Unauthorized, "accepted {:?}", bad);
    }
}

#[test]
fn empty_secret_rejects_everyone() {
    let (_pool, store) = test_store();
    let client = client(store, test_config(""));
    let res = client
        .post("/functions/v1/consultation-reminders")
        .header(Header::new("Authorization", "Bearer "))
        .dispatch();
    assert_eq!(res.status(), Status::Unauthorized);
}

#[test]
fn functions_run_with_exact_credential() {
    let (_pool, store) = test_store();
    let client = client(store, test_config("s3cret"));

    let res = client
        .post("/functions/v1/auto-renew-subscriptions")
        .header(Header::new("Authorization", "Bearer s3cret"))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: Value = res.into_json().unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["processed"], 0);
    assert!(body["results"].as_array().unwrap().is_empty());

    let res = client
        .post("/functions/v1/consultation-reminders")
        .header(Header::new("Authorization", "Bearer s3cret"))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: Value = res.into_json().unwrap();
    assert_eq!(body["success"], true);
    assert!(body["playerReminders"].is_array());
    assert!(body["adminReminders"].is_array());
}

// ═══════════════════════════════════════════════════════════
// HTTP: public content
// ═══════════════════════════════════════════════════════════

#[test]
fn sections_fall_back_to_defaults() {
    let (_pool, store) = test_store();
    let client = client(store, test_config("x"));
    let res = client.get("/api/sections/home?lang=en").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: Value = res.into_json().unwrap();
    let sections = body.as_array().unwrap();
    assert_eq!(sections.len(), 3);
    assert!(sections.iter().all(|s| s["from_default"] == true));
    assert_eq!(sections[0]["title"], "Our Services");

    let res = client.get("/api/sections/home/nowhere").dispatch();
    assert_eq!(res.status(), Status::NotFound);
}

#[test]
fn site_view_resolves_language_from_header() {
    let (_pool, store) = test_store();
    store
        .setting_put(keys::SOCIAL_LINKS, &json!({"facebook": "https://fb.example/kora"}))
        .unwrap();
    let client = client(store, test_config("x"));

    let res = client
        .get("/api/site")
        .header(Header::new("Accept-Language", "en-US,en;q=0.9"))
        .dispatch();
    let body: Value = res.into_json().unwrap();
    assert_eq!(body["direction"], "ltr");
    assert_eq!(body["site"]["name"], "Kora");
    let social = body["social"].as_array().unwrap();
    assert_eq!(social.len(), 1);
    assert_eq!(social[0]["name"], "Facebook");

    let body: Value = client.get("/api/site?lang=ar").dispatch().into_json().unwrap();
    assert_eq!(body["direction"], "rtl");
    assert_eq!(body["site"]["name"], "كورة");
}

#[test]
fn color_save_merges_into_stored_tokens() {
    let (pool, store) = test_store();
    let admin = User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    let client = client(store, test_config("x"));
    let seeded = crate::theme::ThemeColors::default().light.unwrap();

    let res = client
        .put("/api/admin/theme/colors")
        .header(ContentType::JSON)
        .header(Header::new("X-User-Id", admin.to_string()))
        .body(
            json!({
                "mode": "light",
                "tokens": {"primary": "10 80% 50%", "accent": "#ff0000", "ring": "not-a-color"}
            })
            .to_string(),
        )
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: Value = res.into_json().unwrap();
    assert_eq!(body["swatches"]["light"]["accent"], "#ff0000");

    let stored: Value = client
        .get("/api/settings/theme_colors")
        .dispatch()
        .into_json()
        .unwrap();
    let light = stored["light"].as_object().unwrap();
    assert_eq!(light.len(), seeded.len());
    assert_eq!(light["primary"], "10 80% 50%");
    assert_eq!(light["accent"], "0 100% 50%");
    assert_eq!(light["ring"], seeded["ring"].as_str());
    assert_eq!(light["background"], seeded["background"].as_str());
}

#[test]
fn preview_accepts_hex_and_ignores_junk() {
    let (pool, store) = test_store();
    let admin = User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    let client = client(store, test_config("x"));
    let seeded = crate::theme::ThemeColors::default().light.unwrap();

    let body: Value = client
        .post("/api/admin/theme/preview")
        .header(ContentType::JSON)
        .header(Header::new("X-User-Id", admin.to_string()))
        .body(json!({"mode": "light", "tokens": {"primary": "#ff0000", "ring": "??"}}).to_string())
        .dispatch()
        .into_json()
        .unwrap();
    let css = body["css"].as_str().unwrap();
    assert!(css.contains("--primary: 0 100% 50%;"));
    assert!(css.contains(&format!("--ring: {};", seeded["ring"])));
}

#[test]
fn site_mode_is_published_and_persisted() {
    let (pool, store) = test_store();
    let admin = User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    let client = client(Arc::clone(&store), test_config("x"));
    let mode = || -> Value {
        let body: Value = client.get("/api/theme/mode").dispatch().into_json().unwrap();
        body["mode"].clone()
    };
    assert_eq!(mode(), "light");

    let res = client
        .put("/api/admin/theme/mode")
        .header(ContentType::JSON)
        .header(Header::new("X-User-Id", admin.to_string()))
        .body(json!({"mode": "dark"}).to_string())
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(mode(), "dark");

    let res = client
        .post("/api/admin/theme/mode/toggle")
        .header(Header::new("X-User-Id", admin.to_string()))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(mode(), "light");
    assert_eq!(store.setting_get(keys::THEME_MODE).unwrap(), Some(json!("light")));
}

#[test]
fn theme_stylesheet_has_both_modes() {
    let (_pool, store) = test_store();
    let client = client(store, test_config("x"));
    let res = client.get("/api/theme.css").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.content_type(), Some(ContentType::CSS));
    let css = res.into_string().unwrap();
    assert!(css.contains(":root {"));
    assert!(css.contains(".dark {"));
    assert!(css.contains("--primary-foreground:"));
}

#[test]
fn missing_setting_is_404() {
    let (_pool, store) = test_store();
    let client = client(store, test_config("x"));
    let res = client.get("/api/settings/no_such_key").dispatch();
    assert_eq!(res.status(), Status::NotFound);
    let res = client.get("/api/settings/site_settings").dispatch();
    assert_eq!(res.status(), Status::Ok);
}

// ═══════════════════════════════════════════════════════════
// HTTP: roles and interests
// ═══════════════════════════════════════════════════════════

#[test]
fn duplicate_interest_is_409_with_localized_message() {
    let (pool, store) = test_store();
    let club = User::create(&pool, "c@example.com", "نادي", Role::Club).unwrap();
    let player = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let client = client(store, test_config("x"));
    let post = || {
        client
            .post("/api/interests")
            .header(ContentType::JSON)
            .header(Header::new("X-User-Id", club.to_string()))
            .header(Header::new("Accept-Language", "en"))
            .body(json!({ "player_id": player }).to_string())
            .dispatch()
    };

    assert_eq!(post().status(), Status::Ok);
    let res = post();
    assert_eq!(res.status(), Status::Conflict);
    let body: Value = res.into_json().unwrap();
    assert_eq!(body["category"], "duplicate");
    assert_eq!(body["error"], "This record is already registered");
    assert!(body.get("detail").is_none());
}

#[test]
fn role_guards_reject_wrong_users() {
    let (pool, store) = test_store();
    let player = User::create(&pool, "p@example.com", "لاعب", Role::Player).unwrap();
    let admin = User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    let client = client(store, test_config("x"));
    let patch = |user: Option<i64>| {
        let mut req = client
            .patch("/api/admin/settings/site_settings")
            .header(ContentType::JSON)
            .body(json!({ "site_name": "جديد" }).to_string());
        if let Some(id) = user {
            req = req.header(Header::new("X-User-Id", id.to_string()));
        }
        req.dispatch().status()
    };

    assert_eq!(patch(None), Status::Unauthorized);
    assert_eq!(patch(Some(player)), Status::Forbidden);
    assert_eq!(patch(Some(admin)), Status::Ok);

    let body: Value = client
        .get("/api/settings/site_settings")
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(body["site_name"], "جديد");
    assert_eq!(body["site_name_en"], "Kora");
}

#[test]
fn admin_section_save_validates_payload() {
    let (pool, store) = test_store();
    let admin = User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    let client = client(store, test_config("x"));
    let put = |settings: Value| {
        client
            .put("/api/admin/sections")
            .header(ContentType::JSON)
            .header(Header::new("X-User-Id", admin.to_string()))
            .body(
                json!({
                    "page_key": "home",
                    "section_key": "features",
                    "settings": settings
                })
                .to_string(),
            )
            .dispatch()
            .status()
    };

    assert_eq!(put(json!({"title": "مميزات", "cards": [{"title": "x"}]})), Status::BadRequest);
    assert_eq!(put(json!({"title": "مميزات", "features": [{"text": "أ"}]})), Status::Ok);

    let body: Value = client
        .get("/api/sections/home/features?lang=ar")
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(body["title"], "مميزات");
    assert_eq!(body["from_default"], false);
}

#[test]
fn admin_social_save_replaces_legacy_links() {
    let (pool, store) = test_store();
    let admin = User::create(&pool, "a@example.com", "مدير", Role::Admin).unwrap();
    store
        .setting_put(keys::SOCIAL_LINKS, &json!({"facebook": "https://fb.example/old"}))
        .unwrap();
    let client = client(store, test_config("x"));

    let res = client
        .put("/api/admin/social")
        .header(ContentType::JSON)
        .header(Header::new("X-User-Id", admin.to_string()))
        .body(
            json!([
                {"id": "x", "name": "إكس", "nameEn": "X", "url": "https://x.example/kora",
                 "enabled": true, "order": 0, "iconType": "custom", "iconUrl": "/x.svg"}
            ])
            .to_string(),
        )
        .dispatch();
    assert_eq!(res.status(), Status::Ok);

    let social: Value = client.get("/api/social?lang=en").dispatch().into_json().unwrap();
    let social = social.as_array().unwrap();
    assert_eq!(social.len(), 1);
    assert_eq!(social[0]["id"], "x");
    assert_eq!(social[0]["icon_type"], "custom");

    let res = client
        .put("/api/admin/social")
        .header(ContentType::JSON)
        .header(Header::new("X-User-Id", admin.to_string()))
        .body(json!([{"id": "evil", "url": "javascript:alert(1)", "enabled": true}]).to_string())
        .dispatch();
    assert_eq!(res.status(), Status::BadRequest);
}

// ═══════════════════════════════════════════════════════════
// HTTP: storage
// ═══════════════════════════════════════════════════════════

#[test]
fn signed_urls_guard_private_objects() {
    let (_pool, store) = test_store();
    let config = test_config("x");
    let root = std::path::PathBuf::from(&config.storage.root);
    std::fs::create_dir_all(root.join("documents/3")).unwrap();
    std::fs::create_dir_all(root.join("avatars/3")).unwrap();
    std::fs::write(root.join("documents/3/id.txt"), "private").unwrap();
    std::fs::write(root.join("avatars/3/me.txt"), "public").unwrap();

    let storage = StorageService::from_config(&config.storage);
    let now = chrono::Utc::now().timestamp();
    let url = storage.object_url("documents", "documents/3/id.txt", now).unwrap();
    let local = url.trim_start_matches("http://localhost:8000");

    let client = client(store, config);
    let res = client.get(local.to_string()).dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.into_string().unwrap(), "private");

    let tampered = local.replace("3/id.txt", "3/other.txt");
    assert_eq!(client.get(tampered).dispatch().status(), Status::Forbidden);
    assert_eq!(
        client.get("/storage/documents/3/id.txt").dispatch().status(),
        Status::Forbidden
    );

    let res = client.get("/storage/avatars/3/me.txt").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.into_string().unwrap(), "public");

    let _ = std::fs::remove_dir_all(root);
}
