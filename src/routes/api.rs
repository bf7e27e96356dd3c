use rocket::http::ContentType;
use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::Json;
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use rocket::{Shutdown, State};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::AcceptLang;
use crate::error::AppError;
use crate::i18n::{Direction, Lang};
use crate::models::interest::{Interest, InterestForm};
use crate::models::notification::Notification;
use crate::notify::NotificationHub;
use crate::sections::{compose_page, compose_section, ResolvedSection};
use crate::security::auth::{AuthenticatedUser, ClubUser};
use crate::settings::content::{
    FooterSettings, HeroSlider, MenuItems, ResolvedFooter, ResolvedLink, ResolvedSite,
    ResolvedSlide, SiteSettings,
};
use crate::settings::social::{load_platforms, visible_platforms, ResolvedPlatform};
use crate::settings::{keys, Fetched, Missing, SettingsClient};
use crate::store::Store;
use crate::theme::{
    render_stylesheet, CssVariables, ModeChannel, StyleOverrides, ThemeColors, ThemeController,
    ThemeMode,
};

const NOTIFICATION_PAGE: i64 = 20;

// ── Settings ───────────────────────────────────────────

#[get("/settings/<key>")]
pub fn setting_get(key: &str, settings: &State<SettingsClient>) -> Result<Json<Value>, AppError> {
    match settings.fetch(key, Missing::Fail) {
        Fetched::Value(v) => Ok(Json(v)),
        Fetched::UsingDefault => Err(AppError::NotFound(format!("setting '{}'", key))),
        Fetched::Failed(e) => Err(e),
    }
}

// ── Site chrome ────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SiteView {
    pub lang: Lang,
    pub direction: Direction,
    pub site: ResolvedSite,
    pub menu: Vec<ResolvedLink>,
    pub autoplay_ms: u64,
    pub slides: Vec<ResolvedSlide>,
    pub footer: ResolvedFooter,
    pub social: Vec<ResolvedPlatform>,
}

#[get("/site?<lang>")]
pub fn site(
    lang: Option<Lang>,
    accept: AcceptLang,
    settings: &State<SettingsClient>,
) -> Json<SiteView> {
    let lang = accept.or(lang);
    let site: SiteSettings = settings.load_or_default(keys::SITE_SETTINGS, Missing::Fail);
    let menu: MenuItems = settings.load_or_default(keys::MENU_ITEMS, Missing::Fail);
    let slider: HeroSlider = settings.load_or_default(keys::HERO_SLIDER, Missing::Fail);
    let footer: FooterSettings = settings.load_or_default(keys::FOOTER_SETTINGS, Missing::Fail);
    let social = if footer.show_social {
        visible_platforms(&load_platforms(settings), lang)
    } else {
        Vec::new()
    };
    Json(SiteView {
        lang,
        direction: lang.direction(),
        site: site.resolve(lang),
        menu: menu.resolve(lang),
        autoplay_ms: slider.autoplay_ms,
        slides: slider.resolve(lang),
        footer: footer.resolve(lang),
        social,
    })
}

#[get("/social?<lang>")]
pub fn social(
    lang: Option<Lang>,
    accept: AcceptLang,
    settings: &State<SettingsClient>,
) -> Json<Vec<ResolvedPlatform>> {
    Json(visible_platforms(&load_platforms(settings), accept.or(lang)))
}

// ── Page sections ──────────────────────────────────────

fn page_records(store: &dyn Store, page_key: &str) -> Vec<crate::models::section::PageSection> {
    store.section_list(page_key).unwrap_or_else(|e| {
        log::warn!("[sections] '{}' unavailable, using defaults: {}", page_key, e);
        Vec::new()
    })
}

#[get("/sections/<page_key>?<lang>")]
pub fn sections_page(
    page_key: &str,
    lang: Option<Lang>,
    accept: AcceptLang,
    store: &State<Arc<dyn Store>>,
) -> Json<Vec<ResolvedSection>> {
    let records = page_records(&**store.inner(), page_key);
    Json(compose_page(&records, page_key, accept.or(lang)))
}

#[get("/sections/<page_key>/<section_key>?<lang>")]
pub fn section_one(
    page_key: &str,
    section_key: &str,
    lang: Option<Lang>,
    accept: AcceptLang,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<ResolvedSection>, AppError> {
    let records = page_records(&**store.inner(), page_key);
    compose_section(&records, page_key, section_key, accept.or(lang))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("section '{}/{}'", page_key, section_key)))
}

// ── Theme ──────────────────────────────────────────────

#[get("/theme.css")]
pub fn theme_css(settings: &State<SettingsClient>) -> (ContentType, String) {
    let colors: ThemeColors = settings.load_or_default(keys::THEME_COLORS, Missing::Fail);
    let overrides: StyleOverrides =
        settings.load_or_default(keys::THEME_STYLE_OVERRIDES, Missing::UseDefault);
    (ContentType::CSS, render_stylesheet(&colors, &overrides))
}

#[get("/theme/mode")]
pub fn theme_mode(channel: &State<ModeChannel>) -> Json<Value> {
    Json(json!({ "mode": channel.current() }))
}

/// Read past the shared cache: a stream outlives many admin writes.
fn stored_colors(store: &Arc<dyn Store>) -> ThemeColors {
    SettingsClient::new(Arc::clone(store)).load_or_default(keys::THEME_COLORS, Missing::Fail)
}

fn theme_event(controller: &ThemeController<CssVariables>) -> Event {
    let mode: ThemeMode = controller.mode();
    Event::json(&json!({
        "mode": mode,
        "css": controller.sink().to_block(":root"),
    }))
    .event("theme")
}

/// Live variables for the site-wide mode, re-sent whenever an admin
/// switches it.
#[get("/theme/stream")]
pub fn theme_stream(
    store: &State<Arc<dyn Store>>,
    channel: &State<ModeChannel>,
    mut shutdown: Shutdown,
) -> EventStream![] {
    let store = Arc::clone(store.inner());
    let mut controller = ThemeController::new(channel.inner(), CssVariables::default());
    EventStream! {
        controller.set_stored(stored_colors(&store));
        yield theme_event(&controller);
        loop {
            let changed = select! {
                changed = controller.next_mode_change() => changed,
                _ = &mut shutdown => false,
            };
            if !changed {
                break;
            }
            controller.set_stored(stored_colors(&store));
            yield theme_event(&controller);
        }
    }
}

// ── Interests ──────────────────────────────────────────

#[post("/interests", format = "json", data = "<form>")]
pub fn interest_create(
    club: ClubUser,
    form: Json<InterestForm>,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<Value>, AppError> {
    let id = store.interest_create(club.user.id, &form)?;
    Ok(Json(json!({ "id": id })))
}

#[get("/interests")]
pub fn interest_list(
    club: ClubUser,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<Vec<Interest>>, AppError> {
    Ok(Json(store.interest_list_for_club(club.user.id)?))
}

// ── Notifications ──────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UnreadView {
    pub count: i64,
    pub items: Vec<Notification>,
}

#[get("/notifications/unread")]
pub fn notifications_unread(
    auth: AuthenticatedUser,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<UnreadView>, AppError> {
    let count = store.notification_unread_count(auth.user.id)?;
    let items = store.notification_list(auth.user.id, NOTIFICATION_PAGE)?;
    Ok(Json(UnreadView { count, items }))
}

#[post("/notifications/<id>/read")]
pub fn notification_read(
    id: i64,
    auth: AuthenticatedUser,
    store: &State<Arc<dyn Store>>,
    hub: &State<Arc<NotificationHub>>,
) -> Result<Json<Value>, AppError> {
    store.notification_mark_read(auth.user.id, id)?;
    hub.publish(auth.user.id);
    Ok(Json(json!({ "success": true })))
}

fn unread_event(store: &dyn Store, user_id: i64) -> Event {
    match store.notification_unread_count(user_id) {
        Ok(count) => Event::json(&json!({ "count": count })).event("unread"),
        Err(e) => {
            log::warn!("unread count for user {} failed: {}", user_id, e);
            Event::comment("unavailable")
        }
    }
}

/// Live unread counter. Emits the current count once, then again whenever
/// one of this user's notifications changes.
#[get("/notifications/stream")]
pub fn notifications_stream(
    auth: AuthenticatedUser,
    store: &State<Arc<dyn Store>>,
    hub: &State<Arc<NotificationHub>>,
    mut shutdown: Shutdown,
) -> EventStream![] {
    let store = Arc::clone(store.inner());
    let mut rx = hub.subscribe();
    let user_id = auth.user.id;
    EventStream! {
        yield unread_event(&*store, user_id);
        loop {
            let changed = select! {
                msg = rx.recv() => match msg {
                    Ok(event) => event.user_id == user_id,
                    Err(RecvError::Lagged(_)) => true,
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => break,
            };
            if changed {
                yield unread_event(&*store, user_id);
            }
        }
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        setting_get,
        site,
        social,
        sections_page,
        section_one,
        theme_css,
        theme_mode,
        theme_stream,
        interest_create,
        interest_list,
        notifications_unread,
        notification_read,
        notifications_stream,
    ]
}
