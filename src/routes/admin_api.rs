use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::section::SectionForm;
use crate::models::settings::Setting;
use crate::models::subscription::RenewalLog;
use crate::sections::{defaults, SectionContent, SectionKind};
use crate::security::auth::AdminUser;
use crate::settings::social::{load_platforms, AdvancedSocialSetting, SocialPlatformEntry};
use crate::settings::{keys, Missing, SettingsClient};
use crate::store::Store;
use crate::theme::{
    resolve_block, ModeChannel, PreviewOverride, StyleOverrides, Swatches, ThemeColors, ThemeMode,
    TokenMap,
};

// ── Settings ───────────────────────────────────────────

/// Every stored row, for the settings editor.
#[get("/settings")]
pub fn settings_list(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<Vec<Setting>>, AppError> {
    Ok(Json(store.setting_all()?))
}

/// Shallow-merge the given fields into an existing object setting.
#[patch("/settings/<key>", format = "json", data = "<partial>")]
pub fn setting_patch(
    _admin: AdminUser,
    key: &str,
    partial: Json<Value>,
    settings: &State<SettingsClient>,
) -> Result<Json<Value>, AppError> {
    let updated = settings.patch(key, &partial)?;
    log::info!("setting '{}' patched", key);
    Ok(Json(updated))
}

#[put("/settings/<key>", format = "json", data = "<value>")]
pub fn setting_put(
    _admin: AdminUser,
    key: &str,
    value: Json<Value>,
    settings: &State<SettingsClient>,
) -> Result<Json<Value>, AppError> {
    settings.put(key, &value)?;
    log::info!("setting '{}' replaced", key);
    Ok(Json(json!({ "success": true })))
}

// ── Theme ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ColorsUpdate {
    pub mode: ThemeMode,
    pub tokens: TokenMap,
}

/// Stored colors plus their hex equivalents for the editor's pickers.
#[derive(Debug, Serialize)]
pub struct ColorsView {
    pub colors: ThemeColors,
    pub swatches: Swatches,
}

impl From<ThemeColors> for ColorsView {
    fn from(colors: ThemeColors) -> Self {
        ColorsView {
            swatches: colors.swatches(),
            colors,
        }
    }
}

#[get("/theme/colors")]
pub fn theme_colors_get(_admin: AdminUser, settings: &State<SettingsClient>) -> Json<ColorsView> {
    let colors: ThemeColors = settings.load_or_default(keys::THEME_COLORS, Missing::Fail);
    Json(colors.into())
}

/// Merge edits into one mode's colors. Values may be triplets or hex;
/// tokens not sent, unknown names and unreadable values keep what is stored.
#[put("/theme/colors", format = "json", data = "<update>")]
pub fn theme_colors_put(
    _admin: AdminUser,
    update: Json<ColorsUpdate>,
    settings: &State<SettingsClient>,
) -> Result<Json<ColorsView>, AppError> {
    let update = update.into_inner();
    let current: ThemeColors = settings.load_or_default(keys::THEME_COLORS, Missing::Fail);
    let colors = current.merge_mode(update.mode, update.tokens);
    settings.put(keys::THEME_COLORS, &serde_json::to_value(&colors)?)?;
    Ok(Json(colors.into()))
}

#[derive(Debug, Serialize)]
pub struct PreviewView {
    pub mode: ThemeMode,
    pub css: String,
}

/// Render the stored colors for the preview's mode with the unsaved edits
/// layered on top. Nothing is persisted.
#[post("/theme/preview", format = "json", data = "<preview>")]
pub fn theme_preview(
    _admin: AdminUser,
    preview: Json<PreviewOverride>,
    settings: &State<SettingsClient>,
) -> Json<PreviewView> {
    let preview = preview.into_inner().normalized();
    let mode = preview.mode;
    let colors: ThemeColors = settings.load_or_default(keys::THEME_COLORS, Missing::Fail);
    let overrides: StyleOverrides =
        settings.load_or_default(keys::THEME_STYLE_OVERRIDES, Missing::UseDefault);
    let vars = resolve_block(&colors, &overrides, mode, Some(preview));
    Json(PreviewView {
        mode,
        css: vars.to_block(mode.selector()),
    })
}

#[derive(Debug, Deserialize)]
pub struct ModeForm {
    pub mode: ThemeMode,
}

fn save_mode(
    settings: &SettingsClient,
    channel: &ModeChannel,
    mode: ThemeMode,
) -> Result<Json<Value>, AppError> {
    settings.put(keys::THEME_MODE, &serde_json::to_value(mode)?)?;
    channel.publish(mode);
    log::info!("site theme mode set to {:?}", mode);
    Ok(Json(json!({ "mode": mode })))
}

/// Set the site-wide mode. Live theme streams pick it up immediately.
#[put("/theme/mode", format = "json", data = "<form>")]
pub fn theme_mode_put(
    _admin: AdminUser,
    form: Json<ModeForm>,
    settings: &State<SettingsClient>,
    channel: &State<ModeChannel>,
) -> Result<Json<Value>, AppError> {
    save_mode(settings, channel, form.mode)
}

#[post("/theme/mode/toggle")]
pub fn theme_mode_toggle(
    _admin: AdminUser,
    settings: &State<SettingsClient>,
    channel: &State<ModeChannel>,
) -> Result<Json<Value>, AppError> {
    let mode = channel.toggle();
    save_mode(settings, channel, mode)
}

// ── Social ─────────────────────────────────────────────

/// Full list for the editor, disabled and url-less entries included.
#[get("/social")]
pub fn social_get(
    _admin: AdminUser,
    settings: &State<SettingsClient>,
) -> Json<Vec<SocialPlatformEntry>> {
    Json(load_platforms(settings))
}

/// Absolute http(s) URL or a site-relative path.
fn is_web_link(link: &str) -> bool {
    if link.starts_with('/') && !link.starts_with("//") {
        return true;
    }
    url::Url::parse(link)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Saving always writes the canonical list shape; the legacy key is left
/// untouched and stops mattering from here on.
#[put("/social", format = "json", data = "<platforms>")]
pub fn social_put(
    _admin: AdminUser,
    platforms: Json<Vec<SocialPlatformEntry>>,
    settings: &State<SettingsClient>,
) -> Result<Json<Value>, AppError> {
    let mut list = platforms.into_inner();
    for p in &list {
        if p.id.trim().is_empty() {
            return Err(AppError::Invalid("platform id is required".to_string()));
        }
        for link in std::iter::once(&p.url).chain(p.icon_url.as_ref()) {
            if !link.trim().is_empty() && !is_web_link(link) {
                return Err(AppError::Invalid(format!("'{}' is not a valid link", link)));
            }
        }
    }
    list.sort_by_key(|p| p.order);
    let setting = AdvancedSocialSetting {
        platforms: Some(list),
    };
    settings.put(keys::SOCIAL_PLATFORMS, &serde_json::to_value(&setting)?)?;
    Ok(Json(json!({ "success": true })))
}

// ── Sections ───────────────────────────────────────────

/// Create or replace a section. The payload must parse for the section's
/// kind so a bad save is rejected instead of silently rendering defaults.
#[put("/sections", format = "json", data = "<form>")]
pub fn section_put(
    _admin: AdminUser,
    form: Json<SectionForm>,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<Value>, AppError> {
    let kind = defaults::kind_for(&form.page_key, &form.section_key).or_else(|| {
        form.settings
            .get("type")
            .and_then(Value::as_str)
            .and_then(SectionKind::parse)
    });
    let Some(kind) = kind else {
        return Err(AppError::Invalid(format!(
            "section '{}/{}' has no known type",
            form.page_key, form.section_key
        )));
    };
    if SectionContent::parse(kind, &form.settings).is_none() {
        return Err(AppError::Invalid(format!(
            "settings do not match a {:?} section",
            kind
        )));
    }
    let id = store.section_upsert(&form)?;
    Ok(Json(json!({ "id": id })))
}

#[derive(Debug, Deserialize)]
pub struct VisibilityForm {
    pub is_visible: bool,
}

#[patch("/sections/<id>/visibility", format = "json", data = "<form>")]
pub fn section_visibility(
    _admin: AdminUser,
    id: i64,
    form: Json<VisibilityForm>,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<Value>, AppError> {
    store.section_set_visibility(id, form.is_visible)?;
    Ok(Json(json!({ "success": true })))
}

// ── Renewal audit log ──────────────────────────────────

#[get("/renewal-logs?<subscription_id>&<page>&<per_page>")]
pub fn renewal_logs(
    _admin: AdminUser,
    subscription_id: Option<i64>,
    page: Option<i64>,
    per_page: Option<i64>,
    store: &State<Arc<dyn Store>>,
) -> Result<Json<Vec<RenewalLog>>, AppError> {
    let per_page = per_page.unwrap_or(50).clamp(1, 200);
    let offset = (page.unwrap_or(1).max(1) - 1) * per_page;
    Ok(Json(store.renewal_log_list(subscription_id, per_page, offset)?))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        settings_list,
        setting_patch,
        setting_put,
        theme_colors_get,
        theme_colors_put,
        theme_preview,
        theme_mode_put,
        theme_mode_toggle,
        social_get,
        social_put,
        section_put,
        section_visibility,
        renewal_logs,
    ]
}
