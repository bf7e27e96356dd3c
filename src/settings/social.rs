use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{keys, Fetched, Missing, SettingsClient};
use crate::i18n::{pick, Lang};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    #[default]
    Builtin,
    Custom,
}

/// One configured social link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPlatformEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "nameEn")]
    pub name_en: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default, alias = "iconType")]
    pub icon_type: IconKind,
    #[serde(default, alias = "iconUrl", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// The canonical setting shape: `{ "platforms": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvancedSocialSetting {
    #[serde(default)]
    pub platforms: Option<Vec<SocialPlatformEntry>>,
}

/// Built-in platforms in display order: (id, Arabic name, English name).
pub const BUILTIN_PLATFORMS: [(&str, &str, &str); 10] = [
    ("facebook", "فيسبوك", "Facebook"),
    ("twitter", "تويتر", "Twitter"),
    ("instagram", "إنستغرام", "Instagram"),
    ("youtube", "يوتيوب", "YouTube"),
    ("tiktok", "تيك توك", "TikTok"),
    ("whatsapp", "واتساب", "WhatsApp"),
    ("snapchat", "سناب شات", "Snapchat"),
    ("linkedin", "لينكد إن", "LinkedIn"),
    ("telegram", "تيليجرام", "Telegram"),
    ("pinterest", "بينترست", "Pinterest"),
];

fn builtin_list(urls: Option<&HashMap<String, String>>) -> Vec<SocialPlatformEntry> {
    BUILTIN_PLATFORMS
        .iter()
        .enumerate()
        .map(|(i, (id, name, name_en))| SocialPlatformEntry {
            id: id.to_string(),
            name: name.to_string(),
            name_en: name_en.to_string(),
            url: urls
                .and_then(|m| m.get(*id))
                .cloned()
                .unwrap_or_default(),
            enabled: true,
            order: i as i64,
            icon_type: IconKind::Builtin,
            icon_url: None,
        })
        .collect()
}

/// Flatten a legacy `{ platform_id: url }` value. Non-string values are ignored.
fn legacy_urls(legacy: &Value) -> HashMap<String, String> {
    legacy
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Entries of a stored `platforms` array. A malformed entry is dropped on
/// its own; the rest of the list stands.
fn advanced_entries(list: &[Value]) -> Vec<SocialPlatformEntry> {
    list.iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            match serde_json::from_value::<SocialPlatformEntry>(entry.clone()) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("[settings] skipping social platform #{}: {}", i, e);
                    None
                }
            }
        })
        .collect()
}

/// Reconcile the canonical list with the legacy flat mapping at read time.
/// The canonical list always wins once present; nothing is written back.
pub fn resolve_platform_list(
    advanced: Option<&Value>,
    legacy: Option<&Value>,
) -> Vec<SocialPlatformEntry> {
    if let Some(list) = advanced
        .and_then(|v| v.get("platforms"))
        .and_then(Value::as_array)
    {
        return advanced_entries(list);
    }
    match legacy {
        Some(map) => builtin_list(Some(&legacy_urls(map))),
        None => builtin_list(None),
    }
}

/// Current platform list from both settings keys. Either read failing is
/// treated as that key being absent.
pub fn load_platforms(settings: &SettingsClient) -> Vec<SocialPlatformEntry> {
    let read = |key: &str| match settings.fetch(key, Missing::UseDefault) {
        Fetched::Value(v) => Some(v),
        Fetched::UsingDefault => None,
        Fetched::Failed(e) => {
            log::warn!("[settings] '{}' unavailable: {}", key, e);
            None
        }
    };
    let advanced = read(keys::SOCIAL_PLATFORMS);
    let legacy = read(keys::SOCIAL_LINKS);
    resolve_platform_list(advanced.as_ref(), legacy.as_ref())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedPlatform {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon_type: IconKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Platforms a footer should render: enabled, with a url, ordered.
pub fn visible_platforms(list: &[SocialPlatformEntry], lang: Lang) -> Vec<ResolvedPlatform> {
    let mut shown: Vec<&SocialPlatformEntry> = list
        .iter()
        .filter(|p| p.enabled && !p.url.trim().is_empty())
        .collect();
    shown.sort_by_key(|p| p.order);
    shown
        .into_iter()
        .map(|p| ResolvedPlatform {
            id: p.id.clone(),
            name: pick(&p.name, &p.name_en, lang.direction()).to_string(),
            url: p.url.clone(),
            icon_type: p.icon_type,
            icon_url: p.icon_url.clone(),
        })
        .collect()
}
