pub mod content;
pub mod fetch;
pub mod social;

pub use fetch::{Fetched, Missing, SettingsClient};

/// Setting keys. Required keys are seeded by `db::seed_defaults`; optional
/// ones may be absent on any installation.
pub mod keys {
    pub const THEME_COLORS: &str = "theme_colors";
    pub const SITE_SETTINGS: &str = "site_settings";
    pub const MENU_ITEMS: &str = "menu_items";
    pub const HERO_SLIDER: &str = "hero_slider";
    pub const FOOTER_SETTINGS: &str = "footer_settings";
    /// Legacy flat `{ platform: url }` mapping.
    pub const SOCIAL_LINKS: &str = "social_links";

    // Optional
    pub const SOCIAL_PLATFORMS: &str = "social_platforms";
    pub const THEME_STYLE_OVERRIDES: &str = "theme_style_overrides";
    /// Site-wide color mode published to live theme subscribers.
    pub const THEME_MODE: &str = "theme_mode";

    // Background task tunables
    pub const TASK_AUTO_RENEW_INTERVAL: &str = "task_auto_renew_interval";
    pub const TASK_REMINDER_INTERVAL: &str = "task_consultation_reminder_interval";
    pub const TASK_RENEWAL_LOG_MAX_AGE_DAYS: &str = "task_renewal_log_max_age_days";

    /// Keys the settings client caches. Anything else is read through.
    pub const CACHED: &[&str] = &[
        THEME_COLORS,
        THEME_MODE,
        SITE_SETTINGS,
        MENU_ITEMS,
        HERO_SLIDER,
        FOOTER_SETTINGS,
        SOCIAL_LINKS,
        SOCIAL_PLATFORMS,
        THEME_STYLE_OVERRIDES,
    ];
}
