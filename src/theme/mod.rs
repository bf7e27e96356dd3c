//! Database-driven color theming.
//!
//! Colors are stored per mode as HSL triplets (`"45 90% 55%"`) under the
//! `theme_colors` setting and pushed into CSS custom properties. An unsaved
//! `PreviewOverride` from the admin color editor can be layered on top of
//! the matching mode while the admin experiments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::color::{normalize_color, to_hex};

pub mod apply;
pub mod mode;

pub use apply::{render_stylesheet, resolve_block, CssVariables, StyleOverrides, ThemeController};
pub use mode::ModeChannel;

pub type TokenMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Selector the mode's variables are scoped to in the stylesheet.
    pub fn selector(self) -> &'static str {
        match self {
            ThemeMode::Light => ":root",
            ThemeMode::Dark => ".dark",
        }
    }
}

/// Semantic token name → CSS variable. Names outside this table are ignored.
pub const TOKEN_VARS: &[(&str, &str)] = &[
    ("background", "--background"),
    ("foreground", "--foreground"),
    ("card", "--card"),
    ("cardForeground", "--card-foreground"),
    ("popover", "--popover"),
    ("popoverForeground", "--popover-foreground"),
    ("primary", "--primary"),
    ("primaryForeground", "--primary-foreground"),
    ("secondary", "--secondary"),
    ("secondaryForeground", "--secondary-foreground"),
    ("muted", "--muted"),
    ("mutedForeground", "--muted-foreground"),
    ("accent", "--accent"),
    ("accentForeground", "--accent-foreground"),
    ("destructive", "--destructive"),
    ("destructiveForeground", "--destructive-foreground"),
    ("border", "--border"),
    ("input", "--input"),
    ("ring", "--ring"),
    ("gold", "--gold"),
    ("pitch", "--pitch"),
];

pub fn css_var_for(token: &str) -> Option<&'static str> {
    TOKEN_VARS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, var)| *var)
}

/// The per-mode color set.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColorSet {
    pub mode: ThemeMode,
    pub tokens: TokenMap,
}

/// Shape of the `theme_colors` setting. A mode key that is missing means
/// there is nothing to apply for that mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    #[serde(default)]
    pub light: Option<TokenMap>,
    #[serde(default)]
    pub dark: Option<TokenMap>,
}

impl ThemeColors {
    pub fn set_for(&self, mode: ThemeMode) -> Option<ThemeColorSet> {
        let tokens = match mode {
            ThemeMode::Light => self.light.as_ref(),
            ThemeMode::Dark => self.dark.as_ref(),
        }?;
        Some(ThemeColorSet {
            mode,
            tokens: tokens.clone(),
        })
    }

    /// Merge edits into one mode's tokens. Known names with a valid triplet
    /// or hex value overwrite; everything else leaves the stored value as is.
    pub fn merge_mode(mut self, mode: ThemeMode, edits: TokenMap) -> Self {
        let set = match mode {
            ThemeMode::Light => self.light.get_or_insert_with(TokenMap::new),
            ThemeMode::Dark => self.dark.get_or_insert_with(TokenMap::new),
        };
        set.extend(clean_tokens(edits));
        self
    }

    /// `#rrggbb` for every stored token, for the color editor's pickers.
    pub fn swatches(&self) -> Swatches {
        let hex = |set: &Option<TokenMap>| -> TokenMap {
            set.iter()
                .flatten()
                .map(|(k, v)| (k.clone(), to_hex(v)))
                .collect()
        };
        Swatches {
            light: hex(&self.light),
            dark: hex(&self.dark),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swatches {
    pub light: TokenMap,
    pub dark: TokenMap,
}

/// Known token names with values normalized to triplets; the rest dropped.
fn clean_tokens(tokens: TokenMap) -> TokenMap {
    tokens
        .into_iter()
        .filter(|(k, _)| css_var_for(k).is_some())
        .filter_map(|(k, v)| normalize_color(&v).map(|v| (k, v)))
        .collect()
}

fn tokens(pairs: &[(&str, &str)]) -> TokenMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for ThemeColors {
    fn default() -> Self {
        ThemeColors {
            light: Some(tokens(&[
                ("background", "0 0% 100%"),
                ("foreground", "222 47% 11%"),
                ("card", "0 0% 100%"),
                ("cardForeground", "222 47% 11%"),
                ("popover", "0 0% 100%"),
                ("popoverForeground", "222 47% 11%"),
                ("primary", "142 71% 35%"),
                ("primaryForeground", "0 0% 100%"),
                ("secondary", "210 40% 96%"),
                ("secondaryForeground", "222 47% 11%"),
                ("muted", "210 40% 96%"),
                ("mutedForeground", "215 16% 47%"),
                ("accent", "45 90% 55%"),
                ("accentForeground", "222 47% 11%"),
                ("destructive", "0 84% 60%"),
                ("destructiveForeground", "0 0% 100%"),
                ("border", "214 32% 91%"),
                ("input", "214 32% 91%"),
                ("ring", "142 71% 35%"),
                ("gold", "45 90% 55%"),
                ("pitch", "142 60% 28%"),
            ])),
            dark: Some(tokens(&[
                ("background", "222 47% 7%"),
                ("foreground", "210 40% 98%"),
                ("card", "222 47% 10%"),
                ("cardForeground", "210 40% 98%"),
                ("popover", "222 47% 10%"),
                ("popoverForeground", "210 40% 98%"),
                ("primary", "142 65% 45%"),
                ("primaryForeground", "222 47% 7%"),
                ("secondary", "217 33% 17%"),
                ("secondaryForeground", "210 40% 98%"),
                ("muted", "217 33% 17%"),
                ("mutedForeground", "215 20% 65%"),
                ("accent", "45 90% 55%"),
                ("accentForeground", "222 47% 7%"),
                ("destructive", "0 63% 31%"),
                ("destructiveForeground", "210 40% 98%"),
                ("border", "217 33% 17%"),
                ("input", "217 33% 17%"),
                ("ring", "142 65% 45%"),
                ("gold", "45 90% 55%"),
                ("pitch", "142 50% 22%"),
            ])),
        }
    }
}

/// Unsaved edits from the color editor. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewOverride {
    pub mode: ThemeMode,
    #[serde(default)]
    pub tokens: TokenMap,
}

impl PreviewOverride {
    /// Hex values become triplets; unknown or unreadable edits are dropped
    /// so they never mask a stored color.
    pub fn normalized(self) -> Self {
        PreviewOverride {
            mode: self.mode,
            tokens: clean_tokens(self.tokens),
        }
    }
}

/// Steps 1 and 2 of resolution: the stored set for `mode`, with the preview
/// merged over it only when the preview targets that same mode.
pub fn resolve_tokens(
    colors: &ThemeColors,
    mode: ThemeMode,
    preview: Option<&PreviewOverride>,
) -> Option<TokenMap> {
    let mut set = colors.set_for(mode)?.tokens;
    if let Some(p) = preview.filter(|p| p.mode == mode) {
        for (k, v) in &p.tokens {
            set.insert(k.clone(), v.clone());
        }
    }
    Some(set)
}
