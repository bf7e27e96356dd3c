use once_cell::sync::Lazy;
use regex::Regex;
use rocket::tokio::sync::watch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{resolve_tokens, ModeChannel, PreviewOverride, ThemeColors, ThemeMode, TOKEN_VARS};
use crate::color::is_valid_triplet;

/// Destination of resolved variables.
pub trait StyleSink {
    fn set_var(&mut self, name: &str, value: &str);
}

/// In-memory variable block, rendered to CSS on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CssVariables {
    vars: BTreeMap<String, String>,
}

impl CssVariables {
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn to_block(&self, selector: &str) -> String {
        let mut out = format!("{} {{\n", selector);
        for (name, value) in &self.vars {
            out.push_str(&format!("  {}: {};\n", name, value));
        }
        out.push_str("}\n");
        out
    }
}

impl StyleSink for CssVariables {
    fn set_var(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }
}

/// Step 3 of resolution: write every known, non-empty, valid token. Nothing
/// is ever removed, so a skipped token keeps its previous value.
fn write_tokens(tokens: &BTreeMap<String, String>, sink: &mut dyn StyleSink) -> usize {
    let mut written = 0;
    for (name, var) in TOKEN_VARS {
        if let Some(value) = tokens.get(*name) {
            let value = value.trim();
            if !value.is_empty() && is_valid_triplet(value) {
                sink.set_var(var, value);
                written += 1;
            }
        }
    }
    written
}

/// Keeps a sink in step with the current mode, the stored colors and any
/// live preview. Every input change triggers a full, immediate re-apply.
pub struct ThemeController<S: StyleSink> {
    mode_rx: watch::Receiver<ThemeMode>,
    mode: ThemeMode,
    stored: Option<ThemeColors>,
    preview: Option<PreviewOverride>,
    sink: S,
}

impl<S: StyleSink> ThemeController<S> {
    /// The initial mode is read synchronously so the first apply already
    /// uses the right set.
    pub fn new(channel: &ModeChannel, sink: S) -> Self {
        let mut mode_rx = channel.subscribe();
        let mode = *mode_rx.borrow_and_update();
        ThemeController {
            mode_rx,
            mode,
            stored: None,
            preview: None,
            sink,
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn set_stored(&mut self, colors: ThemeColors) -> usize {
        self.stored = Some(colors);
        self.apply()
    }

    pub fn set_preview(&mut self, preview: Option<PreviewOverride>) -> usize {
        self.preview = preview;
        self.apply()
    }

    /// Wait for the next mode change and re-apply. Returns `false` once the
    /// channel has been dropped.
    pub async fn next_mode_change(&mut self) -> bool {
        if self.mode_rx.changed().await.is_err() {
            return false;
        }
        self.mode = *self.mode_rx.borrow_and_update();
        self.apply();
        true
    }

    /// Resolve and write. A missing set for the current mode is a no-op.
    pub fn apply(&mut self) -> usize {
        let Some(colors) = self.stored.as_ref() else {
            return 0;
        };
        match resolve_tokens(colors, self.mode, self.preview.as_ref()) {
            Some(tokens) => write_tokens(&tokens, &mut self.sink),
            None => 0,
        }
    }
}

static VAR_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Optional `theme_style_overrides` setting: extra raw variables per mode
/// (radius, fonts, shadows) written after the color tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverrides {
    #[serde(default)]
    pub light: BTreeMap<String, String>,
    #[serde(default)]
    pub dark: BTreeMap<String, String>,
}

impl StyleOverrides {
    fn for_mode(&self, mode: ThemeMode) -> &BTreeMap<String, String> {
        match mode {
            ThemeMode::Light => &self.light,
            ThemeMode::Dark => &self.dark,
        }
    }

    fn write(&self, mode: ThemeMode, sink: &mut dyn StyleSink) {
        for (name, value) in self.for_mode(mode) {
            let name = name.trim_start_matches("--");
            let value = value.trim();
            if !VAR_NAME_RE.is_match(name)
                || value.is_empty()
                || value.contains(|c| matches!(c, ';' | '{' | '}' | '<' | '>'))
            {
                continue;
            }
            sink.set_var(&format!("--{}", name), value);
        }
    }
}

/// Resolve a single mode into a variable block.
pub fn resolve_block(
    colors: &ThemeColors,
    overrides: &StyleOverrides,
    mode: ThemeMode,
    preview: Option<PreviewOverride>,
) -> CssVariables {
    let channel = ModeChannel::new(mode);
    let mut controller = ThemeController::new(&channel, CssVariables::default());
    controller.set_preview(preview);
    controller.set_stored(colors.clone());
    let mut vars = controller.into_sink();
    overrides.write(mode, &mut vars);
    vars
}

/// Full stylesheet: light variables on `:root`, dark ones on `.dark`.
pub fn render_stylesheet(colors: &ThemeColors, overrides: &StyleOverrides) -> String {
    let mut blocks = Vec::new();
    for mode in [ThemeMode::Light, ThemeMode::Dark] {
        let vars = resolve_block(colors, overrides, mode, None);
        if !vars.is_empty() {
            blocks.push(vars.to_block(mode.selector()));
        }
    }
    blocks.join("\n")
}
