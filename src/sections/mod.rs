//! Per-page content blocks.
//!
//! A section's stored `settings` JSON is parsed into the typed payload for
//! its kind before use. A record that is missing, or whose payload does not
//! parse, is replaced as a whole by the hardcoded default for that section;
//! there is never a field-by-field merge of the two.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::i18n::{pick, Lang};
use crate::models::section::PageSection;

pub mod defaults;
pub mod icons;

use icons::{resolve_icon, Icon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Cards,
    Features,
    Steps,
}

impl SectionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cards" => Some(SectionKind::Cards),
            "features" => Some(SectionKind::Features),
            "steps" => Some(SectionKind::Steps),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_en: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub icon: String,
    pub text: String,
    #[serde(default)]
    pub text_en: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_en: String,
}

/// Heading shared by every section kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub title: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub subtitle_en: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardsContent {
    #[serde(flatten)]
    pub heading: Heading,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesContent {
    #[serde(flatten)]
    pub heading: Heading,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepsContent {
    #[serde(flatten)]
    pub heading: Heading,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    Cards(CardsContent),
    Features(FeaturesContent),
    Steps(StepsContent),
}

impl SectionContent {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionContent::Cards(_) => SectionKind::Cards,
            SectionContent::Features(_) => SectionKind::Features,
            SectionContent::Steps(_) => SectionKind::Steps,
        }
    }

    /// Validating parse: the payload must match `kind` and carry at least
    /// one list item.
    pub fn parse(kind: SectionKind, value: &Value) -> Option<SectionContent> {
        let content = match kind {
            SectionKind::Cards => {
                SectionContent::Cards(serde_json::from_value(value.clone()).ok()?)
            }
            SectionKind::Features => {
                SectionContent::Features(serde_json::from_value(value.clone()).ok()?)
            }
            SectionKind::Steps => {
                SectionContent::Steps(serde_json::from_value(value.clone()).ok()?)
            }
        };
        if content.item_count() == 0 {
            return None;
        }
        Some(content)
    }

    fn item_count(&self) -> usize {
        match self {
            SectionContent::Cards(c) => c.cards.len(),
            SectionContent::Features(f) => f.features.len(),
            SectionContent::Steps(s) => s.steps.len(),
        }
    }

    fn heading(&self) -> &Heading {
        match self {
            SectionContent::Cards(c) => &c.heading,
            SectionContent::Features(f) => &f.heading,
            SectionContent::Steps(s) => &s.heading,
        }
    }

    pub fn resolve(&self, section_key: &str, lang: Lang, from_default: bool) -> ResolvedSection {
        let dir = lang.direction();
        let heading = self.heading();
        let items = match self {
            SectionContent::Cards(c) => c
                .cards
                .iter()
                .map(|card| ResolvedItem {
                    icon: resolve_icon(&card.icon),
                    title: pick(&card.title, &card.title_en, dir).to_string(),
                    description: pick(&card.description, &card.description_en, dir).to_string(),
                })
                .collect(),
            SectionContent::Features(f) => f
                .features
                .iter()
                .map(|feature| ResolvedItem {
                    icon: resolve_icon(&feature.icon),
                    title: pick(&feature.text, &feature.text_en, dir).to_string(),
                    description: String::new(),
                })
                .collect(),
            SectionContent::Steps(s) => s
                .steps
                .iter()
                .map(|step| ResolvedItem {
                    icon: resolve_icon(&step.icon),
                    title: pick(&step.title, &step.title_en, dir).to_string(),
                    description: pick(&step.description, &step.description_en, dir).to_string(),
                })
                .collect(),
        };
        ResolvedSection {
            section_key: section_key.to_string(),
            kind: self.kind(),
            title: pick(&heading.title, &heading.title_en, dir).to_string(),
            subtitle: pick(&heading.subtitle, &heading.subtitle_en, dir).to_string(),
            items,
            from_default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedItem {
    pub icon: Icon,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSection {
    pub section_key: String,
    pub kind: SectionKind,
    pub title: String,
    pub subtitle: String,
    pub items: Vec<ResolvedItem>,
    pub from_default: bool,
}

/// Kind of a stored record: the registered kind for the key, else the
/// record's own `type` field.
fn record_kind(page_key: &str, record: &PageSection) -> Option<SectionKind> {
    defaults::kind_for(page_key, &record.section_key).or_else(|| {
        record
            .settings
            .get("type")
            .and_then(Value::as_str)
            .and_then(SectionKind::parse)
    })
}

/// Resolve one section of a page. `None` means render nothing: the record
/// is hidden, or there is neither a usable record nor a default.
pub fn compose_section(
    sections: &[PageSection],
    page_key: &str,
    section_key: &str,
    lang: Lang,
) -> Option<ResolvedSection> {
    let record = sections.iter().find(|s| s.section_key == section_key);
    if let Some(rec) = record {
        if !rec.is_visible {
            return None;
        }
        if let Some(content) =
            record_kind(page_key, rec).and_then(|kind| SectionContent::parse(kind, &rec.settings))
        {
            return Some(content.resolve(section_key, lang, false));
        }
        log::debug!(
            "[sections] {}/{} payload unusable, using default",
            page_key,
            section_key
        );
    }
    defaults::default_content(page_key, section_key)
        .map(|content| content.resolve(section_key, lang, true))
}

/// Resolve a whole page: stored sections in their order, then registered
/// sections that have no record yet, in registry order.
pub fn compose_page(sections: &[PageSection], page_key: &str, lang: Lang) -> Vec<ResolvedSection> {
    let mut keys: Vec<&str> = sections.iter().map(|s| s.section_key.as_str()).collect();
    for key in defaults::registered_keys(page_key) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys.into_iter()
        .filter_map(|key| compose_section(sections, page_key, key, lang))
        .collect()
}
