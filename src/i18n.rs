use rocket::form::{self, FromFormField, ValueField};
use serde::{Deserialize, Serialize};

/// Active site language. Arabic is the primary language of every
/// bilingual field; English is the optional secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ar,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rtl,
    Ltr,
}

impl Lang {
    pub fn direction(self) -> Direction {
        match self {
            Lang::Ar => Direction::Rtl,
            Lang::En => Direction::Ltr,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::Ar => "ar",
            Lang::En => "en",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ar" => Some(Lang::Ar),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    /// First supported language in an `Accept-Language` header, Arabic otherwise.
    pub fn from_accept_language(header: Option<&str>) -> Self {
        header
            .into_iter()
            .flat_map(|h| h.split(','))
            .filter_map(|part| part.split(';').next())
            .filter_map(|tag| Lang::parse(tag.split('-').next().unwrap_or("")))
            .next()
            .unwrap_or_default()
    }
}

#[rocket::async_trait]
impl<'v> FromFormField<'v> for Lang {
    fn from_value(field: ValueField<'v>) -> form::Result<'v, Self> {
        Lang::parse(field.value)
            .ok_or_else(|| form::Error::validation("expected `ar` or `en`").into())
    }
}

/// Pick between a primary (Arabic) string and its English counterpart.
/// English wins only for left-to-right reading and only when it has content.
pub fn pick<'a>(primary: &'a str, english: &'a str, direction: Direction) -> &'a str {
    if direction == Direction::Ltr && !english.trim().is_empty() {
        english
    } else {
        primary
    }
}
