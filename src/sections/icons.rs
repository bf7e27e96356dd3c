use serde::Serialize;

/// Icons section payloads may reference by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Trophy,
    Users,
    UserPlus,
    Star,
    Shield,
    Target,
    Zap,
    Heart,
    Globe,
    Award,
    CheckCircle,
    Search,
    MessageCircle,
    Calendar,
    TrendingUp,
    Video,
    Building,
    Medal,
}

pub const DEFAULT_ICON: Icon = Icon::Star;

const ICON_TABLE: &[(&str, Icon)] = &[
    ("trophy", Icon::Trophy),
    ("users", Icon::Users),
    ("userplus", Icon::UserPlus),
    ("star", Icon::Star),
    ("shield", Icon::Shield),
    ("target", Icon::Target),
    ("zap", Icon::Zap),
    ("heart", Icon::Heart),
    ("globe", Icon::Globe),
    ("award", Icon::Award),
    ("checkcircle", Icon::CheckCircle),
    ("search", Icon::Search),
    ("messagecircle", Icon::MessageCircle),
    ("calendar", Icon::Calendar),
    ("trendingup", Icon::TrendingUp),
    ("video", Icon::Video),
    ("building", Icon::Building),
    ("medal", Icon::Medal),
];

/// Look up an icon by name. `CheckCircle`, `check-circle` and
/// `check_circle` all match; anything unknown gets `DEFAULT_ICON`.
pub fn resolve_icon(name: &str) -> Icon {
    let key: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    ICON_TABLE
        .iter()
        .find(|(n, _)| *n == key)
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_ICON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_variants_resolve() {
        assert_eq!(resolve_icon("CheckCircle"), Icon::CheckCircle);
        assert_eq!(resolve_icon("check-circle"), Icon::CheckCircle);
        assert_eq!(resolve_icon("trophy"), Icon::Trophy);
    }

    #[test]
    fn unknown_falls_back() {
        assert_eq!(resolve_icon("Rocket"), DEFAULT_ICON);
        assert_eq!(resolve_icon(""), DEFAULT_ICON);
    }

    #[test]
    fn serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&Icon::TrendingUp).unwrap(), "\"trending-up\"");
    }
}
