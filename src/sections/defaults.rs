//! Registered sections and their hardcoded fallback content.

use super::{
    Card, CardsContent, Feature, FeaturesContent, Heading, SectionContent, SectionKind, Step,
    StepsContent,
};

/// `(page_key, section_key, kind)` in the order pages render them.
pub const REGISTRY: &[(&str, &str, SectionKind)] = &[
    ("home", "services", SectionKind::Cards),
    ("home", "features", SectionKind::Features),
    ("home", "how_it_works", SectionKind::Steps),
    ("about", "values", SectionKind::Cards),
    ("clubs", "benefits", SectionKind::Features),
];

pub fn kind_for(page_key: &str, section_key: &str) -> Option<SectionKind> {
    REGISTRY
        .iter()
        .find(|(p, s, _)| *p == page_key && *s == section_key)
        .map(|(_, _, kind)| *kind)
}

pub fn registered_keys(page_key: &str) -> impl Iterator<Item = &'static str> + '_ {
    REGISTRY
        .iter()
        .filter(move |(p, _, _)| *p == page_key)
        .map(|(_, s, _)| *s)
}

fn heading(title: &str, title_en: &str, subtitle: &str, subtitle_en: &str) -> Heading {
    Heading {
        title: title.to_string(),
        title_en: title_en.to_string(),
        subtitle: subtitle.to_string(),
        subtitle_en: subtitle_en.to_string(),
    }
}

fn card(icon: &str, title: &str, title_en: &str, description: &str, description_en: &str) -> Card {
    Card {
        icon: icon.to_string(),
        title: title.to_string(),
        title_en: title_en.to_string(),
        description: description.to_string(),
        description_en: description_en.to_string(),
    }
}

fn feature(icon: &str, text: &str, text_en: &str) -> Feature {
    Feature {
        icon: icon.to_string(),
        text: text.to_string(),
        text_en: text_en.to_string(),
    }
}

fn step(icon: &str, title: &str, title_en: &str, description: &str, description_en: &str) -> Step {
    Step {
        icon: icon.to_string(),
        title: title.to_string(),
        title_en: title_en.to_string(),
        description: description.to_string(),
        description_en: description_en.to_string(),
    }
}

pub fn default_content(page_key: &str, section_key: &str) -> Option<SectionContent> {
    let content = match (page_key, section_key) {
        ("home", "services") => SectionContent::Cards(CardsContent {
            heading: heading(
                "خدماتنا",
                "Our Services",
                "كل ما تحتاجه لبناء مسيرتك الرياضية",
                "Everything you need to build your sports career",
            ),
            cards: vec![
                card(
                    "Users",
                    "ملفات اللاعبين",
                    "Player Profiles",
                    "اعرض مهاراتك وإحصائياتك أمام الأندية",
                    "Showcase your skills and stats to clubs",
                ),
                card(
                    "Search",
                    "اكتشاف المواهب",
                    "Talent Discovery",
                    "تبحث الأندية عن اللاعبين حسب المركز والعمر",
                    "Clubs search players by position and age",
                ),
                card(
                    "Calendar",
                    "الاستشارات",
                    "Consultations",
                    "احجز جلسة مع خبير لتطوير مسيرتك",
                    "Book a session with an expert to grow your career",
                ),
            ],
        }),
        ("home", "features") => SectionContent::Features(FeaturesContent {
            heading: heading("لماذا نحن", "Why Us", "", ""),
            features: vec![
                feature("Shield", "ملفات موثقة", "Verified profiles"),
                feature("Video", "مقاطع فيديو للمهارات", "Skill videos"),
                feature("Globe", "أندية من كل مكان", "Clubs from everywhere"),
                feature("TrendingUp", "تتبع تطورك", "Track your progress"),
            ],
        }),
        ("home", "how_it_works") => SectionContent::Steps(StepsContent {
            heading: heading("كيف يعمل", "How It Works", "", ""),
            steps: vec![
                step(
                    "UserPlus",
                    "أنشئ حسابك",
                    "Create your account",
                    "سجل كلاعب أو نادٍ",
                    "Sign up as a player or a club",
                ),
                step(
                    "Star",
                    "اختر باقتك",
                    "Choose a plan",
                    "اشترك للوصول إلى جميع المزايا",
                    "Subscribe to unlock every feature",
                ),
                step(
                    "Target",
                    "ابدأ التواصل",
                    "Start connecting",
                    "تواصل مع الأندية واللاعبين",
                    "Connect with clubs and players",
                ),
            ],
        }),
        ("about", "values") => SectionContent::Cards(CardsContent {
            heading: heading("قيمنا", "Our Values", "", ""),
            cards: vec![
                card(
                    "Heart",
                    "الشغف",
                    "Passion",
                    "نحب الرياضة ونخدم أهلها",
                    "We love sport and serve its people",
                ),
                card(
                    "Shield",
                    "الثقة",
                    "Trust",
                    "بيانات موثقة وتواصل آمن",
                    "Verified data and safe communication",
                ),
                card(
                    "Award",
                    "التميز",
                    "Excellence",
                    "نسعى لأفضل تجربة ممكنة",
                    "We aim for the best possible experience",
                ),
            ],
        }),
        ("clubs", "benefits") => SectionContent::Features(FeaturesContent {
            heading: heading("مزايا الأندية", "Club Benefits", "", ""),
            features: vec![
                feature("Search", "بحث متقدم عن اللاعبين", "Advanced player search"),
                feature("Star", "قوائم اهتمام خاصة", "Private interest lists"),
                feature("MessageCircle", "تواصل مباشر", "Direct contact"),
            ],
        }),
        _ => return None,
    };
    Some(content)
}
