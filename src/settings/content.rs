//! Typed site-wide content settings managed from the admin panel. Every
//! struct's `Default` is the hardcoded content shown when the row is
//! missing or malformed.

use serde::{Deserialize, Serialize};

use crate::i18n::{pick, Lang};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_name_en: String,
    pub tagline: String,
    pub tagline_en: String,
    pub logo_url: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub address_en: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            site_name: "كورة".to_string(),
            site_name_en: "Kora".to_string(),
            tagline: "منصة اكتشاف المواهب الرياضية".to_string(),
            tagline_en: "The sports talent discovery platform".to_string(),
            logo_url: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: String::new(),
            address_en: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    #[serde(default)]
    pub label_en: String,
    pub href: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn visible_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItems {
    pub items: Vec<MenuItem>,
}

impl Default for MenuItems {
    fn default() -> Self {
        let entries = [
            ("الرئيسية", "Home", "/"),
            ("اللاعبون", "Players", "/players"),
            ("الأندية", "Clubs", "/clubs"),
            ("الاشتراكات", "Plans", "/subscriptions"),
            ("من نحن", "About", "/about"),
            ("تواصل معنا", "Contact", "/contact"),
        ];
        MenuItems {
            items: entries
                .iter()
                .enumerate()
                .map(|(i, (label, label_en, href))| MenuItem {
                    label: label.to_string(),
                    label_en: label_en.to_string(),
                    href: href.to_string(),
                    order: i as i64,
                    visible: true,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub image_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub subtitle_en: String,
    #[serde(default)]
    pub cta_text: String,
    #[serde(default)]
    pub cta_text_en: String,
    #[serde(default)]
    pub cta_link: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "visible_by_default")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSlider {
    #[serde(default)]
    pub autoplay_ms: u64,
    pub slides: Vec<Slide>,
}

impl Default for HeroSlider {
    fn default() -> Self {
        HeroSlider {
            autoplay_ms: 5000,
            slides: vec![Slide {
                image_url: "/static/hero/stadium.jpg".to_string(),
                title: "اكتشف نجوم المستقبل".to_string(),
                title_en: "Discover the stars of tomorrow".to_string(),
                subtitle: "سجّل ملفك ودع الأندية تجدك".to_string(),
                subtitle_en: "Create your profile and let clubs find you".to_string(),
                cta_text: "سجّل الآن".to_string(),
                cta_text_en: "Register now".to_string(),
                cta_link: "/register".to_string(),
                order: 0,
                active: true,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterLink {
    pub label: String,
    #[serde(default)]
    pub label_en: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSettings {
    pub description: String,
    pub description_en: String,
    pub copyright: String,
    pub copyright_en: String,
    pub quick_links: Vec<FooterLink>,
    pub show_social: bool,
}

impl Default for FooterSettings {
    fn default() -> Self {
        FooterSettings {
            description: "نربط المواهب الرياضية بالأندية الباحثة عنها".to_string(),
            description_en: "Connecting sports talent with the clubs looking for it".to_string(),
            copyright: "جميع الحقوق محفوظة".to_string(),
            copyright_en: "All rights reserved".to_string(),
            quick_links: vec![
                FooterLink {
                    label: "الشروط والأحكام".to_string(),
                    label_en: "Terms".to_string(),
                    href: "/terms".to_string(),
                },
                FooterLink {
                    label: "سياسة الخصوصية".to_string(),
                    label_en: "Privacy".to_string(),
                    href: "/privacy".to_string(),
                },
            ],
            show_social: true,
        }
    }
}

// ── Language-resolved views ────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedSlide {
    pub image_url: String,
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedSite {
    pub name: String,
    pub tagline: String,
    pub logo_url: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedFooter {
    pub description: String,
    pub copyright: String,
    pub quick_links: Vec<ResolvedLink>,
    pub show_social: bool,
}

impl SiteSettings {
    pub fn resolve(&self, lang: Lang) -> ResolvedSite {
        let dir = lang.direction();
        ResolvedSite {
            name: pick(&self.site_name, &self.site_name_en, dir).to_string(),
            tagline: pick(&self.tagline, &self.tagline_en, dir).to_string(),
            logo_url: self.logo_url.clone(),
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
            address: pick(&self.address, &self.address_en, dir).to_string(),
        }
    }
}

impl MenuItems {
    pub fn resolve(&self, lang: Lang) -> Vec<ResolvedLink> {
        let mut items: Vec<&MenuItem> = self.items.iter().filter(|i| i.visible).collect();
        items.sort_by_key(|i| i.order);
        items
            .into_iter()
            .map(|i| ResolvedLink {
                label: pick(&i.label, &i.label_en, lang.direction()).to_string(),
                href: i.href.clone(),
            })
            .collect()
    }
}

impl HeroSlider {
    pub fn resolve(&self, lang: Lang) -> Vec<ResolvedSlide> {
        let dir = lang.direction();
        let mut slides: Vec<&Slide> = self.slides.iter().filter(|s| s.active).collect();
        slides.sort_by_key(|s| s.order);
        slides
            .into_iter()
            .map(|s| ResolvedSlide {
                image_url: s.image_url.clone(),
                title: pick(&s.title, &s.title_en, dir).to_string(),
                subtitle: pick(&s.subtitle, &s.subtitle_en, dir).to_string(),
                cta_text: pick(&s.cta_text, &s.cta_text_en, dir).to_string(),
                cta_link: s.cta_link.clone(),
            })
            .collect()
    }
}

impl FooterSettings {
    pub fn resolve(&self, lang: Lang) -> ResolvedFooter {
        let dir = lang.direction();
        ResolvedFooter {
            description: pick(&self.description, &self.description_en, dir).to_string(),
            copyright: pick(&self.copyright, &self.copyright_en, dir).to_string(),
            quick_links: self
                .quick_links
                .iter()
                .map(|l| ResolvedLink {
                    label: pick(&l.label, &l.label_en, dir).to_string(),
                    href: l.href.clone(),
                })
                .collect(),
            show_social: self.show_social,
        }
    }
}
