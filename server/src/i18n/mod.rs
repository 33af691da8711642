//! English/Arabic translation lookup
//!
//! Lookups fall back to the key itself when the active language has no
//! string for it, so a missing translation shows up as its key rather than
//! as an empty label.

mod tables;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

#[derive(Debug, Error)]
#[error("Unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Language::En => TextDirection::Ltr,
            Language::Ar => TextDirection::Rtl,
        }
    }

    /// The other supported language
    pub fn toggled(&self) -> Language {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    /// Label of the switcher button, written in the language it switches to
    pub fn switch_label(&self) -> &'static str {
        match self {
            Language::En => "عربي",
            Language::Ar => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

type Table = HashMap<&'static str, &'static str>;

static EN_TABLE: LazyLock<Table> = LazyLock::new(|| tables::EN.iter().copied().collect());
static AR_TABLE: LazyLock<Table> = LazyLock::new(|| tables::AR.iter().copied().collect());

fn table(language: Language) -> &'static Table {
    match language {
        Language::En => &EN_TABLE,
        Language::Ar => &AR_TABLE,
    }
}

/// Look up `key` in `language`, falling back to the key
pub fn translate(language: Language, key: &str) -> &str {
    table(language).get(key).copied().unwrap_or(key)
}

/// Holds the active language for a view
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Switch to the other language and return it
    pub fn toggle(&mut self) -> Language {
        self.language = self.language.toggled();
        self.language
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        translate(self.language, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_in_both_languages() {
        let mut t = Translator::default();
        assert_eq!(t.t("services.title"), "Our Services");
        t.set_language(Language::Ar);
        assert_eq!(t.t("services.title"), "خدماتنا");
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let t = Translator::new(Language::Ar);
        assert_eq!(t.t("dashboard.unknown"), "dashboard.unknown");
    }

    #[test]
    fn test_tables_cover_same_keys() {
        let mut en: Vec<_> = tables::EN.iter().map(|(k, _)| *k).collect();
        let mut ar: Vec<_> = tables::AR.iter().map(|(k, _)| *k).collect();
        en.sort_unstable();
        ar.sort_unstable();
        assert_eq!(en, ar);
    }

    #[test]
    fn test_toggle_and_direction() {
        let mut t = Translator::default();
        assert_eq!(t.language().direction(), TextDirection::Ltr);
        assert_eq!(t.language().switch_label(), "عربي");
        assert_eq!(t.toggle(), Language::Ar);
        assert_eq!(t.language().direction(), TextDirection::Rtl);
        assert_eq!(t.toggle(), Language::En);
    }

    #[test]
    fn test_parse_language() {
        assert_eq!("AR".parse::<Language>().unwrap(), Language::Ar);
        assert!("fr".parse::<Language>().is_err());
    }
}
