//! Language type: validated language handle and derived layout direction.

use crate::error::LanguageError;
use crate::i18n::{is_rtl_language, LanguageConfig, LanguageRegistry};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Layout direction of rendered content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    Ltr,
    Rtl,
}

impl LayoutDirection {
    /// Convert the host's "is mirrored" flag into a direction.
    pub fn from_rtl(is_rtl: bool) -> Self {
        if is_rtl {
            LayoutDirection::Rtl
        } else {
            LayoutDirection::Ltr
        }
    }

    pub fn is_rtl(self) -> bool {
        self == LayoutDirection::Rtl
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutDirection::Ltr => "ltr",
            LayoutDirection::Rtl => "rtl",
        }
    }
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated language.
///
/// Only supported, enabled languages can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "ar")
    code: &'static str,
}

// Language tag: primary subtag plus optional region/script subtags
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };

    pub const ARABIC: Language = Language { code: "ar" };

    /// Create a Language from an exact language code.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered and enabled
    /// * `Err` if the code is unknown or the language is disabled
    pub fn from_code(code: &str) -> Result<Language, LanguageError> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => Err(LanguageError::Disabled(code.to_string())),
            None => Err(LanguageError::Unknown(code.to_string())),
        }
    }

    /// Resolve a locale tag such as `ar-EG`, `en_US` or `AR` to a supported
    /// language. Returns `None` for malformed tags or unsupported languages.
    pub fn normalize(tag: &str) -> Option<Language> {
        let regex = TAG_REGEX.get_or_init(|| {
            Regex::new(r"^([A-Za-z]{2,3})(?:[-_][A-Za-z0-9]+)*$").expect("Invalid tag regex")
        });

        let captures = regex.captures(tag.trim())?;
        let primary = captures.get(1)?.as_str().to_ascii_lowercase();
        Language::from_code(&primary).ok()
    }

    /// The fallback language used when no preference is stored.
    pub fn fallback() -> Language {
        Language {
            code: LanguageRegistry::get().default_language().code,
        }
    }

    /// All selectable languages, in registry order.
    pub fn available() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not registered, which cannot happen for a
    /// Language built via `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_rtl(&self) -> bool {
        is_rtl_language(self.code)
    }

    /// Direction this language should be rendered in.
    pub fn direction(&self) -> LayoutDirection {
        LayoutDirection::from_rtl(self.is_rtl())
    }

    /// The next enabled language in registry order, wrapping around.
    pub fn toggled(&self) -> Language {
        let available = Language::available();
        let position = available.iter().position(|lang| lang == self);

        match position {
            Some(index) => available[(index + 1) % available.len()],
            None => Language::fallback(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

/// Direction a language should be rendered in. Pure and side-effect free.
pub fn desired_direction(language: Language) -> LayoutDirection {
    language.direction()
}

/// Resolve the effective language at startup.
///
/// Resolution order (highest to lowest priority):
/// 1. Stored preference (if it is a supported language)
/// 2. Device locale (if it normalizes to a supported language)
/// 3. The configured fallback
pub fn resolve_language(
    stored: Option<&str>,
    device_locale: Option<&str>,
    fallback: Language,
) -> Language {
    stored
        .and_then(|code| Language::from_code(code).ok())
        .or_else(|| device_locale.and_then(Language::normalize))
        .unwrap_or(fallback)
}
