//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is built once on first access (`OnceLock`) and is immutable
//! afterwards. Layout direction is not stored here; it is derived from the
//! language code by `is_rtl_language`.

use std::sync::OnceLock;

/// Language codes whose scripts require a mirrored (right-to-left) layout.
pub const RTL_LANGUAGES: [&str; 4] = ["ar", "he", "fa", "ur"];

/// Check whether a language code requires RTL layout.
///
/// Pure membership test against `RTL_LANGUAGES`; the code must already be
/// normalized (lowercase, no region).
pub fn is_rtl_language(code: &str) -> bool {
    RTL_LANGUAGES.contains(&code)
}

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "ar")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Arabic")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "العربية")
    pub native_name: &'static str,

    /// Whether this is the fallback language used when nothing is stored
    /// (exactly one should be true)
    pub is_default: bool,

    /// Whether this language can be selected
    pub enabled: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in registry order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the default (fallback) language configuration.
    ///
    /// # Panics
    /// Panics if no default language is found or if multiple default
    /// languages are defined (this indicates a configuration error).
    pub fn default_language(&self) -> &LanguageConfig {
        let defaults: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default language found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// Default language configurations: English (default) and Arabic.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
            enabled: true,
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            is_default: false,
            enabled: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_english() {
        let config = LanguageRegistry::get()
            .get_by_code("en")
            .expect("English should be registered");

        assert_eq!(config.name, "English");
        assert_eq!(config.native_name, "English");
        assert!(config.is_default);
        assert!(config.enabled);
    }

    #[test]
    fn test_get_by_code_arabic() {
        let config = LanguageRegistry::get()
            .get_by_code("ar")
            .expect("Arabic should be registered");

        assert_eq!(config.name, "Arabic");
        assert_eq!(config.native_name, "العربية");
        assert!(!config.is_default);
        assert!(config.enabled);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("fr").is_none());
    }

    #[test]
    fn test_list_enabled_preserves_order() {
        let codes: Vec<_> = LanguageRegistry::get()
            .list_enabled()
            .iter()
            .map(|lang| lang.code)
            .collect();

        assert_eq!(codes, vec!["en", "ar"]);
    }

    #[test]
    fn test_list_all_contains_english_and_arabic() {
        let all = LanguageRegistry::get().list_all();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_default_language_is_english() {
        assert_eq!(LanguageRegistry::get().default_language().code, "en");
    }

    #[test]
    fn test_is_enabled() {
        let registry = LanguageRegistry::get();
        assert!(registry.is_enabled("en"));
        assert!(registry.is_enabled("ar"));
        assert!(!registry.is_enabled("he"));
    }

    #[test]
    fn test_rtl_membership() {
        for code in ["ar", "he", "fa", "ur"] {
            assert!(is_rtl_language(code), "{} should be RTL", code);
        }
        for code in ["en", "es", "fr", "", "AR", "ar-EG"] {
            assert!(!is_rtl_language(code), "{} should not be RTL", code);
        }
    }
}
