use crate::i18n::Language;
use crate::retry::RetryConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Preference key holding the selected language code.
pub const LANGUAGE_STORAGE_KEY: &str = "app_language";

/// Preference key holding the restart guard sentinel.
pub const RTL_FIX_ATTEMPTED_KEY: &str = "rtl_fix_attempted";

/// Delay between persisting a direction change and invoking the restart
/// primitive, so pending writes reach durable storage first.
pub const DEFAULT_RESTART_GRACE: Duration = Duration::from_millis(100);

/// Settings for a `DirectionManager`.
#[derive(Debug, Clone)]
pub struct DirectionConfig {
    /// Language used when nothing usable is stored
    pub fallback_language: Language,

    /// Device locale tag (e.g. "ar-EG"), consulted only when no preference is stored
    pub device_locale: Option<String>,

    pub language_key: String,
    pub guard_key: String,

    pub restart_grace: Duration,

    /// Retry policy for preference store reads and writes
    pub storage_retry: RetryConfig,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            fallback_language: Language::fallback(),
            device_locale: None,
            language_key: LANGUAGE_STORAGE_KEY.to_string(),
            guard_key: RTL_FIX_ATTEMPTED_KEY.to_string(),
            restart_grace: DEFAULT_RESTART_GRACE,
            storage_retry: RetryConfig::storage(),
        }
    }
}

impl DirectionConfig {
    pub fn with_fallback_language(mut self, language: Language) -> Self {
        self.fallback_language = language;
        self
    }

    pub fn with_device_locale(mut self, locale: impl Into<String>) -> Self {
        self.device_locale = Some(locale.into());
        self
    }

    pub fn with_restart_grace(mut self, grace: Duration) -> Self {
        self.restart_grace = grace;
        self
    }

    pub fn with_storage_retry(mut self, retry: RetryConfig) -> Self {
        self.storage_retry = retry;
        self
    }
}

/// Settings for the command-line binary, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the preference and host-direction files
    pub state_dir: PathBuf,

    pub default_language: Language,
    pub device_locale: Option<String>,
    pub restart_grace: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(&code).context("Invalid DEFAULT_LANGUAGE")?,
            Err(_) => Language::fallback(),
        };

        Ok(Self {
            state_dir: std::env::var("DIRECTION_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".direction-state")),

            default_language,

            device_locale: std::env::var("DEVICE_LOCALE")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            restart_grace: std::env::var("RESTART_GRACE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_RESTART_GRACE),
        })
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.state_dir.join("preferences.json")
    }

    pub fn host_path(&self) -> PathBuf {
        self.state_dir.join("host.json")
    }

    /// Manager settings derived from this configuration.
    pub fn direction_config(&self) -> DirectionConfig {
        let config = DirectionConfig::default()
            .with_fallback_language(self.default_language)
            .with_restart_grace(self.restart_grace);

        match &self.device_locale {
            Some(locale) => config.with_device_locale(locale.clone()),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_config_defaults() {
        let config = DirectionConfig::default();
        assert_eq!(config.fallback_language, Language::ENGLISH);
        assert_eq!(config.device_locale, None);
        assert_eq!(config.language_key, "app_language");
        assert_eq!(config.guard_key, "rtl_fix_attempted");
        assert_eq!(config.restart_grace, Duration::from_millis(100));
        assert_eq!(config.storage_retry.max_attempts, 3);
    }

    #[test]
    fn test_direction_config_builder() {
        let config = DirectionConfig::default()
            .with_fallback_language(Language::ARABIC)
            .with_device_locale("ar-EG")
            .with_restart_grace(Duration::ZERO)
            .with_storage_retry(RetryConfig::no_retry());

        assert_eq!(config.fallback_language, Language::ARABIC);
        assert_eq!(config.device_locale.as_deref(), Some("ar-EG"));
        assert_eq!(config.restart_grace, Duration::ZERO);
        assert_eq!(config.storage_retry.max_attempts, 1);
    }

    #[test]
    fn test_binary_config_paths_and_derivation() {
        let config = Config {
            state_dir: PathBuf::from("/tmp/state"),
            default_language: Language::ENGLISH,
            device_locale: Some("ar".to_string()),
            restart_grace: Duration::from_millis(10),
        };

        assert_eq!(
            config.preferences_path(),
            PathBuf::from("/tmp/state/preferences.json")
        );
        assert_eq!(config.host_path(), PathBuf::from("/tmp/state/host.json"));

        let derived = config.direction_config();
        assert_eq!(derived.device_locale.as_deref(), Some("ar"));
        assert_eq!(derived.restart_grace, Duration::from_millis(10));
    }
}
