use crate::i18n::Language;

/// User-facing strings shown around a direction change.
///
/// Only the messages the direction manager's callers need when a restart is
/// involved live here; regular UI copy belongs to the translation catalog.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Restart Prompts ====================
    /// Title of the prompt shown when the app must be relaunched manually
    pub restart_required_title: &'static str,

    /// Instructions for relaunching the app manually
    pub restart_required_body: &'static str,

    /// Title of the confirmation shown before an automatic restart
    pub change_language_title: &'static str,

    /// Confirmation body shown before an automatic restart
    pub change_language_confirm: &'static str,

    // ==================== Errors ====================
    /// Shown when the new preference could not be saved
    pub change_language_failed: &'static str,

    // ==================== Language Toggle ====================
    /// Label of a button that switches to this language
    pub toggle_label: &'static str,
}

/// English language strings
pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    restart_required_title: "Restart Required",
    restart_required_body: "To apply the text direction change, please:\n\n\
1. Fully close the app (swipe up from the app switcher)\n\
2. Reopen the app",
    change_language_title: "Change Language",
    change_language_confirm: "This change requires an app restart. Do you want to continue?",
    change_language_failed: "Failed to change language. Please try again.",
    toggle_label: "English",
};

/// Arabic language strings
pub const ARABIC_STRINGS: LanguageStrings = LanguageStrings {
    restart_required_title: "أعد تشغيل التطبيق",
    restart_required_body: "لتطبيق تغيير اتجاه النص، يرجى:\n\n\
1. أغلق التطبيق بالكامل (اسحب لأعلى من شريط المهام)\n\
2. أعد فتح التطبيق",
    change_language_title: "تغيير اللغة",
    change_language_confirm: "سيتطلب هذا التغيير إعادة تشغيل التطبيق. هل تريد المتابعة؟",
    change_language_failed: "تعذر تغيير اللغة. يرجى المحاولة مرة أخرى.",
    toggle_label: "العربية",
};

impl LanguageStrings {
    /// Strings for a language, falling back to English for languages
    /// without their own table.
    pub fn for_language(language: Language) -> &'static LanguageStrings {
        match language.code() {
            "ar" => &ARABIC_STRINGS,
            _ => &ENGLISH_STRINGS,
        }
    }
}

/// Label for the button that toggles away from `current`.
///
/// The label names the target language in its own script, so an Arabic
/// screen shows "English" and an English screen shows "العربية".
pub fn toggle_label(current: Language) -> &'static str {
    LanguageStrings::for_language(current.toggled()).toggle_label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_enabled_languages_have_nonempty_strings() {
        for language in Language::available() {
            let strings = LanguageStrings::for_language(language);
            assert!(!strings.restart_required_title.is_empty());
            assert!(!strings.restart_required_body.is_empty());
            assert!(!strings.change_language_title.is_empty());
            assert!(!strings.change_language_confirm.is_empty());
            assert!(!strings.change_language_failed.is_empty());
            assert!(!strings.toggle_label.is_empty());
        }
    }

    #[test]
    fn test_arabic_strings_are_distinct() {
        let en = LanguageStrings::for_language(Language::ENGLISH);
        let ar = LanguageStrings::for_language(Language::ARABIC);
        assert_ne!(en.restart_required_title, ar.restart_required_title);
    }

    #[test]
    fn test_toggle_label_names_other_language() {
        assert_eq!(toggle_label(Language::ENGLISH), "العربية");
        assert_eq!(toggle_label(Language::ARABIC), "English");
    }

    #[test]
    fn test_relaunch_body_has_numbered_steps() {
        assert!(ENGLISH_STRINGS.restart_required_body.contains("1."));
        assert!(ENGLISH_STRINGS.restart_required_body.contains("2."));
    }
}
