//! Language table
//!
//! Canonical language names, bare translation codes (`en`, `zh-CN`),
//! speech-recognition locales (`en-US`) and premium synthesis voices.
//! Lookups that miss degrade to [`UNKNOWN_LANGUAGE`].

use serde::Serialize;

/// Sentinel name for codes missing from the table
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Source-language value that requests automatic detection
pub const AUTO_DETECT: &str = "auto";

/// One row of the language table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageEntry {
    /// Canonical display name
    pub name: &'static str,
    /// Bare translation code
    pub code: &'static str,
    /// Speech-recognition locale
    pub locale: &'static str,
    /// Premium synthesis voice, if one is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<&'static str>,
}

const fn entry(
    name: &'static str,
    code: &'static str,
    locale: &'static str,
    voice: Option<&'static str>,
) -> LanguageEntry {
    LanguageEntry {
        name,
        code,
        locale,
        voice,
    }
}

// Primary subtags are unique across the table.
static LANGUAGES: &[LanguageEntry] = &[
    entry("English", "en", "en-US", Some("Joanna")),
    entry("Malay", "ms", "ms-MY", None),
    entry("Spanish", "es", "es-US", Some("Lupe")),
    entry("French", "fr", "fr-FR", Some("Lea")),
    entry("German", "de", "de-DE", Some("Vicki")),
    entry("Arabic", "ar", "ar-SA", None),
    entry("Hindi", "hi", "hi-IN", None),
    entry("Chinese (Simplified)", "zh-CN", "zh-CN", Some("Zhiyu")),
    entry("Japanese", "ja", "ja-JP", Some("Mizuki")),
    entry("Korean", "ko", "ko-KR", Some("Seoyeon")),
    entry("Portuguese", "pt", "pt-BR", Some("Camila")),
    entry("Russian", "ru", "ru-RU", Some("Tatyana")),
    entry("Italian", "it", "it-IT", Some("Bianca")),
];

/// Every known language, in display order
pub fn all() -> &'static [LanguageEntry] {
    LANGUAGES
}

fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Find the table row for a code: exact match first, then primary subtag
pub fn lookup(code: &str) -> Option<&'static LanguageEntry> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    LANGUAGES
        .iter()
        .find(|e| e.code.eq_ignore_ascii_case(code))
        .or_else(|| {
            let primary = primary_subtag(code);
            LANGUAGES
                .iter()
                .find(|e| primary_subtag(e.code).eq_ignore_ascii_case(primary))
        })
}

/// Canonical name for a translation code, or `unknown`
pub fn name_for_code(code: &str) -> &'static str {
    lookup(code).map(|e| e.name).unwrap_or(UNKNOWN_LANGUAGE)
}

/// Translation code for a canonical name (case-insensitive)
pub fn code_for_name(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
        .map(|e| e.code)
}

/// Recognition locale for a translation code
pub fn recognition_locale(code: &str) -> Option<&'static str> {
    lookup(code).map(|e| e.locale)
}

/// Every recognition locale, used for automatic language identification
pub fn recognition_locales() -> Vec<&'static str> {
    LANGUAGES.iter().map(|e| e.locale).collect()
}

/// Premium voice for a target code; exact code match only
pub fn premium_voice(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|e| e.code.eq_ignore_ascii_case(code.trim()))
        .and_then(|e| e.voice)
}

/// True when the value asks for automatic detection (blank counts)
pub fn is_auto(code: &str) -> bool {
    let code = code.trim();
    code.is_empty() || code.eq_ignore_ascii_case(AUTO_DETECT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_resolve_exactly_then_by_primary_subtag() {
        assert_eq!(name_for_code("en"), "English");
        assert_eq!(name_for_code("zh-CN"), "Chinese (Simplified)");
        assert_eq!(name_for_code("zh"), "Chinese (Simplified)");
        assert_eq!(name_for_code("pt-PT"), "Portuguese");
        assert_eq!(name_for_code("EN"), "English");
    }

    #[test]
    fn missing_codes_degrade_to_unknown() {
        assert_eq!(name_for_code("xx"), UNKNOWN_LANGUAGE);
        assert_eq!(name_for_code(""), UNKNOWN_LANGUAGE);
        assert_eq!(recognition_locale("tlh"), None);
    }

    #[test]
    fn every_code_has_one_name() {
        let mut codes = HashSet::new();
        let mut primaries = HashSet::new();
        for e in all() {
            assert!(codes.insert(e.code), "duplicate code {}", e.code);
            assert!(primaries.insert(primary_subtag(e.code)), "duplicate subtag {}", e.code);
        }
    }

    #[test]
    fn malay_has_no_premium_voice() {
        assert_eq!(premium_voice("ms"), None);
        assert_eq!(premium_voice("en"), Some("Joanna"));
        assert_eq!(premium_voice("zh-CN"), Some("Zhiyu"));
        // Voice lookup does not fall back to the primary subtag
        assert_eq!(premium_voice("zh"), None);
    }

    #[test]
    fn locales_and_names() {
        assert_eq!(recognition_locale("ms"), Some("ms-MY"));
        assert_eq!(code_for_name("malay"), Some("ms"));
        assert!(recognition_locales().contains(&"en-US"));
        assert_eq!(recognition_locales().len(), all().len());
    }

    #[test]
    fn auto_detection_flag() {
        assert!(is_auto("auto"));
        assert!(is_auto(" AUTO "));
        assert!(is_auto(""));
        assert!(!is_auto("en"));
    }
}
