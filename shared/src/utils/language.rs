//! Language preference validation
//!
//! A user's language preference is a locale id such as `nl` or `en-US`.
//! Depending on configuration it must either be one of the site languages or
//! any well-formed locale id with a known ISO 639-1 language code.

use once_cell::sync::Lazy;
use regex::Regex;

/// Message used when a language is rejected. `{value}` is replaced with the input.
pub const INVALID_LANGUAGE_MESSAGE: &str = "{value} is not a valid site language.";

static LOCALE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)([a-z]{2})(?:[-_]([a-z]{4}))?(?:[-_]([a-z]{2}|[0-9]{3}))?$")
        .expect("locale pattern is valid")
});

/// ISO 639-1 language codes
const LANGUAGE_CODES: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg", "bh",
    "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv", "cy", "da",
    "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi", "fj", "fo", "fr",
    "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr", "ht", "hu", "hy", "hz",
    "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", "ja", "jv", "ka", "kg", "ki", "kj",
    "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw", "ky", "la", "lb", "lg", "li", "ln",
    "lo", "lt", "lu", "lv", "mg", "mh", "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my", "na", "nb",
    "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv", "ny", "oc", "oj", "om", "or", "os", "pa", "pi",
    "pl", "ps", "pt", "qu", "rm", "rn", "ro", "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk",
    "sl", "sm", "sn", "so", "sq", "sr", "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti",
    "tk", "tl", "tn", "to", "tr", "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo",
    "wa", "wo", "xh", "yi", "yo", "za", "zh", "zu",
];

/// Validates language preferences against the site configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageValidator {
    site_languages: Vec<String>,
    only_site_languages: bool,
}

impl LanguageValidator {
    pub fn new(site_languages: Vec<String>, only_site_languages: bool) -> Self {
        Self {
            site_languages,
            only_site_languages,
        }
    }

    /// Validate a language value.
    ///
    /// Returns `None` when the value is acceptable, otherwise the error message.
    pub fn validate_value(&self, value: &str) -> Option<String> {
        let valid = if self.only_site_languages {
            self.is_site_language(value)
        } else {
            self.is_site_language(value) || is_known_locale(value)
        };

        if valid {
            None
        } else {
            Some(INVALID_LANGUAGE_MESSAGE.replace("{value}", value))
        }
    }

    /// Case-insensitive match against the configured site languages
    pub fn is_site_language(&self, value: &str) -> bool {
        let normalized = normalize(value);
        self.site_languages
            .iter()
            .any(|lang| normalize(lang) == normalized)
    }
}

/// Whether `value` is a well-formed locale id with a known language code
pub fn is_known_locale(value: &str) -> bool {
    LOCALE_PATTERN
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|lang| LANGUAGE_CODES.contains(&lang.as_str().to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn normalize(value: &str) -> String {
    value.trim().replace('_', "-").to_ascii_lowercase()
}
