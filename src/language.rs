//! Language codes for the prompt's answer-language directive.
//!
//! Unknown codes pass through verbatim rather than failing; the model can
//! usually make sense of them and a wrong directive beats a dropped query.

/// The language that omits the directive entirely.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Resolve an enumerated code to a human-readable language name.
pub fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "hi" => "Hindi",
        "zh" => "Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ar" => "Arabic",
        "ru" => "Russian",
        other => other,
    }
}
