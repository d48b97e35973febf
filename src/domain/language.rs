use std::fmt;

/// Requested transcription language: provider auto-detection or an explicit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageHint {
    Auto,
    Code(String),
}

impl LanguageHint {
    /// `auto` (any case) or blank means "let the provider detect".
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            LanguageHint::Auto
        } else {
            LanguageHint::Code(trimmed.to_string())
        }
    }

    /// The code sent on the provider call, or `None` to omit the field.
    pub fn provider_code(&self) -> Option<String> {
        match self {
            LanguageHint::Auto => None,
            LanguageHint::Code(code) => Some(normalize_language_code(code)),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, LanguageHint::Auto)
    }
}

impl fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageHint::Auto => f.write_str("auto"),
            LanguageHint::Code(code) => f.write_str(code),
        }
    }
}

/// Maps BCP-47-like codes (`zh-CN`, `en-US`) to the bare ISO 639-1 codes providers expect.
pub fn normalize_language_code(code: &str) -> String {
    let lower = code.trim().to_ascii_lowercase();

    let mapped = match lower.as_str() {
        "zh-cn" | "zh-tw" | "zh-hk" => Some("zh"),
        "en-us" | "en-gb" | "en-au" | "en-ca" => Some("en"),
        "ja-jp" => Some("ja"),
        "ko-kr" => Some("ko"),
        "fr-fr" | "fr-ca" => Some("fr"),
        "de-de" | "de-at" => Some("de"),
        "es-es" | "es-mx" => Some("es"),
        "ru-ru" => Some("ru"),
        "pt-br" | "pt-pt" => Some("pt"),
        "it-it" => Some("it"),
        _ => None,
    };
    if let Some(mapped) = mapped {
        return mapped.to_string();
    }

    match lower.split_once('-') {
        Some((base, _)) => base.to_string(),
        None => lower,
    }
}
