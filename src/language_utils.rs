use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for rendering target languages in prompts
///
/// Targets may be given as ISO 639-1 / 639-2 codes, optionally with a region
/// subtag (`pt-BR`, `zh_TW`), or as free-form names ("Simplified Chinese").

// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&normalized_code) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(&normalized_code).is_some() {
                return Ok(normalized_code);
            }
            if let Some((_, terminology)) = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized_code)
            {
                return Ok(terminology.to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Human-readable target language for prompts.
///
/// Known codes become English names, a region subtag is kept in parentheses,
/// and anything else is passed through trimmed.
pub fn display_language(target: &str) -> String {
    let target = target.trim();
    let (primary, region) = match target.split_once(['-', '_']) {
        Some((primary, region)) => (primary, Some(region)),
        None => (target, None),
    };

    match (get_language_name(primary), region) {
        (Ok(name), Some(region)) if !region.is_empty() => format!("{} ({})", name, region.to_uppercase()),
        (Ok(name), _) => name,
        (Err(_), _) => target.to_string(),
    }
}
