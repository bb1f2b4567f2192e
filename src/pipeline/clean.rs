use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("URL pattern is valid")
});

static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("whitespace pattern is valid")
});

const TATWEEL: char = '\u{0640}';
const ALEF: char = '\u{0627}';

/// Normalize user input before it is handed to the model.
///
/// Control characters and URLs are dropped and whitespace is collapsed. Arabic
/// input additionally loses harakat and tatweel, and alef variants are folded
/// into a bare alef.
pub fn clean_text(text: &str, source_language: &str) -> String {
    let printable: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    let without_urls = URL_PATTERN.replace_all(&printable, " ");

    let normalized: String = if source_language == "ar" {
        without_urls
            .chars()
            .filter(|c| !is_arabic_diacritic(*c) && *c != TATWEEL)
            .map(fold_alef)
            .collect()
    } else {
        without_urls.chars().map(straighten_quote).collect()
    };

    WHITESPACE_PATTERN
        .replace_all(&normalized, " ")
        .trim()
        .to_string()
}

fn is_arabic_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

fn fold_alef(c: char) -> char {
    match c {
        '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' => ALEF,
        other => other,
    }
}

fn straighten_quote(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        other => other,
    }
}
