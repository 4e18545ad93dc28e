//! Language Detection
//!
//! Cheap script and keyword heuristic deciding between English and Hindi
//! (Devanagari or romanized "Hinglish"). Anything ambiguous is English.

use crate::slots::Language;

/// Romanized Hindi words that rarely appear in English finance questions
const HINGLISH_MARKERS: &[&str] = &[
    "kya", "hai", "hain", "kaisa", "kaise", "kaisi", "mein", "batao", "bataiye", "kharidna",
    "kharidu", "kharide", "bechna", "becho", "ka", "ki", "ke", "ko", "aur", "nahi", "kitna",
    "kitne", "kaunsa", "konsa", "chahiye", "hoga", "raha", "rahi", "abhi", "mujhe", "mera",
    "mere", "lagau", "lagana", "karna", "karu", "kab", "kyun", "accha", "acha",
];

/// Detect the response language for `text`
pub fn detect(text: &str) -> Language {
    let devanagari = text
        .chars()
        .filter(|c| ('\u{0900}'..='\u{097F}').contains(c))
        .count();
    let latin = text.chars().filter(char::is_ascii_alphabetic).count();

    if devanagari > 0 && devanagari >= latin {
        return Language::Hi;
    }

    let words: Vec<String> = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let markers = words
        .iter()
        .filter(|w| HINGLISH_MARKERS.contains(&w.as_str()))
        .count();

    if markers >= 2 && markers * 4 >= words.len() {
        Language::Hi
    } else {
        Language::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english() {
        assert_eq!(detect("Is TCS risky?"), Language::En);
        assert_eq!(detect("I have 5 lakh, where to invest?"), Language::En);
    }

    #[test]
    fn test_devanagari() {
        assert_eq!(detect("TCS का रिस्क क्या है?"), Language::Hi);
        assert_eq!(detect("सोना"), Language::Hi);
    }

    #[test]
    fn test_hinglish() {
        assert_eq!(detect("Gold ka trend kya hai?"), Language::Hi);
        assert_eq!(detect("Infosys kharidna chahiye kya"), Language::Hi);
    }

    #[test]
    fn test_ambiguous_defaults_to_english() {
        assert_eq!(detect(""), Language::En);
        assert_eq!(detect("   "), Language::En);
        assert_eq!(detect("12345 ?!"), Language::En);
        // a single marker is not enough
        assert_eq!(detect("What is the outlook for Tata Motors ka stock"), Language::En);
    }
}
