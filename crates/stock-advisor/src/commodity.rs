//! Commodity Resolver
//!
//! Maps commodity names to MCX / NCDEX contract symbols.

use once_cell::sync::Lazy;
use regex::Regex;

/// Name → exchange symbol
const SYMBOLS: &[(&str, &str)] = &[
    // Precious metals (MCX)
    ("gold", "GOLD"),
    ("silver", "SILVER"),
    ("सोना", "GOLD"),
    ("चांदी", "SILVER"),
    // Base metals (MCX)
    ("copper", "COPPER"),
    ("aluminium", "ALUMINIUM"),
    ("aluminum", "ALUMINIUM"),
    ("zinc", "ZINC"),
    ("lead", "LEAD"),
    ("nickel", "NICKEL"),
    // Energy (MCX)
    ("crude oil", "CRUDEOIL"),
    ("oil", "CRUDEOIL"),
    ("natural gas", "NATGAS"),
    ("gas", "NATGAS"),
    // Agri (MCX)
    ("cotton", "COTTON"),
    ("kapas", "KAPAS"),
    // Agri (NCDEX)
    ("soybean", "SOYBEAN"),
    ("soy oil", "SOYOIL"),
    ("crude palm oil", "CPO"),
    ("mustard seed", "MUSTARD"),
    ("mustard", "MUSTARD"),
    ("refined soya oil", "REFSOYOIL"),
    ("castor seed", "CASTORSEED"),
    ("cotton seed oilcake", "CSO"),
    ("chana", "CHANA"),
    ("turmeric", "TURMERIC"),
    ("jeera", "JEERA"),
    ("dhaniya", "DHANIYA"),
    ("sugar", "SUGAR"),
    ("wheat", "WHEAT"),
    ("paddy", "PADDY"),
    ("maize", "MAIZE"),
    ("barley", "BARLEY"),
];

/// Keywords that turn an equity question into a commodity question.
/// Kept to traded headline commodities; words like "lead" or "sugar" are
/// too common in company questions.
const OVERRIDE_KEYWORDS: &[&str] = &[
    "gold", "silver", "सोना", "चांदी", "copper", "aluminium", "aluminum", "zinc", "nickel",
    "crude oil", "oil", "natural gas", "gas",
];

static SORTED_SYMBOLS: Lazy<Vec<(&str, &str)>> = Lazy::new(|| {
    let mut sorted = SYMBOLS.to_vec();
    sorted.sort_by_key(|(name, _)| std::cmp::Reverse(name.chars().count()));
    sorted
});

// Longest alternatives first so leftmost-first matching prefers "crude oil" over "oil"
static KEYWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let mut keywords = OVERRIDE_KEYWORDS.to_vec();
    keywords.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
});

/// Exchange symbol for a commodity name ("gold price" → `GOLD`)
///
/// Substring match on the lowercased name, longest key first.
pub fn resolve_symbol(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    SORTED_SYMBOLS
        .iter()
        .find(|(key, _)| name.contains(key))
        .map(|(_, symbol)| *symbol)
}

/// Earliest commodity keyword in `text` (longest phrase at that position)
pub fn find_keyword(text: &str) -> Option<String> {
    KEYWORD_PATTERN
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}
