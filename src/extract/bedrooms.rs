use regex::Regex;
use std::sync::LazyLock;

static RE_BEDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)(?:\s+|-)bed").unwrap());

/// Bedroom count from an explicit "N bed" phrase in the title, then from
/// the category table. Counts outside 1..=max are treated as absent.
pub fn bedrooms_from_title(title: &str, categories: &[(String, u8)], max: u8) -> Option<u8> {
    let in_range = |n: u8| (1..=max).contains(&n);

    let explicit = RE_BEDS
        .captures(title)
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .filter(|n| in_range(*n));
    if explicit.is_some() {
        return explicit;
    }

    let lower = title.to_lowercase();
    categories
        .iter()
        .find(|(label, _)| contains_at_word_start(&lower, &label.to_lowercase()))
        .map(|(_, beds)| *beds)
        .filter(|n| in_range(*n))
}

/// `needle` occurs in `haystack` not glued onto a preceding letter or digit,
/// so "2 beds" is not found inside "12 beds"
fn contains_at_word_start(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}
