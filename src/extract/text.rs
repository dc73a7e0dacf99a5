use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

use super::dom::{sole_text, BLOCKS};

static RE_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*[\d,]+(?:\.\d+)?(?:/[a-zA-Z]+)?").unwrap());
static RE_AVAILABILITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:available|unavailable) (?:until|from) ([a-zA-Z]+ \d{4})").unwrap()
});
static RE_DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(description|about this property)").unwrap());

/// Descriptions shorter than this are headings, not prose
const MIN_DESCRIPTION_CHARS: usize = 50;

/// First price-looking text in document order, e.g. "$1,250/mo"
pub fn find_price(document: &Html) -> Option<String> {
    document.root_element().text().find_map(|node| {
        RE_PRICE
            .find_iter(node)
            .map(|m| m.as_str().trim())
            .find(|m| m.len() > 1 && m.chars().any(|c| c.is_ascii_digit()))
            .map(str::to_string)
    })
}

/// First "available from <Month> <Year>"-style statement
pub fn find_availability(document: &Html) -> Option<String> {
    document
        .root_element()
        .text()
        .find_map(|node| RE_AVAILABILITY.find(node))
        .map(|m| m.as_str().to_string())
}

/// Prose from the first paragraph that introduces itself as a description
pub fn find_description(document: &Html) -> Option<String> {
    document
        .select(&BLOCKS)
        .filter_map(sole_text)
        .filter(|text| RE_DESCRIPTION.is_match(text))
        .map(|text| text.trim().to_string())
        .find(|text| text.chars().count() > MIN_DESCRIPTION_CHARS)
}
