//! Raw amenity harvesting. Each stage is a pure function over the document;
//! later stages only run while fewer than `threshold` candidates are known.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use super::dom::{
    block_text, capitalize_words, clean_lines, sole_text, BLOCKS, LIST_ITEM, MARKED_BLOCKS,
    PARAGRAPH, SECTIONS, TEXT_BLOCKS,
};

const DETAILS_LABEL: &str = "Property Details";

/// The source site paints its details panel in this green
static DETAILS_PANEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[style*="background-color:rgba(0, 138, 69, 1)"]"#)
        .expect("static selector")
});

const BLOCK_KEYWORDS: &[&str] = &[
    "bedroom",
    "bathroom",
    "kitchen",
    "living room",
    "furnished",
    "porch",
    "laundry",
    "pet friendly",
    "bus stop",
];

const LIST_KEYWORDS: &[&str] = &[
    "bedroom", "bathroom", "kitchen", "living", "furnished", "porch", "laundry", "pet", "bus",
    "location", "contact", "office", "hours",
];

const CHECKMARKS: &[char] = &['✓', '✔'];

static FEATURE_PHRASES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:one|two|three|four|five|six|seven|[1-7])\s+(?:large\s+)?bedrooms?\b",
        r"\b(?:big\s+)?eat[\s-]in\s+kitchen\b",
        r"\bliving\s+room\b",
        r"\bfully\s+furnished\b",
        r"\blaundry\s+available\b",
        r"\b(?:front\s+and\s+back|front|back)\s+porch(?:es)?\b",
        r"\b\d+\s+blocks?\s+to\s+(?:the\s+)?bus\s+stop\b",
        r"\bparking\b",
        r"\bpet\s+friendly\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

type Stage = fn(&Html) -> Vec<String>;

const STAGES: &[(&str, Stage)] = &[
    ("property details", property_details),
    ("feature blocks", feature_blocks),
    ("checkmarks", checkmarks),
    ("list items", list_items),
    ("feature phrases", feature_phrases),
];

/// Collect raw amenity strings, deduplicated in first-seen order
pub fn harvest(document: &Html, threshold: usize) -> Vec<String> {
    STAGES.iter().fold(Vec::new(), |found, (name, stage)| {
        if found.len() >= threshold {
            return found;
        }
        let candidates = stage(document);
        debug!("Amenity stage '{}' found {} candidates", name, candidates.len());
        merge_unique(found, candidates)
    })
}

fn merge_unique(mut found: Vec<String>, candidates: Vec<String>) -> Vec<String> {
    for candidate in candidates {
        if !found.contains(&candidate) {
            found.push(candidate);
        }
    }
    found
}

fn is_label(line: &str) -> bool {
    line.eq_ignore_ascii_case(DETAILS_LABEL)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn property_details(document: &Html) -> Vec<String> {
    let mut sections: Vec<ElementRef<'_>> = document.select(&DETAILS_PANEL).collect();
    if sections.is_empty() {
        sections = labelled_sections(document);
    }

    sections
        .into_iter()
        .filter(|section| text_of(*section).contains(DETAILS_LABEL))
        .flat_map(|section| section.select(&PARAGRAPH).map(block_text).collect::<Vec<_>>())
        .flat_map(|text| {
            clean_lines(&text)
                .filter(|line| !is_label(line))
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Innermost div/section elements mentioning the details label
fn labelled_sections(document: &Html) -> Vec<ElementRef<'_>> {
    let mentions = |el: &ElementRef<'_>| text_of(*el).contains(DETAILS_LABEL);
    document
        .select(&SECTIONS)
        .filter(mentions)
        .filter(|el| !el.select(&SECTIONS).any(|inner| mentions(&inner)))
        .collect()
}

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

fn feature_blocks(document: &Html) -> Vec<String> {
    document
        .select(&BLOCKS)
        .map(block_text)
        .filter(|text| mentions_any(text, BLOCK_KEYWORDS))
        .flat_map(|text| {
            let lines: Vec<String> = clean_lines(&text)
                .filter(|line| line.chars().count() > 3 && !is_label(line))
                .filter(|line| mentions_any(line, BLOCK_KEYWORDS))
                .map(str::to_string)
                .collect();
            if lines.len() >= 2 {
                lines
            } else {
                Vec::new()
            }
        })
        .collect()
}

fn checkmarks(document: &Html) -> Vec<String> {
    document
        .select(&MARKED_BLOCKS)
        .filter_map(sole_text)
        .filter_map(|text| {
            let text = text.trim();
            if !text.starts_with(CHECKMARKS) {
                return None;
            }
            let feature = text.trim_start_matches(CHECKMARKS).trim();
            (feature.chars().count() > 3).then(|| feature.to_string())
        })
        .collect()
}

fn list_items(document: &Html) -> Vec<String> {
    let items: Vec<String> = document
        .select(&LIST_ITEM)
        .map(|li| text_of(li).trim().to_string())
        .filter(|text| !text.is_empty() && mentions_any(text, LIST_KEYWORDS))
        .collect();
    if items.len() >= 2 {
        items
    } else {
        Vec::new()
    }
}

fn feature_phrases(document: &Html) -> Vec<String> {
    document
        .select(&TEXT_BLOCKS)
        .map(|el| text_of(el).to_lowercase())
        .flat_map(|text| {
            FEATURE_PHRASES
                .iter()
                .filter_map(|re| re.find(&text).map(|m| capitalize_words(m.as_str())))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn green_details_panel_is_split_into_lines() {
        let html = doc(
            r#"<div style="background-color:rgba(0, 138, 69, 1)">
                 <p>Property Details</p>
                 <p>Two Bedrooms<br>One Bathroom<br>Big Eat-In Kitchen<br>Front Porch</p>
               </div>"#,
        );
        assert_eq!(
            harvest(&html, 3),
            vec!["Two Bedrooms", "One Bathroom", "Big Eat-In Kitchen", "Front Porch"]
        );
    }

    #[test]
    fn unstyled_details_section_is_found_by_label() {
        let html = doc(
            r#"<section><div><h3>Property Details</h3>
                 <p>Three Bedrooms</p><p>Washer and dryer</p><p>Enclosed yard</p>
               </div></section>"#,
        );
        assert_eq!(
            property_details(&html),
            vec!["Three Bedrooms", "Washer and dryer", "Enclosed yard"]
        );
    }

    #[test]
    fn feature_block_needs_two_keyword_lines() {
        let html = doc("<div><p>Two Bedrooms<br>Photos<br>Contact us</p></div>");
        assert!(feature_blocks(&html).is_empty());
    }

    #[test]
    fn feature_block_keeps_only_keyword_lines() {
        let html = doc("<p>Two Bedrooms<br>One Bathroom<br>Photos</p>");
        assert_eq!(feature_blocks(&html), vec!["Two Bedrooms", "One Bathroom"]);
    }

    #[test]
    fn nested_feature_blocks_are_merged_once() {
        let html = doc("<div><p>Two Bedrooms<br>One Bathroom<br>Photos</p></div>");
        assert_eq!(feature_blocks(&html).len(), 4);
        assert_eq!(harvest(&html, 3), vec!["Two Bedrooms", "One Bathroom"]);
    }

    #[test]
    fn checkmark_glyphs_are_stripped() {
        let html = doc(
            "<ul><li>✓ Fully Furnished</li><li>✔ Off-street parking</li><li>✓ AC</li></ul>",
        );
        assert_eq!(checkmarks(&html), vec!["Fully Furnished", "Off-street parking"]);
    }

    #[test]
    fn single_keyword_list_item_is_not_enough() {
        assert!(list_items(&doc("<ul><li>Call the office</li><li>Photos</li></ul>")).is_empty());
        assert_eq!(
            list_items(&doc("<ul><li>Call the office</li><li>Pet friendly</li></ul>")),
            vec!["Call the office", "Pet friendly"]
        );
    }

    #[test]
    fn phrases_are_title_cased() {
        let html = doc("<span>Fully furnished, 2 blocks to bus stop, parking in rear</span>");
        assert_eq!(
            feature_phrases(&html),
            vec!["Fully Furnished", "2 Blocks To Bus Stop", "Parking"]
        );
    }

    #[test]
    fn later_stages_run_only_while_short() {
        let html = doc(
            r#"<div style="background-color:rgba(0, 138, 69, 1)"><p>Property Details</p>
                 <p>One Bedroom<br>Kitchen<br>Living Room</p></div>
               <ul><li>✓ Parking lot</li></ul>"#,
        );
        let found = harvest(&html, 3);
        assert!(!found.iter().any(|a| a.contains("Parking")));
        assert_eq!(found.len(), 3);
    }
}
