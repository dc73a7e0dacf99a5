use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::dom::IMG;
use crate::config::ImageHints;

struct Candidate<'a> {
    src: &'a str,
    lower: String,
    element: ElementRef<'a>,
}

impl Candidate<'_> {
    fn contains_any(&self, tokens: &[String]) -> bool {
        tokens.iter().any(|t| self.lower.contains(t.as_str()))
    }

    fn dimension(&self, attr: &str) -> Option<u32> {
        let raw = self.element.value().attr(attr)?.trim();
        raw.trim_end_matches("px").trim().parse().ok()
    }
}

/// Best property image on the page. Stages run in order and the first
/// match wins: location map, street-named photo, any large image.
pub fn resolve_image<'d>(document: &'d Html, hints: &ImageHints, base: &Url) -> Option<String> {
    let candidates: Vec<Candidate<'d>> = document
        .select(&IMG)
        .filter_map(|element| {
            let src = element.value().attr("src")?.trim();
            (!src.is_empty()).then(|| Candidate {
                src,
                lower: src.to_lowercase(),
                element,
            })
        })
        .collect();

    let is_map = |c: &Candidate<'d>| c.contains_any(&hints.map_tokens);
    let is_street_photo = |c: &Candidate<'d>| {
        !c.contains_any(&hints.exclusions)
            && hints.street_tokens.iter().any(|street| {
                c.lower.contains(street.name.as_str())
                    && (!street.requires_apt || c.lower.contains("apt"))
            })
    };
    let is_large = |c: &Candidate<'d>| {
        let large = |attr| c.dimension(attr).is_some_and(|d| d > hints.min_dimension);
        (large("width") || large("height")) && !c.contains_any(&hints.exclusions)
    };

    let stages: [(&str, &dyn Fn(&Candidate<'d>) -> bool); 3] = [
        ("map", &is_map),
        ("property", &is_street_photo),
        ("large", &is_large),
    ];

    stages.iter().find_map(|(kind, matches)| {
        candidates
            .iter()
            .filter(|c| matches(*c))
            .find_map(|c| base.join(c.src).ok())
            .map(|url| {
                debug!("Found {} image: {}", kind, url);
                url.to_string()
            })
    })
}
