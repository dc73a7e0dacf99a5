//! Small DOM helpers shared by the field heuristics

use scraper::{ElementRef, Node, Selector};
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect("static selector"));
    };
}

selector!(IMG, "img");
selector!(PARAGRAPH, "p");
selector!(LIST_ITEM, "li");
selector!(BLOCKS, "p, div");
selector!(TEXT_BLOCKS, "p, div, span");
selector!(MARKED_BLOCKS, "span, p, div, li");
selector!(SECTIONS, "div, section");

/// Text of an element with `<br>` rendered as a line break
pub fn block_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// The element's string when it holds exactly one text node, possibly
/// wrapped in a chain of single-child elements. Elements with mixed
/// content have no sole text.
pub fn sole_text(element: ElementRef<'_>) -> Option<String> {
    let mut current = *element;
    loop {
        let mut children = current.children();
        let only = children.next()?;
        if children.next().is_some() {
            return None;
        }
        match only.value() {
            Node::Text(text) => return Some(String::from(&**text)),
            Node::Element(_) => current = only,
            _ => return None,
        }
    }
}

/// Non-empty trimmed lines of a block of text
pub fn clean_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Capitalize each whitespace-separated word
pub fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn block_text_breaks_lines_at_br() {
        let html = Html::parse_fragment("<p>Two Bedrooms<br>One Bathroom<br/>Porch</p>");
        let p = html.select(&PARAGRAPH).next().unwrap();
        assert_eq!(block_text(p), "Two Bedrooms\nOne Bathroom\nPorch");
    }

    #[test]
    fn sole_text_follows_single_child_chain() {
        let html = Html::parse_fragment(
            "<div id=\"a\"><p><span><span>About this property</span></span></p></div>",
        );
        let p = html.select(&PARAGRAPH).next().unwrap();
        assert_eq!(sole_text(p).as_deref(), Some("About this property"));
    }

    #[test]
    fn sole_text_rejects_mixed_content() {
        let html = Html::parse_fragment("<p>Rent <b>$500</b></p>");
        let p = html.select(&PARAGRAPH).next().unwrap();
        assert_eq!(sole_text(p), None);
    }

    #[test]
    fn capitalize_words_lowercases_tails() {
        assert_eq!(capitalize_words("big eat-in KITCHEN"), "Big Eat-in Kitchen");
    }
}
