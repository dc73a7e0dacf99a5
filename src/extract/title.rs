//! Listing titles come from the URL slug alone. Page titles on the source
//! site are unreliable, so page content is never consulted.

use url::Url;

/// Slug tokens that belong with the token before them ("seminary apt")
const UNIT_MARKERS: &[&str] = &["apt", "unit", "suite"];

/// Turn the last path segment into an address, e.g.
/// `/14-seminary-apt-2a` -> `14 Seminary Apt 2A`
pub fn title_from_url(url: &Url) -> Option<String> {
    let slug = url.path_segments()?.filter(|s| !s.is_empty()).last()?;

    let mut parts: Vec<String> = Vec::new();
    for token in slug.split('-') {
        let is_marker = UNIT_MARKERS.iter().any(|m| token.eq_ignore_ascii_case(m));
        match parts.last_mut() {
            Some(previous) if is_marker => {
                previous.push(' ');
                previous.push_str(token);
            }
            _ => parts.push(token.to_string()),
        }
    }

    let title = title_case(&parts.join(" "));
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Uppercase the first letter of every run of letters and lowercase the
/// rest, so unit suffixes read naturally ("2a" -> "2A").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(url: &str) -> Option<String> {
        title_from_url(&Url::parse(url).unwrap())
    }

    #[test]
    fn apartment_slug_becomes_address() {
        assert_eq!(
            title("https://www.binghamtonwest.com/10-seminary-apt-2").as_deref(),
            Some("10 Seminary Apt 2")
        );
    }

    #[test]
    fn unit_letters_are_uppercased() {
        assert_eq!(
            title("https://www.binghamtonwest.com/14-seminary-apt-2a").as_deref(),
            Some("14 Seminary Apt 2A")
        );
        assert_eq!(
            title("https://www.binghamtonwest.com/10-johnson-apt-l-or-r").as_deref(),
            Some("10 Johnson Apt L Or R")
        );
    }

    #[test]
    fn trailing_slash_and_query_are_ignored() {
        assert_eq!(
            title("https://www.binghamtonwest.com/listings/6-ayres/?ref=home").as_deref(),
            Some("6 Ayres")
        );
    }

    #[test]
    fn repeated_hyphens_collapse() {
        assert_eq!(
            title("https://www.binghamtonwest.com/18--5-seminary").as_deref(),
            Some("18 5 Seminary")
        );
    }

    #[test]
    fn bare_host_has_no_title() {
        assert_eq!(title("https://www.binghamtonwest.com/"), None);
    }
}
