//! Amenity normalization: noisy harvested strings in, a short canonical
//! list out.
//!
//! Each raw string is classified into at most one [`AmenitySlot`] by the
//! first rule in [`RULE_TABLE`] that matches and is allowed to fire. Slots
//! keep the order in which they were first filled.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

use crate::config::AmenityDefaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmenitySlot {
    Bedrooms,
    Bathroom,
    Kitchen,
    Living,
    Dining,
    Bonus,
    Yard,
    Furnished,
    Pets,
    Bus,
    Laundry,
    Porch,
}

impl AmenitySlot {
    /// Slots emitted first, in this order, before the rest
    const LEADING: [AmenitySlot; 4] = [
        AmenitySlot::Bedrooms,
        AmenitySlot::Bathroom,
        AmenitySlot::Kitchen,
        AmenitySlot::Living,
    ];
}

/// What a matching rule stores in its slot
#[derive(Debug, Clone, Copy)]
enum SlotValue {
    Canonical(&'static str),
    /// The raw string itself, trimmed
    Verbatim,
}

#[derive(Debug, Clone, Copy)]
enum Guard {
    Always,
    /// Fires only while the given slot is still empty
    UnlessFilled(AmenitySlot),
}

struct Rule {
    slot: AmenitySlot,
    pattern: &'static str,
    value: SlotValue,
    guard: Guard,
}

const fn specific(slot: AmenitySlot, pattern: &'static str, value: &'static str) -> Rule {
    Rule {
        slot,
        pattern,
        value: SlotValue::Canonical(value),
        guard: Guard::Always,
    }
}

/// Generic match for a category; never replaces an earlier value
const fn catch_all(slot: AmenitySlot, pattern: &'static str, value: SlotValue) -> Rule {
    Rule {
        slot,
        pattern,
        value,
        guard: Guard::UnlessFilled(slot),
    }
}

use AmenitySlot::*;

const RULE_TABLE: &[Rule] = &[
    specific(Bedrooms, r"\b(?:one|1)\s+bedroom", "One Bedroom"),
    specific(Bedrooms, r"\b(?:two|2)\s+large\s+bedroom", "Two Large Bedrooms"),
    specific(Bedrooms, r"\b(?:two|2)\s+bedroom", "Two Bedrooms"),
    specific(Bedrooms, r"\b(?:three|3)\s+bedroom", "Three Bedrooms"),
    specific(Bedrooms, r"\b(?:four|4)\s+bedroom", "Four Bedrooms"),
    catch_all(Bedrooms, r"bedroom", SlotValue::Verbatim),
    specific(Bathroom, r"\b(?:one|1)\s+bathroom", "One Bathroom"),
    specific(Bathroom, r"\b(?:two|2)\s+bathroom", "Two Bathrooms"),
    catch_all(Bathroom, r"bathroom", SlotValue::Verbatim),
    specific(Kitchen, r"kitchen\s+with\s+dining", "Kitchen with Dining Area"),
    specific(Kitchen, r"eat[\s-]in\s+kitchen", "Big Eat-In Kitchen"),
    catch_all(Kitchen, r"kitchen", SlotValue::Canonical("Kitchen")),
    specific(Living, r"living\s+room", "Living Room"),
    Rule {
        slot: Dining,
        pattern: r"dining\s+area",
        value: SlotValue::Canonical("Dining Area"),
        guard: Guard::UnlessFilled(Kitchen),
    },
    specific(Dining, r"dining\s+room", "Dining Room"),
    specific(Bonus, r"bonus\s+room", "Bonus Room"),
    specific(Yard, r"enclosed\s+yard", "Enclosed Yard"),
    specific(Furnished, r"furnished", "Furnished"),
    specific(Pets, r"pet\s+friendly|pets\s+allowed", "Pet Friendly"),
    specific(
        Bus,
        r"\d+\s+blocks?\s+to\s+(?:the\s+)?bus|block\s+to\s+bus\s+stop",
        "1 Block to Bus Stop",
    ),
    specific(Laundry, r"washer.*dryer|dryer.*washer", "Washer & Dryer"),
    specific(Laundry, r"laundry", "Laundry Available"),
    specific(Porch, r"front\s+porch", "Front Porch"),
    catch_all(Porch, r"porch", SlotValue::Verbatim),
];

static RULES: LazyLock<Vec<(Regex, &'static Rule)>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|rule| {
            let re = Regex::new(&format!("(?i){}", rule.pattern)).unwrap();
            (re, rule)
        })
        .collect()
});

/// Whether a listing reads as an apartment or a whole property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Apartment,
    Property,
}

impl PropertyKind {
    pub fn from_title(title: &str) -> Self {
        let is_apartment = title
            .split_whitespace()
            .any(|word| word.eq_ignore_ascii_case("apt"));
        if is_apartment {
            PropertyKind::Apartment
        } else {
            PropertyKind::Property
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyKind::Apartment => write!(f, "apartment"),
            PropertyKind::Property => write!(f, "property"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    /// Canonical amenities, case-insensitively unique, never empty
    pub amenities: Vec<String>,
    pub kind: PropertyKind,
}

pub struct AmenityNormalizer {
    defaults: AmenityDefaults,
}

impl AmenityNormalizer {
    pub fn new(defaults: AmenityDefaults) -> Self {
        Self { defaults }
    }

    /// Fill slots from the raw strings, in order
    pub fn classify(&self, raw: &[String]) -> IndexMap<AmenitySlot, String> {
        let mut slots = IndexMap::new();
        for text in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let hit = RULES.iter().find(|(re, rule)| {
                let allowed = match rule.guard {
                    Guard::Always => true,
                    Guard::UnlessFilled(slot) => !slots.contains_key(&slot),
                };
                allowed && re.is_match(text)
            });
            if let Some((_, rule)) = hit {
                let value = match rule.value {
                    SlotValue::Canonical(value) => value.to_string(),
                    SlotValue::Verbatim => text.to_string(),
                };
                slots.insert(rule.slot, value);
            }
        }
        slots
    }

    pub fn normalize(&self, raw: &[String], bedrooms: Option<u8>, title: &str) -> NormalizedFields {
        let mut slots = self.classify(raw);
        let mut amenities = Vec::new();

        let bedroom_line = match (slots.shift_remove(&Bedrooms), bedrooms) {
            (None, Some(1)) => Some("One Bedroom".to_string()),
            (None, Some(2)) => Some("Two Bedrooms".to_string()),
            (slot, _) => slot,
        };
        if let Some(line) = bedroom_line {
            push_unique(&mut amenities, line);
        }

        let defaults = &self.defaults;
        for (slot, default) in [
            (Bathroom, &defaults.bathroom),
            (Kitchen, &defaults.kitchen),
            (Living, &defaults.living),
        ] {
            let value = slots.shift_remove(&slot).unwrap_or_else(|| default.clone());
            push_unique(&mut amenities, value);
        }

        for (slot, value) in slots {
            debug_assert!(!AmenitySlot::LEADING.contains(&slot));
            push_unique(&mut amenities, value);
        }

        for standard in &defaults.standard {
            push_unique(&mut amenities, standard.clone());
        }

        if amenities.len() < defaults.min_count {
            for fallback in &defaults.fallback {
                push_unique(&mut amenities, fallback.clone());
            }
        }

        NormalizedFields {
            amenities,
            kind: PropertyKind::from_title(title),
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.iter().any(|existing| existing.eq_ignore_ascii_case(&value)) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrapeConfig;

    fn normalizer() -> AmenityNormalizer {
        AmenityNormalizer::new(ScrapeConfig::default().amenities)
    }

    /// Drop case-insensitive repeats, keeping the first spelling and order
    fn dedupe_case_insensitive(items: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            push_unique(&mut out, item.clone());
        }
        out
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_gets_core_and_standard_defaults() {
        let out = normalizer().normalize(&[], None, "6 Ayres");
        assert_eq!(
            out.amenities,
            strings(&[
                "One Bathroom",
                "Kitchen",
                "Living Room",
                "Pet Friendly",
                "1 Block to Bus Stop",
            ])
        );
        assert_eq!(out.kind, PropertyKind::Property);
    }

    #[test]
    fn known_bedroom_count_is_synthesized() {
        let out = normalizer().normalize(&[], Some(2), "14 Seminary Apt 2A");
        assert_eq!(out.amenities[0], "Two Bedrooms");
        assert_eq!(out.kind, PropertyKind::Apartment);

        let out = normalizer().normalize(&[], Some(5), "18 Seminary");
        assert_eq!(out.amenities[0], "One Bathroom");
    }

    #[test]
    fn raw_strings_map_to_canonical_values() {
        let raw = strings(&[
            "2 large bedrooms",
            "Big eat in kitchen",
            "Washer and dryer in basement",
            "Front porch",
            "Pets allowed",
            "Enclosed yard",
        ]);
        let out = normalizer().normalize(&raw, Some(2), "10 Seminary Apt 1");
        assert_eq!(
            out.amenities,
            strings(&[
                "Two Large Bedrooms",
                "One Bathroom",
                "Big Eat-In Kitchen",
                "Living Room",
                "Washer & Dryer",
                "Front Porch",
                "Pet Friendly",
                "Enclosed Yard",
                "1 Block to Bus Stop",
            ])
        );
    }

    #[test]
    fn catch_all_never_overwrites_a_filled_slot() {
        let slots =
            normalizer().classify(&strings(&["Three bedrooms", "Spacious bedroom closets"]));
        assert_eq!(slots[&Bedrooms], "Three Bedrooms");
    }

    #[test]
    fn specific_match_replaces_generic_value() {
        let slots = normalizer().classify(&strings(&["Sunny bedroom", "Two bedrooms"]));
        assert_eq!(slots[&Bedrooms], "Two Bedrooms");
    }

    #[test]
    fn blocked_catch_all_falls_through_to_other_slots() {
        let slots = normalizer().classify(&strings(&["One bedroom", "Bedroom with own bathroom"]));
        assert_eq!(slots[&Bedrooms], "One Bedroom");
        assert_eq!(slots[&Bathroom], "Bedroom with own bathroom");
    }

    #[test]
    fn dining_area_only_without_kitchen() {
        let slots = normalizer().classify(&strings(&["Kitchen", "Dining area"]));
        assert!(!slots.contains_key(&Dining));

        let slots = normalizer().classify(&strings(&["Dining area", "Kitchen"]));
        assert_eq!(slots[&Dining], "Dining Area");
    }

    #[test]
    fn slots_keep_first_seen_order() {
        let slots = normalizer().classify(&strings(&["Laundry", "Bonus room", "Washer/dryer"]));
        let order: Vec<_> = slots.keys().copied().collect();
        assert_eq!(order, vec![Laundry, Bonus]);
        assert_eq!(slots[&Laundry], "Washer & Dryer");
    }

    #[test]
    fn output_is_unique_and_idempotent() {
        let raw = strings(&["pet friendly", "PET FRIENDLY", "1 block to bus stop", "furnished"]);
        let out = normalizer().normalize(&raw, None, "3 Ayres");
        assert!(out.amenities.len() >= 3);
        assert_eq!(dedupe_case_insensitive(&out.amenities), out.amenities);

        let lowered: Vec<String> = out.amenities.iter().map(|a| a.to_lowercase()).collect();
        let mut sorted = lowered.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), lowered.len());
    }

    #[test]
    fn short_list_is_padded_with_fallbacks() {
        let defaults = AmenityDefaults {
            bathroom: "Bath".into(),
            kitchen: "Bath".into(),
            living: "bath".into(),
            standard: vec![],
            fallback: strings(&["Kitchen", "Living Room", "Fully Furnished"]),
            min_count: 3,
        };
        let out = AmenityNormalizer::new(defaults).normalize(&[], None, "6 Ayres");
        assert_eq!(out.amenities, strings(&["Bath", "Kitchen", "Living Room", "Fully Furnished"]));
    }
}
