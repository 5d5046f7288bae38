//! Reading typed facts out of a guest's loosely typed attribute bag.
//!
//! Guest lists come from spreadsheets and web forms, so the same fact shows
//! up under several key spellings and as booleans, numbers or strings.
//! Everything that looks at raw attributes lives here; the rest of the
//! engine only sees [`GuestFacts`]. Nothing in this module can fail: a
//! missing or unreadable value is simply "no".

use seatplan_core::guest::{AttributeBag, AttributeValue, Guest};
use seatplan_core::plan::ColorTag;

const VIP_KEYS: &[&str] = &["VIP", "vip"];
const RSVP_KEYS: &[&str] = &["Zusage", "zusage"];
const ATTENDING_KEYS: &[&str] = &["Nimmt teil", "nimmt teil"];
const FEMALE_KEYS: &[&str] = &["Weiblich", "weiblich"];
const COLOR_KEYS: &[&str] = &["Tischfarbe", "tischfarbe"];
const PRESS_KEYS: &[&str] = &["Presse", "presse"];

/// Strings accepted as "yes" (after trimming, case-insensitive).
const TRUTHY_STRINGS: &[&str] = &["true", "ja", "yes", "1"];

/// Everything the engine needs to know about one guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestFacts {
    pub is_vip: bool,
    pub has_rsvp: bool,
    pub is_female: bool,
    pub is_press: bool,
    pub color: ColorTag,
}

impl GuestFacts {
    pub fn read(guest: &Guest) -> Self {
        Self {
            is_vip: is_vip(guest),
            has_rsvp: has_rsvp_or_attending(guest),
            is_female: is_female(guest),
            is_press: is_press(guest),
            color: color_tag(guest),
        }
    }
}

pub fn is_vip(guest: &Guest) -> bool {
    guest.is_vip || any_match(&guest.attributes, VIP_KEYS, is_vip_truthy)
}

pub fn has_rsvp_or_attending(guest: &Guest) -> bool {
    flag(&guest.attributes, RSVP_KEYS) || flag(&guest.attributes, ATTENDING_KEYS)
}

pub fn is_female(guest: &Guest) -> bool {
    flag(&guest.attributes, FEMALE_KEYS)
}

pub fn is_press(guest: &Guest) -> bool {
    flag(&guest.attributes, PRESS_KEYS)
}

pub fn color_tag(guest: &Guest) -> ColorTag {
    match first_match(&guest.attributes, COLOR_KEYS) {
        Some(AttributeValue::Text(s)) => ColorTag::parse(s),
        Some(AttributeValue::Number(n)) if n.fract() == 0.0 && (1.0..=4.0).contains(n) => {
            ColorTag::parse(&format!("{n}"))
        }
        _ => ColorTag::Untagged,
    }
}

fn flag(bag: &AttributeBag, keys: &[&str]) -> bool {
    any_match(bag, keys, is_truthy)
}

/// Key names match an alias after trimming and ASCII case-folding, so
/// `" ZUSAGE "` counts as `Zusage`.
fn matches_alias(name: &str, keys: &[&str]) -> bool {
    let name = name.trim();
    keys.iter().any(|key| key.eq_ignore_ascii_case(name))
}

/// True if any spelling of the fact carries a truthy value.
fn any_match(bag: &AttributeBag, keys: &[&str], truthy: fn(&AttributeValue) -> bool) -> bool {
    bag.iter()
        .any(|(name, value)| matches_alias(name, keys) && truthy(value))
}

/// Single value for a fact: exact aliases in alias order, then other
/// spellings in sorted key order.
fn first_match<'a>(bag: &'a AttributeBag, keys: &[&str]) -> Option<&'a AttributeValue> {
    if let Some(value) = keys.iter().find_map(|key| bag.get(key)) {
        return Some(value);
    }
    bag.iter()
        .filter(|(name, _)| matches_alias(name, keys))
        .min_by_key(|(name, _)| *name)
        .map(|(_, value)| value)
}

fn is_truthy(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Bool(b) => *b,
        AttributeValue::Number(n) => *n == 1.0,
        AttributeValue::Text(s) => {
            let s = s.trim();
            TRUTHY_STRINGS.iter().any(|t| t.eq_ignore_ascii_case(s))
        }
    }
}

/// The VIP marker only accepts `true`, `1` and the string `"true"`.
fn is_vip_truthy(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        other => is_truthy(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vip_flag_or_attribute() {
        assert!(is_vip(&Guest::new("a").vip(true)));
        assert!(is_vip(&Guest::new("b").attr("VIP", "TRUE")));
        assert!(is_vip(&Guest::new("c").attr("vip", 1)));
        assert!(!is_vip(&Guest::new("d").attr("vip", "ja")));
        assert!(!is_vip(&Guest::new("e").attr("VIP", false)));
        assert!(!is_vip(&Guest::new("f")));
    }

    #[test]
    fn rsvp_accepts_loose_encodings() {
        for value in ["Ja", " yes ", "TRUE", "1"] {
            assert!(
                has_rsvp_or_attending(&Guest::new("g").attr("zusage", value)),
                "{value:?} should count as RSVP"
            );
        }
        assert!(has_rsvp_or_attending(&Guest::new("g").attr("Zusage", true)));
        assert!(has_rsvp_or_attending(&Guest::new("g").attr("Zusage", 1)));
        assert!(!has_rsvp_or_attending(&Guest::new("g").attr("Zusage", "nein")));
        assert!(!has_rsvp_or_attending(&Guest::new("g").attr("Zusage", 2)));
    }

    #[test]
    fn attending_counts_as_rsvp() {
        let guest = Guest::new("g")
            .attr("Zusage", false)
            .attr("Nimmt teil", "ja");
        assert!(has_rsvp_or_attending(&guest));
    }

    #[test]
    fn key_spelling_variants() {
        assert!(is_female(&Guest::new("g").attr(" WEIBLICH ", "x").attr("Weiblich", true)));
        assert!(is_female(&Guest::new("g").attr("WEIBLICH", "yes")));
        assert!(is_press(&Guest::new("g").attr("presse", "Ja")));
        assert!(has_rsvp_or_attending(&Guest::new("g").attr("NIMMT TEIL", true)));
    }

    #[test]
    fn any_truthy_spelling_wins() {
        assert!(is_vip(&Guest::new("g").attr("VIP", false).attr("vip", "true")));
        assert!(is_vip(&Guest::new("g").attr("vip", "nein").attr(" Vip ", 1)));
        assert!(has_rsvp_or_attending(
            &Guest::new("g").attr("Zusage", "nein").attr("zusage", "ja")
        ));
        assert!(is_press(&Guest::new("g").attr("Presse", false).attr("PRESSE ", "yes")));
        assert!(!is_female(&Guest::new("g").attr("Weiblich", false).attr("weiblich", "nein")));
    }

    #[test]
    fn conflicting_spellings_read_the_same_every_time() {
        for _ in 0..200 {
            let guest = Guest::new("g").attr(" ZUSAGE", "ja").attr("ZUSAGE ", false);
            assert!(has_rsvp_or_attending(&guest));

            let guest = Guest::new("g")
                .attr(" TISCHFARBE", "3")
                .attr("TISCHFARBE ", "1");
            assert_eq!(color_tag(&guest), ColorTag::Three);
        }
    }

    #[test]
    fn exact_colour_alias_beats_other_spellings() {
        let guest = Guest::new("g")
            .attr("TISCHFARBE", "4")
            .attr("tischfarbe", "2")
            .attr("Tischfarbe", "1");
        assert_eq!(color_tag(&guest), ColorTag::One);
    }

    #[test]
    fn colour_tag_is_strict() {
        assert_eq!(color_tag(&Guest::new("g").attr("Tischfarbe", " 2 ")), ColorTag::Two);
        assert_eq!(color_tag(&Guest::new("g").attr("tischfarbe", 4)), ColorTag::Four);
        assert_eq!(color_tag(&Guest::new("g").attr("Tischfarbe", "5")), ColorTag::Untagged);
        assert_eq!(color_tag(&Guest::new("g").attr("Tischfarbe", 2.5)), ColorTag::Untagged);
        assert_eq!(color_tag(&Guest::new("g").attr("Tischfarbe", true)), ColorTag::Untagged);
        assert_eq!(color_tag(&Guest::new("g")), ColorTag::Untagged);
    }

    #[test]
    fn empty_bag_reads_all_false() {
        let facts = GuestFacts::read(&Guest::new("g"));
        assert_eq!(
            facts,
            GuestFacts {
                is_vip: false,
                has_rsvp: false,
                is_female: false,
                is_press: false,
                color: ColorTag::Untagged,
            }
        );
    }
}
