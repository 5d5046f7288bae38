//! Splitting an event's guests into who gets seated and who does not.

use crate::attributes::GuestFacts;
use seatplan_core::guest::Guest;

/// A guest together with the facts read from its attributes.
#[derive(Debug, Clone, Copy)]
pub struct Classified<'a> {
    pub guest: &'a Guest,
    pub facts: GuestFacts,
}

/// Result of classifying an event's guest list.
///
/// `non_vip` is the universe the planner may write to; `press` and
/// `general` are disjoint and together make up every eligible guest.
#[derive(Debug, Default)]
pub struct Eligibility<'a> {
    pub non_vip: Vec<&'a Guest>,
    pub press: Vec<Classified<'a>>,
    pub general: Vec<Classified<'a>>,
    pub skipped_vip: usize,
    pub skipped_no_rsvp: usize,
}

impl<'a> Eligibility<'a> {
    pub fn classify(guests: &'a [Guest]) -> Self {
        let mut out = Eligibility::default();

        for guest in guests {
            let facts = GuestFacts::read(guest);
            if facts.is_vip {
                out.skipped_vip += 1;
                continue;
            }
            out.non_vip.push(guest);

            if !facts.has_rsvp {
                out.skipped_no_rsvp += 1;
                continue;
            }

            let entry = Classified { guest, facts };
            if facts.is_press {
                out.press.push(entry);
            } else {
                out.general.push(entry);
            }
        }

        out
    }

    pub fn eligible_count(&self) -> usize {
        self.press.len() + self.general.len()
    }
}
