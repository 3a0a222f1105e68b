//! Playability rules for Crazy Fours.
//!
//! A hand card can be played on the current card when it matches its rank or
//! its suit. Jokers always play; face-down cards never take part. Fours are
//! wild, which the [`WildPolicy`] decides how to report.

use crate::Card;
use serde::{Deserialize, Serialize};

/// Whether `candidate` may be played on top of `current`.
///
/// Rules, first match wins:
/// 1. a `Joker` candidate is always playable (even on `Back`),
/// 2. `Back` on either side is never playable,
/// 3. otherwise rank or suit must match.
pub fn is_playable(candidate: Card, current: Card) -> bool {
    match (candidate, current) {
        (Card::Joker, _) => true,
        (Card::Back, _) | (_, Card::Back) => false,
        (
            Card::Standard { rank, suit },
            Card::Standard {
                rank: cur_rank,
                suit: cur_suit,
            },
        ) => rank == cur_rank || suit == cur_suit,
        // A joker on the pile matches neither rank nor suit.
        (Card::Standard { .. }, Card::Joker) => false,
    }
}

/// Textual variant of [`is_playable`] for labels coming from outside the
/// vocabulary (config files, other classifiers).
///
/// Labels are compared token-wise, `<rank>_<suit>`, without checking the
/// tokens against the vocabulary: `Ace_X` plays on `Ace_C`. A `Joker`
/// candidate plays on anything, `Back` on either side never plays, and a label
/// without `_` never matches.
pub fn is_playable_label(candidate: &str, current: &str) -> bool {
    if candidate == "Joker" {
        return true;
    }
    if candidate == "Back" || current == "Back" {
        return false;
    }
    match (label_tokens(candidate), label_tokens(current)) {
        (Some((rank, suit)), Some((cur_rank, cur_suit))) => rank == cur_rank || suit == cur_suit,
        _ => false,
    }
}

/// First two `_`-separated tokens, if the label has a separator.
fn label_tokens(label: &str) -> Option<(&str, &str)> {
    let mut tokens = label.split('_');
    let rank = tokens.next()?;
    let suit = tokens.next()?;
    Some((rank, suit))
}

/// How wild cards (rank Four) are reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildPolicy {
    /// Wild status only affects rendering; `playable` keeps the plain
    /// rank/suit verdict.
    #[default]
    Cosmetic,
    /// Wild cards are reported playable on anything but `Back`.
    AlwaysPlayable,
}

/// Outcome for one hand card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub playable: bool,
    pub wild: bool,
}

impl WildPolicy {
    pub fn judge(self, candidate: Card, current: Card) -> Verdict {
        let wild = candidate.is_wild();
        let playable = match self {
            WildPolicy::AlwaysPlayable if wild => current != Card::Back,
            _ => is_playable(candidate, current),
        };
        Verdict { playable, wild }
    }
}

/// Judge every card of `hand` against `current`, preserving order.
pub fn evaluate_hand(current: Card, hand: &[Card], policy: WildPolicy) -> Vec<Verdict> {
    hand.iter().map(|&c| policy.judge(c, current)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, Suit, VOCABULARY};

    fn card(s: &str) -> Card {
        s.parse().expect("valid label")
    }

    #[test]
    fn joker_plays_on_everything() {
        for current in VOCABULARY.iter().filter(|c| **c != Card::Joker) {
            assert!(is_playable(Card::Joker, *current), "{current}");
        }
    }

    #[test]
    fn back_never_plays_and_never_accepts() {
        for x in VOCABULARY {
            assert!(!is_playable(Card::Back, x), "Back on {x}");
            if x != Card::Joker {
                assert!(!is_playable(x, Card::Back), "{x} on Back");
            }
        }
    }

    #[test]
    fn rank_or_suit_match() {
        assert!(is_playable(card("Ace_C"), card("King_C")));
        assert!(is_playable(card("Ace_C"), card("Ace_D")));
        assert!(!is_playable(card("Ace_C"), card("King_D")));
        assert!(is_playable(card("Seven_S"), card("Seven_S")));
    }

    #[test]
    fn standard_card_on_joker_is_not_playable() {
        assert!(!is_playable(card("Ten_H"), Card::Joker));
    }

    #[test]
    fn label_variant_degrades_on_malformed_input() {
        assert!(is_playable_label("Ace_C", "King_C"));
        assert!(is_playable_label("Joker", "garbage"));
        assert!(!is_playable_label("Back", "Ace_C"));
        assert!(!is_playable_label("Ace_C", "Back"));
        assert!(!is_playable_label("Ace", "Ace_C"));
        assert!(!is_playable_label("Ace_C", "King"));
        assert!(!is_playable_label("", ""));
    }

    #[test]
    fn label_variant_compares_tokens_outside_vocabulary() {
        assert!(is_playable_label("Ace_X", "Ace_C"));
        assert!(is_playable_label("Eleven_S", "Two_S"));
        assert!(!is_playable_label("Ace_X", "King_C"));
        assert!(is_playable_label("Ace_C_extra", "Ace_D"));
        for a in VOCABULARY {
            for b in VOCABULARY {
                assert_eq!(
                    is_playable_label(&a.to_string(), &b.to_string()),
                    is_playable(a, b),
                    "{a} on {b}"
                );
            }
        }
    }

    #[test]
    fn cosmetic_policy_keeps_plain_verdict_for_fours() {
        let v = WildPolicy::Cosmetic.judge(Card::new(Rank::Four, Suit::Hearts), card("King_S"));
        assert_eq!(
            v,
            Verdict {
                playable: false,
                wild: true
            }
        );
    }

    #[test]
    fn always_playable_policy_lifts_fours() {
        let four = Card::new(Rank::Four, Suit::Hearts);
        let v = WildPolicy::AlwaysPlayable.judge(four, card("King_S"));
        assert!(v.playable && v.wild);
        assert!(!WildPolicy::AlwaysPlayable.judge(four, Card::Back).playable);
        let plain = WildPolicy::AlwaysPlayable.judge(card("Ace_S"), card("King_D"));
        assert!(!plain.playable && !plain.wild);
    }

    #[test]
    fn evaluate_hand_preserves_order() {
        let hand = [card("Two_C"), card("Nine_D"), card("Four_S"), Card::Joker];
        let verdicts = evaluate_hand(card("Nine_C"), &hand, WildPolicy::Cosmetic);
        let playable: Vec<bool> = verdicts.iter().map(|v| v.playable).collect();
        let wild: Vec<bool> = verdicts.iter().map(|v| v.wild).collect();
        assert_eq!(playable, [true, true, false, true]);
        assert_eq!(wild, [false, false, true, false]);
    }

    #[test]
    fn policy_serializes_snake_case() {
        let json = serde_json::to_string(&WildPolicy::AlwaysPlayable).unwrap();
        assert_eq!(json, "\"always_playable\"");
    }
}
