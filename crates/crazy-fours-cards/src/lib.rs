//! Card labels and the Crazy Fours rule engine.
//!
//! The classifier emits an index into [`VOCABULARY`]; everything downstream
//! works with the typed [`Card`] instead of label strings.

mod card;
pub mod rules;

pub use card::{Card, CardParseError, Rank, Suit, VOCABULARY, VOCABULARY_LEN};
pub use rules::{evaluate_hand, is_playable, is_playable_label, Verdict, WildPolicy};
