use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of distinct labels the classifier can emit.
pub const VOCABULARY_LEN: usize = 54;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CardParseError {
    #[error("unknown rank token `{0}`")]
    UnknownRank(String),
    #[error("unknown suit token `{0}`")]
    UnknownSuit(String),
    #[error("label `{0}` is not `<Rank>_<Suit>`, `Joker` or `Back`")]
    Malformed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Token used in the textual label, e.g. `Ten` in `Ten_H`.
    pub fn token(self) -> &'static str {
        match self {
            Rank::Ace => "Ace",
            Rank::Two => "Two",
            Rank::Three => "Three",
            Rank::Four => "Four",
            Rank::Five => "Five",
            Rank::Six => "Six",
            Rank::Seven => "Seven",
            Rank::Eight => "Eight",
            Rank::Nine => "Nine",
            Rank::Ten => "Ten",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

impl FromStr for Rank {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .into_iter()
            .find(|r| r.token() == s)
            .ok_or_else(|| CardParseError::UnknownRank(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn letter(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

impl FromStr for Suit {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Suit::ALL
                .into_iter()
                .find(|suit| suit.letter() == c)
                .ok_or_else(|| CardParseError::UnknownSuit(s.to_string())),
            _ => Err(CardParseError::UnknownSuit(s.to_string())),
        }
    }
}

/// One classifier label.
///
/// `Back` is a face-down or unrecognizable card. Neither `Joker` nor `Back`
/// carries a suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Card {
    Standard { rank: Rank, suit: Suit },
    Joker,
    Back,
}

/// All labels in classifier output order: clubs, diamonds, hearts, spades,
/// each Ace through King, then `Joker` and `Back`.
pub const VOCABULARY: [Card; VOCABULARY_LEN] = build_vocabulary();

const fn build_vocabulary() -> [Card; VOCABULARY_LEN] {
    let mut out = [Card::Back; VOCABULARY_LEN];
    let mut s = 0;
    while s < 4 {
        let mut r = 0;
        while r < 13 {
            out[s * 13 + r] = Card::Standard {
                rank: Rank::ALL[r],
                suit: Suit::ALL[s],
            };
            r += 1;
        }
        s += 1;
    }
    out[52] = Card::Joker;
    out[53] = Card::Back;
    out
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card::Standard { rank, suit }
    }

    pub fn rank(self) -> Option<Rank> {
        match self {
            Card::Standard { rank, .. } => Some(rank),
            _ => None,
        }
    }

    pub fn suit(self) -> Option<Suit> {
        match self {
            Card::Standard { suit, .. } => Some(suit),
            _ => None,
        }
    }

    /// Fours are wild in Crazy Fours.
    pub fn is_wild(self) -> bool {
        self.rank() == Some(Rank::Four)
    }

    /// Position of this card in [`VOCABULARY`].
    pub fn index(self) -> usize {
        match self {
            Card::Standard { rank, suit } => suit.position() * 13 + rank.position(),
            Card::Joker => 52,
            Card::Back => 53,
        }
    }

    pub fn from_index(index: usize) -> Option<Card> {
        VOCABULARY.get(index).copied()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Standard { rank, suit } => write!(f, "{}_{}", rank.token(), suit.letter()),
            Card::Joker => f.write_str("Joker"),
            Card::Back => f.write_str("Back"),
        }
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Joker" => Ok(Card::Joker),
            "Back" => Ok(Card::Back),
            _ => {
                let (rank, suit) = s
                    .split_once('_')
                    .ok_or_else(|| CardParseError::Malformed(s.to_string()))?;
                Ok(Card::new(rank.parse()?, suit.parse()?))
            }
        }
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn vocabulary_is_complete_and_unique() {
        let unique: HashSet<Card> = VOCABULARY.iter().copied().collect();
        assert_eq!(unique.len(), VOCABULARY_LEN);
        assert_eq!(VOCABULARY[0].to_string(), "Ace_C");
        assert_eq!(VOCABULARY[12].to_string(), "King_C");
        assert_eq!(VOCABULARY[13].to_string(), "Ace_D");
        assert_eq!(VOCABULARY[29].to_string(), "Four_H");
        assert_eq!(VOCABULARY[51].to_string(), "King_S");
        assert_eq!(VOCABULARY[52], Card::Joker);
        assert_eq!(VOCABULARY[53], Card::Back);
    }

    #[test]
    fn index_matches_vocabulary_position() {
        for (i, card) in VOCABULARY.iter().enumerate() {
            assert_eq!(card.index(), i);
            assert_eq!(Card::from_index(i), Some(*card));
        }
        assert_eq!(Card::from_index(VOCABULARY_LEN), None);
    }

    #[test]
    fn labels_parse_back() {
        for card in VOCABULARY {
            assert_eq!(card.to_string().parse::<Card>(), Ok(card));
        }
    }

    #[test]
    fn malformed_labels_are_rejected() {
        assert!(matches!(
            "AceC".parse::<Card>(),
            Err(CardParseError::Malformed(_))
        ));
        assert!(matches!(
            "One_C".parse::<Card>(),
            Err(CardParseError::UnknownRank(_))
        ));
        assert!(matches!(
            "Ace_X".parse::<Card>(),
            Err(CardParseError::UnknownSuit(_))
        ));
        assert!(matches!(
            "Ace_CC".parse::<Card>(),
            Err(CardParseError::UnknownSuit(_))
        ));
    }

    #[test]
    fn only_fours_are_wild() {
        let wild: Vec<String> = VOCABULARY
            .iter()
            .filter(|c| c.is_wild())
            .map(|c| c.to_string())
            .collect();
        assert_eq!(wild, ["Four_C", "Four_D", "Four_H", "Four_S"]);
    }

    #[test]
    fn serde_uses_label_text() {
        let json = serde_json::to_string(&Card::new(Rank::Queen, Suit::Hearts)).unwrap();
        assert_eq!(json, "\"Queen_H\"");
        let back: Card = serde_json::from_str("\"Back\"").unwrap();
        assert_eq!(back, Card::Back);
        assert!(serde_json::from_str::<Card>("\"Queen\"").is_err());
    }
}
