//! Hand detection, evaluation, and ranking for poker hands

use crate::deck::{Card, CardMask, Rank, RankMask};

use core::fmt;
use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod refhand5;
pub mod refbest5;

pub use refhand5::evaluate_hand;
pub use refbest5::best_hand;

/// A trait describing engines capable of classifying exactly 5 cards into a hand
pub trait Hand5 {

    /// Classify the given cards, which must be exactly 5 of them, otherwise [Evaluation::Invalid] is returned
    fn hand5(&self, cards: &[Card]) -> Evaluation;
}

/// A trait describing engines capable of evaluating the best 5-card subset of a hand, returning the cards used and the hand it makes
pub trait Best5 {

    /// Determine the overall best hand over every 5-card subset of the given cards
    ///
    /// With fewer than 5 cards, this gives [Evaluation::NotEnoughCards] and an empty mask.
    fn best5(&self, cards: &[Card]) -> (CardMask, Evaluation);
}

/// The category of a hand, ordered from weakest to strongest, where the discriminant is the comparison key
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandCategory {
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl HandCategory {
    pub const NUM: usize = 10;
    pub const ALL: [Self; Self::NUM] = [
        Self::HighCard,
        Self::Pair,
        Self::TwoPair,
        Self::ThreeOfAKind,
        Self::Straight,
        Self::Flush,
        Self::FullHouse,
        Self::FourOfAKind,
        Self::StraightFlush,
        Self::RoyalFlush,
    ];

    /// The comparison key, from 1 (high card) to 10 (royal flush)
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn text(self) -> &'static str {
        match self {
            Self::HighCard => "high_card",
            Self::Pair => "pair",
            Self::TwoPair => "two_pair",
            Self::ThreeOfAKind => "three_of_a_kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full_house",
            Self::FourOfAKind => "four_of_a_kind",
            Self::StraightFlush => "straight_flush",
            Self::RoyalFlush => "royal_flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl FromStr for HandCategory {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter()
            .copied()
            .find(|c| c.text() == s)
            .ok_or("invalid hand category")
    }
}

/// Represents all possible poker hands, predelineated in order of strength (i.e. directly comparable)
///
/// The derived ordering is full poker strength: the kind of hand first, then the ranks that break ties within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Hand {

    /// A high card hand, which matches no other hand defined here. The kickers are used to break ties, of which there can be up to 5
    HighCard {
        kickers: RankMask,
    },

    /// A (single) pair, which requires 2 cards of the same rank. The kickers are used to break ties, of which there can be up to 3
    OnePair {
        pair: Rank,
        kickers: RankMask,
    },

    /// A two pair, which requires 2 pairs of the 2 separate ranks. The kicker is used to break ties
    TwoPair {
        pairs: RankMask,
        kickers: RankMask,
    },

    /// A three of a kind (trip), which requires 3 cards of the same rank. The kickers are used to break ties, of which there can be up to 2
    ThreeOfAKind {
        trip: Rank,
        kickers: RankMask,
    },

    /// A straight, which requires 5 consecutive ranks in any suit (A is high and low). The top rank is the only factor in breaking ties, and is `Five` for the wheel
    Straight {
        top: Rank,
    },

    /// A flush, which requires 5 cards of the same suit. The ranks, from the top down, break ties
    Flush {
        ranks: RankMask,
    },

    /// A full house, which requires 3 cards of the same rank and 2 cards of another rank. The trip is more important than the pair
    FullHouse {
        trip: Rank,
        pair: Rank,
    },

    /// A four of a kind, which requires 4 cards of the same rank. The kicker decides ties between equal quads
    FourOfAKind {
        quad: Rank,
        kickers: RankMask,
    },

    /// A straight flush, which requires 5 consecutive ranks in the same suit. An ace-high straight flush is a royal flush
    StraightFlush {
        top: Rank,
    },

}

impl Hand {

    /// The category of this hand, which is all that [Showdown::Category] looks at
    pub const fn category(&self) -> HandCategory {
        match self {
            Self::HighCard { .. } => HandCategory::HighCard,
            Self::OnePair { .. } => HandCategory::Pair,
            Self::TwoPair { .. } => HandCategory::TwoPair,
            Self::ThreeOfAKind { .. } => HandCategory::ThreeOfAKind,
            Self::Straight { .. } => HandCategory::Straight,
            Self::Flush { .. } => HandCategory::Flush,
            Self::FullHouse { .. } => HandCategory::FullHouse,
            Self::FourOfAKind { .. } => HandCategory::FourOfAKind,
            Self::StraightFlush { top: Rank::Ace } => HandCategory::RoyalFlush,
            Self::StraightFlush { .. } => HandCategory::StraightFlush,
        }
    }
}

// write the ranks of a straight from the top down, with the ace low for the wheel
//
// a top below five makes no straight, so only the ranks that exist are written
fn fmt_run(f: &mut fmt::Formatter<'_>, top: Rank) -> fmt::Result {
    if top == Rank::Five {
        return write!(f, "A5432");
    }
    for i in 0..5 {
        match top.index().checked_sub(i) {
            Some(index) => write!(f, "{}", Rank::from_index(index))?,
            None => break,
        }
    }
    Ok(())
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighCard { kickers } => {
                write!(f, "Kickers '{:}'", kickers)
            },
            Self::OnePair { pair, kickers } => {
                write!(f, "Pair '{:}' + Kickers '{:}'", pair, kickers)
            },
            Self::TwoPair { pairs, kickers } => {
                write!(f, "Two Pair '{:}' + Kickers '{:}'", pairs, kickers)
            },
            Self::ThreeOfAKind { trip, kickers } => {
                write!(f, "Trip '{:}' + Kickers '{:}'", trip, kickers)
            },
            Self::Straight { top } => {
                write!(f, "Straight '")?;
                fmt_run(f, *top)?;
                write!(f, "'")
            },
            Self::Flush { ranks } => {
                write!(f, "Flush '{:}'", ranks)
            },
            Self::FullHouse { trip, pair } => {
                write!(f, "Full House '{:}{:}'", trip, pair)
            },
            Self::FourOfAKind { quad, kickers } => {
                write!(f, "Quad '{:}' + Kickers '{:}'", quad, kickers)
            },
            Self::StraightFlush { top: Rank::Ace } => {
                write!(f, "Royal Flush")
            },
            Self::StraightFlush { top } => {
                write!(f, "Straight Flush '")?;
                fmt_run(f, *top)?;
                write!(f, "'")
            },
        }
    }
}

/// The outcome of evaluating some cards, which is either a hand or the reason there is none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {

    /// A classified 5-card hand
    Ranked(Hand),

    /// The evaluator was not given exactly 5 cards
    Invalid,

    /// There were fewer than 5 cards to choose a hand from
    NotEnoughCards,
}

impl Evaluation {

    pub const fn hand(&self) -> Option<&Hand> {
        match self {
            Self::Ranked(hand) => Some(hand),
            _ => None,
        }
    }

    pub const fn category(&self) -> Option<HandCategory> {
        match self {
            Self::Ranked(hand) => Some(hand.category()),
            _ => None,
        }
    }

    /// The category key of the hand, or 0 if there is no hand
    pub const fn rank(&self) -> u8 {
        match self.category() {
            Some(category) => category.value(),
            None => 0,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ranked(hand) => hand.category().text(),
            Self::Invalid => "invalid",
            Self::NotEnoughCards => "not_enough_cards",
        }
    }

    pub const fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranked(hand) => write!(f, "{} ({})", hand.category(), hand),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// How two evaluated hands are compared at showdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Showdown {

    /// Only the category decides, so two flushes (or two pairs, etc.) always tie regardless of their ranks
    #[default]
    Category,

    /// Full poker strength, where kickers and ranks break ties within a category
    Kickers,
}

impl Showdown {

    /// Compare two evaluations, where anything without a hand loses to any hand
    pub fn compare(self, lhs: &Evaluation, rhs: &Evaluation) -> Ordering {
        match self {
            Self::Category => lhs.rank().cmp(&rhs.rank()),
            Self::Kickers => lhs.hand().cmp(&rhs.hand()),
        }
    }
}
