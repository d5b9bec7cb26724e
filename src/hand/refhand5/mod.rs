//! Reference implementation for 5-card hand deduction, with readable and understandable code
//!
//! It counts ranks and suits, then checks each kind of hand from strongest to weakest, so the first match is the answer.

use crate::{deck::{Card, Rank, RankMask, Suit}, hand::{Evaluation, Hand, Hand5}};

/// The ranks of the wheel straight (A2345), where the ace plays low
const WHEEL: RankMask = RankMask::new(0b1_0000_0000_1111);

/// Reference implementation for 5-card hand deduction, which uses no data or lookup tables, and manually checks it analytically each time
#[derive(Debug, Clone, Copy, Default)]
pub struct RefHand5 {}

impl RefHand5 {

    /// Create a new reference implementation for 5-card hand deduction, which is a no-op constructor
    pub fn new() -> Self {
        Self { }
    }

    /// Check 5 distinct ranks for a straight, returning the top rank if found
    fn check_straight(ranks: RankMask) -> Option<Rank> {
        if ranks == WHEEL {
            return Some(Rank::Five);
        }
        match (ranks.bottom(), ranks.top()) {
            (Some(lo), Some(hi)) if ranks.count() == 5 && hi.index() - lo.index() == 4 => Some(hi),
            _ => None,
        }
    }

    /// Classify exactly 5 cards into a hand
    fn classify(cards: &[Card; 5]) -> Hand {
        let mut rank_counts = [0usize; Rank::NUM];
        let mut suit_counts = [0usize; Suit::NUM];
        let mut ranks = RankMask::NONE;
        for card in cards {
            rank_counts[card.rank().index() as usize] += 1;
            suit_counts[card.suit().index() as usize] += 1;
            ranks = ranks | RankMask::from(card.rank());
        }

        // group ranks by how many times they occur, so 'by_count[2]' holds every paired rank
        let mut by_count = [RankMask::NONE; 6];
        for rank in ranks.iter() {
            let count = rank_counts[rank.index() as usize];
            by_count[count] = by_count[count] | RankMask::from(rank);
        }

        let is_flush = suit_counts.iter().any(|&n| n == 5);
        let straight = Self::check_straight(ranks);

        if let (Some(top), true) = (straight, is_flush) {
            return Hand::StraightFlush { top };
        }
        if let Some(quad) = by_count[4].top() {
            return Hand::FourOfAKind { quad, kickers: by_count[1] };
        }
        if let (Some(trip), Some(pair)) = (by_count[3].top(), by_count[2].top()) {
            return Hand::FullHouse { trip, pair };
        }
        if is_flush {
            return Hand::Flush { ranks };
        }
        if let Some(top) = straight {
            return Hand::Straight { top };
        }
        if let Some(trip) = by_count[3].top() {
            return Hand::ThreeOfAKind { trip, kickers: by_count[1] };
        }
        if by_count[2].count() == 2 {
            return Hand::TwoPair { pairs: by_count[2], kickers: by_count[1] };
        }
        if let Some(pair) = by_count[2].top() {
            return Hand::OnePair { pair, kickers: by_count[1] };
        }

        // if we didn't find anything, return a high card
        Hand::HighCard { kickers: ranks }
    }
}

impl Hand5 for RefHand5 {

    fn hand5(&self, cards: &[Card]) -> Evaluation {
        match <&[Card; 5]>::try_from(cards) {
            Ok(five) => Evaluation::Ranked(Self::classify(five)),
            Err(_) => Evaluation::Invalid,
        }
    }
}

/// Evaluate exactly 5 cards with the reference engine, or [Evaluation::Invalid] for any other count
pub fn evaluate_hand(cards: &[Card]) -> Evaluation {
    RefHand5::new().hand5(cards)
}
