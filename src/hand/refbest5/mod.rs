//! Reference implementation for finding the best 5-card hand out of a larger set of cards
use std::cmp::Ordering;

use crate::{combrs::Combinations, deck::{Card, CardMask}, hand::{refhand5::RefHand5, Best5, Evaluation, Hand5, Showdown}};

/// Reference implementation for the best 5-card subset, which runs a 5-card engine over every subset and keeps the strongest
///
/// Every one of the C(k, 5) subsets is checked, there is no short-circuiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefBest5<E: Hand5 = RefHand5> {
    engine: E,
}

impl RefBest5 {

    pub fn new() -> Self {
        Self { engine: RefHand5::new() }
    }
}

impl<E: Hand5> Best5 for RefBest5<E> {

    fn best5(&self, cards: &[Card]) -> (CardMask, Evaluation) {
        if cards.len() < 5 {
            return (CardMask::NONE, Evaluation::NotEnoughCards);
        }

        let mut best = (CardMask::NONE, Evaluation::Invalid);
        for idx in Combinations::<5>::new(cards.len()) {
            let five = idx.map(|i| cards[i]);
            let eval = self.engine.hand5(&five);

            // full strength picks one of the maximal subsets, which is also maximal by category
            if Showdown::Kickers.compare(&eval, &best.1) == Ordering::Greater {
                best = (CardMask::from_many(&five), eval);
            }
        }
        best
    }
}

/// The best hand made from hole cards plus community cards, or [Evaluation::NotEnoughCards] if there are fewer than 5 of them
pub fn best_hand(hole: &[Card], community: &[Card]) -> Evaluation {
    let all = hole.iter().chain(community).copied().collect::<Vec<_>>();
    RefBest5::new().best5(&all).1
}
