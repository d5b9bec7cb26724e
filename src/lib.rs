//! Poker hand-strength toolkit, providing card, deck and hand utilities plus Monte Carlo win-probability estimation.
//!
//! Hands are classified by [hand::evaluate_hand], the best of a larger set is found by [hand::best_hand], and
//! [equity::calculate_win_probability] (or the more configurable [equity::Estimator]) samples random opponents and boards.
//!

pub mod deck;
pub mod hand;
pub mod equity;

pub mod combrs;

use rand::prelude::*;
use rand_chacha::ChaCha20Rng;
use rand_seeder::Seeder;

/// Construct a random number generator from a seed string, or use a default-initialized one if no seed is provided
pub fn rng_from_seed<S: AsRef<[u8]>>(seed: Option<S>) -> Box<dyn RngCore> {
    match seed {
        // with a seed, create a ChaCha20Rng from the seed
        Some(seed) => Box::new(Seeder::from(seed.as_ref()).into_rng::<ChaCha20Rng>()),
        // without a seed, use the default random number generator
        None => Box::new(rand::rng()),
    }
}
