//! Pocket aces on a 7-8-9 flop, against one and then three random opponents.
//!
//! ```shell
//! $ cargo run --example pocket_aces
//! ```

use oddsrs::{
    deck::{format_cards, parse_cards},
    equity::calculate_win_probability,
    hand::best_hand,
    rng_from_seed,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let hole = parse_cards("hA dA")?;
    let board = parse_cards("h7 d8 c9")?;
    let mut rng = rng_from_seed(None::<&str>);

    println!("Player cards: {}", format_cards(&hole));
    println!("Community cards: {}", format_cards(&board));
    println!("Current hand: {}", best_hand(&hole, &board));

    let prob = calculate_win_probability(&hole, &board, 1, 100, &mut rng)?;
    println!("Win probability: {:.1}%", prob * 100.0);

    let prob = calculate_win_probability(&hole, &board, 3, 100, &mut rng)?;
    println!("Win probability vs 3 opponents: {:.1}%", prob * 100.0);

    Ok(())
}
