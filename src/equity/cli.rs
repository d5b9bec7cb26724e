//! Program to estimate the win probability of a hold'em hand from the command line.
//!
//! Examples:
//!
//! ```shell
//! # pocket aces on a 7-8-9 flop against 3 opponents, prints something like '72%'
//! $ cargo run --bin odds -- --hole hAdA --board h7d8c9 --opponents 3
//!
//! # full-strength showdown on 8 threads, reproducible, as JSON
//! $ cargo run --bin odds -- --hole sKsQ -n 100000 --kickers --threads 8 --seed abc --json
//! ```
//!

use std::{str::FromStr, time::Duration};

use clap::Parser;
use rand::{distr::Alphanumeric, Rng};
use serde::Serialize;

use crate::{
    deck::{format_cards, parse_cards, Card},
    equity::{Estimate, Estimator, SimConfig, StopSignal},
    hand::{Evaluation, Showdown},
    rng_from_seed,
};

/// A list of cards on the command line, such as `hAdA` or `h7,d8,c9`, keeping duplicates so they can be reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardList(pub Vec<Card>);

impl FromStr for CardList {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cards(s).map(Self)
    }
}

/// Arguments for the odds CLI, which describe the known cards and how to simulate the rest.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The player's two hole cards, suit first then rank, e.g. 'hAdA' or 'h10,s10'.
    #[arg(long)]
    pub hole: CardList,

    /// Community cards revealed so far, between 0 and 5 of them.
    #[arg(short, long, default_value = "")]
    pub board: CardList,

    /// Number of opponents, each holding two random cards.
    #[arg(short, long, default_value = "1")]
    pub opponents: usize,

    /// Number of Monte Carlo trials.
    #[arg(short = 'n', long, default_value = "100")]
    pub simulations: usize,

    /// Break ties within a category by kickers, instead of comparing categories only.
    #[arg(short, long)]
    pub kickers: bool,

    /// Randomness seed string for deterministic generation.
    ///
    /// If not provided, a default-initialized RNG will be used.
    #[arg(short, long)]
    pub seed: Option<String>,

    /// Spread the trials over this many threads.
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Stop early after this many milliseconds, reporting the trials done so far.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print the full report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// What the CLI reports about a finished estimate
#[derive(Debug, Serialize)]
struct Report {
    hole: String,
    board: String,
    current: Evaluation,
    config: SimConfig,
    probability: f64,
    estimate: Estimate,
}

impl Args {

    /// The simulation parameters given by the flags
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            opponents: self.opponents,
            simulations: self.simulations,
            showdown: if self.kickers { Showdown::Kickers } else { Showdown::Category },
        }
    }

    /// Run the odds CLI with parsed arguments, useful as an entrypoint for the program.
    pub fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let mut est = Estimator::new(&self.hole.0, &self.board.0)?.config(self.sim_config());
        if let Some(ms) = self.timeout_ms {
            est = est.stop(StopSignal::with_timeout(Duration::from_millis(ms)));
        }

        let res = match self.threads {
            Some(threads) => {
                // partitions need a seed of their own, so make one up if none was given
                let seed = self.seed.clone().unwrap_or_else(|| {
                    rand::rng().sample_iter(&Alphanumeric).take(16).map(char::from).collect()
                });
                est.run_parallel(seed, threads)?
            }
            None => est.run(&mut rng_from_seed(self.seed.as_ref()))?,
        };
        if res.interrupted {
            log::warn!("stopped after {} of {} trials", res.trials, res.requested);
        }

        if self.json {
            let report = Report {
                hole: format_cards(&self.hole.0),
                board: format_cards(&self.board.0),
                current: est.current_hand(),
                config: *est.get_config(),
                probability: res.probability(),
                estimate: res,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", res);
        }

        Ok(())
    }
}
