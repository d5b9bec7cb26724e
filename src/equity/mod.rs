//! Monte Carlo estimation of how often a hand wins outright against random opponents
//!
//! Each trial deals every opponent two unknown cards, completes the board, and checks whether the player's best hand beats all of theirs.
//! Trials only read the shared state, so they can be spread over threads with [Estimator::run_parallel].

pub mod cli;

use std::{
    cmp::Ordering,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Arc,
    },
    time::{Duration, Instant},
};

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_seeder::Seeder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    deck::{create_deck, Card, CardMask, Deck},
    hand::{refbest5::RefBest5, Best5, Evaluation, Showdown},
};

/// Cards on a full board
pub const BOARD_SIZE: usize = 5;

/// Cards each player holds
pub const HOLE_SIZE: usize = 2;

/// Reasons an estimate cannot be run at all
#[derive(Debug, Error)]
pub enum EquityError {
    #[error("expected exactly 2 hole cards, got {0}")]
    HoleCards(usize),

    #[error("expected at most 5 community cards, got {0}")]
    CommunityCards(usize),

    #[error("card {0} is used more than once")]
    DuplicateCard(Card),

    #[error("need at least one opponent")]
    NoOpponents,

    #[error("need at least one simulation")]
    NoSimulations,

    #[error("need at least one thread")]
    NoThreads,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Parameters of an estimate that do not depend on the cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {

    /// Number of opponents, each dealt two random cards per trial
    pub opponents: usize,

    /// Number of trials to run
    pub simulations: usize,

    /// How hands are compared at showdown
    pub showdown: Showdown,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { opponents: 1, simulations: 100, showdown: Showdown::Category }
    }
}

impl SimConfig {

    pub fn validate(&self) -> Result<(), EquityError> {
        if self.opponents == 0 {
            return Err(EquityError::NoOpponents);
        }
        if self.simulations == 0 {
            return Err(EquityError::NoSimulations);
        }
        Ok(())
    }
}

/// A cooperative stop flag, shared between clones and checked between trials
///
/// It also counts as stopped once its deadline (if any) has passed.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl StopSignal {

    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that also trips at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self { flag: Arc::default(), deadline: Some(deadline) }
    }

    /// A signal that also trips once `timeout` has elapsed from now, or never if that is beyond what an [Instant] can hold
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { flag: Arc::default(), deadline: Instant::now().checked_add(timeout) }
    }

    /// Ask every run holding a clone of this signal to stop after its current trial
    pub fn stop(&self) {
        self.flag.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(AtomicOrdering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// The tally of a (possibly interrupted) run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Estimate {

    /// Trials the player won outright
    pub wins: usize,

    /// Trials actually completed
    pub trials: usize,

    /// Trials asked for
    pub requested: usize,

    /// Whether the run stopped before completing every requested trial
    pub interrupted: bool,
}

impl Estimate {

    /// Fraction of completed trials that were wins, or 0 if none completed
    pub fn probability(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.wins as f64 / self.trials as f64
    }

    /// Combine the tallies of two disjoint sets of trials
    pub fn merge(self, other: Self) -> Self {
        Self {
            wins: self.wins + other.wins,
            trials: self.trials + other.trials,
            requested: self.requested + other.requested,
            interrupted: self.interrupted || other.interrupted,
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(0);
        write!(f, "{:.*}%", prec, self.probability() * 100.0)
    }
}

/// Monte Carlo win-probability estimator for a fixed set of known cards
///
/// ```
/// use oddsrs::{deck::parse_cards, equity::Estimator, hand::Showdown, rng_from_seed};
///
/// let hole = parse_cards("hA dA").unwrap();
/// let board = parse_cards("h7 d8 c9").unwrap();
/// let est = Estimator::new(&hole, &board).unwrap()
///     .opponents(3)
///     .simulations(500)
///     .showdown(Showdown::Kickers)
///     .run(&mut rng_from_seed(Some("doc")))
///     .unwrap();
/// assert!(est.probability() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Estimator {
    hole: CardMask,
    community: CardMask,
    deck: Deck,
    config: SimConfig,
    stop: Option<StopSignal>,
    engine: RefBest5,
}

impl Estimator {

    /// Set up an estimate for `hole` against the board `community`, rejecting impossible card sets
    pub fn new(hole: &[Card], community: &[Card]) -> Result<Self, EquityError> {
        if hole.len() != HOLE_SIZE {
            return Err(EquityError::HoleCards(hole.len()));
        }
        if community.len() > BOARD_SIZE {
            return Err(EquityError::CommunityCards(community.len()));
        }

        let mut known = CardMask::NONE;
        for &card in hole.iter().chain(community) {
            let mask = CardMask::from(card);
            if known.contains(mask) {
                return Err(EquityError::DuplicateCard(card));
            }
            known = known | mask;
        }

        let hole = CardMask::from_many(hole);
        Ok(Self {
            hole,
            community: known & !hole,
            deck: create_deck(known),
            config: SimConfig::default(),
            stop: None,
            engine: RefBest5::new(),
        })
    }

    pub fn opponents(mut self, opponents: usize) -> Self {
        self.config.opponents = opponents;
        self
    }

    pub fn simulations(mut self, simulations: usize) -> Self {
        self.config.simulations = simulations;
        self
    }

    pub fn showdown(mut self, showdown: Showdown) -> Self {
        self.config.showdown = showdown;
        self
    }

    pub fn stop(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn get_config(&self) -> &SimConfig {
        &self.config
    }

    /// The player's best hand with only the cards known so far
    pub fn current_hand(&self) -> Evaluation {
        self.best_of(self.hole | self.community)
    }

    /// Run every trial on the calling thread, drawing all randomness from `rng`
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<Estimate, EquityError> {
        self.config.validate()?;
        log::debug!("estimating {} vs {} opponents over {} trials", self.hole, self.config.opponents, self.config.simulations);

        let est = self.run_trials(self.config.simulations, rng);
        log::debug!("finished {}/{} trials, {} wins", est.trials, est.requested, est.wins);
        Ok(est)
    }

    /// Split the trials over `threads` partitions in a dedicated thread pool
    ///
    /// Each partition draws from its own generator seeded by `seed` and its index, so the result is reproducible for a fixed seed and thread count.
    pub fn run_parallel<S: AsRef<[u8]>>(&self, seed: S, threads: usize) -> Result<Estimate, EquityError> {
        self.config.validate()?;
        if threads == 0 {
            return Err(EquityError::NoThreads);
        }
        log::debug!("estimating {} vs {} opponents over {} trials on {} threads", self.hole, self.config.opponents, self.config.simulations, threads);

        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        let seed = seed.as_ref();
        let (per, extra) = (self.config.simulations / threads, self.config.simulations % threads);
        let est = pool.install(|| {
            (0..threads)
                .into_par_iter()
                .map(|part| {
                    let mut rng: ChaCha20Rng = Seeder::from((seed, part)).into_rng();
                    self.run_trials(per + usize::from(part < extra), &mut rng)
                })
                .reduce(Estimate::default, Estimate::merge)
        });

        log::debug!("finished {}/{} trials, {} wins", est.trials, est.requested, est.wins);
        Ok(est)
    }

    fn run_trials<R: Rng>(&self, num: usize, rng: &mut R) -> Estimate {
        let mut est = Estimate { requested: num, ..Default::default() };
        // no more than the deck can seat, however many were asked for
        let mut opponents = Vec::with_capacity(self.config.opponents.min(self.deck.len() / HOLE_SIZE));
        for _ in 0..num {
            if self.stop.as_ref().is_some_and(StopSignal::is_stopped) {
                est.interrupted = true;
                break;
            }
            if self.trial(&mut opponents, rng) {
                est.wins += 1;
            }
            est.trials += 1;
        }
        est
    }

    /// Play out a single random completion, returning whether the player beat every opponent
    fn trial<R: Rng>(&self, opponents: &mut Vec<CardMask>, rng: &mut R) -> bool {
        let board = self.deal(opponents, rng);
        let player = self.best_of(self.hole | board);
        opponents
            .iter()
            .all(|&opp| self.config.showdown.compare(&player, &self.best_of(opp | board)) == Ordering::Greater)
    }

    /// Deal the opponents' hands into `opponents` and return the final board, all from one copy of the deck
    fn deal<R: Rng>(&self, opponents: &mut Vec<CardMask>, rng: &mut R) -> CardMask {
        let mut deck = self.deck;

        // opponents are dealt before the board, and stop being dealt once the deck runs dry
        opponents.clear();
        for _ in 0..self.config.opponents {
            match deck.deal(HOLE_SIZE, rng) {
                Some(hole) => opponents.push(hole),
                None => {
                    log::trace!("deck ran out after {} opponents", opponents.len());
                    break;
                }
            }
        }

        let missing = BOARD_SIZE - self.community.count();
        match deck.deal(missing, rng) {
            Some(extra) => self.community | extra,
            None => {
                log::trace!("deck too short to finish the board, {} cards left", deck.len());
                self.community
            }
        }
    }

    fn best_of(&self, cards: CardMask) -> Evaluation {
        let mut buf = [Card::from_index(0); HOLE_SIZE + BOARD_SIZE];
        let mut len = 0;
        for (slot, card) in buf.iter_mut().zip(cards.iter()) {
            *slot = card;
            len += 1;
        }
        self.engine.best5(&buf[..len]).1
    }
}

/// Probability that `hole` beats `num_opponents` random hands, comparing by category alone
pub fn calculate_win_probability<R: Rng>(
    hole: &[Card],
    community: &[Card],
    num_opponents: usize,
    simulations: usize,
    rng: &mut R,
) -> Result<f64, EquityError> {
    let est = Estimator::new(hole, community)?
        .opponents(num_opponents)
        .simulations(simulations)
        .run(rng)?;
    Ok(est.probability())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;

    use crate::deck::parse_cards;

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    fn rng(seed: u64) -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(seed)
    }

    macro_rules! assert_prob_in {
        ($prob:expr, $lo:expr, $hi:expr) => {
            let _p = $prob;
            if !(_p >= $lo && _p <= $hi) {
                panic!("probability {} outside [{}, {}]", _p, $lo, $hi);
            }
        };
    }

    #[test]
    fn test_rejects_bad_cards() {
        assert!(matches!(Estimator::new(&cards("hA"), &[]), Err(EquityError::HoleCards(1))));
        assert!(matches!(Estimator::new(&cards("hA dA cA"), &[]), Err(EquityError::HoleCards(3))));
        assert!(matches!(Estimator::new(&cards("hA dA"), &cards("h2 h3 h4 h5 h6 h7")), Err(EquityError::CommunityCards(6))));

        let dup = cards("hA")[0];
        match Estimator::new(&cards("hA hA"), &[]) {
            Err(EquityError::DuplicateCard(card)) => assert_eq!(card, dup),
            other => panic!("expected a duplicate card error, got {:?}", other),
        }
        assert!(matches!(Estimator::new(&cards("hA dA"), &cards("h7 hA")), Err(EquityError::DuplicateCard(_))));
    }

    #[test]
    fn test_rejects_bad_config() {
        let est = Estimator::new(&cards("hA dA"), &[]).unwrap();
        assert!(matches!(est.clone().opponents(0).run(&mut rng(0)), Err(EquityError::NoOpponents)));
        assert!(matches!(est.clone().simulations(0).run(&mut rng(0)), Err(EquityError::NoSimulations)));
        assert!(matches!(est.clone().run_parallel("seed", 0), Err(EquityError::NoThreads)));
        assert!(calculate_win_probability(&cards("hA dA"), &[], 0, 10, &mut rng(0)).is_err());
    }

    #[test]
    fn test_probability_bounds() {
        let setups = [
            ("hA dA", "", 1),
            ("h2 d7", "", 9),
            ("hA dA", "h7 d8 c9", 3),
            ("sK sQ", "s2 s3 s4 hJ", 2),
            ("c5 d5", "h5 s5 hK dQ cJ", 5),
            ("h2 c3", "", 30),
            ("h2 c3", "hA hK hQ", 30),
        ];
        for (i, (hole, board, opponents)) in setups.into_iter().enumerate() {
            for showdown in [Showdown::Category, Showdown::Kickers] {
                let est = Estimator::new(&cards(hole), &cards(board)).unwrap()
                    .opponents(opponents)
                    .simulations(200)
                    .showdown(showdown)
                    .run(&mut rng(i as u64))
                    .unwrap();
                assert_eq!(est.trials, 200);
                assert!(!est.interrupted);
                assert!(est.wins <= est.trials);
                assert_prob_in!(est.probability(), 0.0, 1.0);
            }
        }
    }

    #[test]
    fn test_shared_royal_never_wins() {
        let board = cards("hA hK hQ hJ h10");
        for showdown in [Showdown::Category, Showdown::Kickers] {
            let est = Estimator::new(&cards("h2 h3"), &board).unwrap()
                .opponents(3)
                .simulations(300)
                .showdown(showdown)
                .run(&mut rng(5))
                .unwrap();
            assert_eq!(est.wins, 0);
            assert_eq!(est.probability(), 0.0);
        }
    }

    #[test]
    fn test_unbeatable_hand_always_wins() {
        let hole = cards("hA hK");
        let board = cards("hQ hJ h10 d2 c3");
        let prob = calculate_win_probability(&hole, &board, 4, 300, &mut rng(6)).unwrap();
        assert_eq!(prob, 1.0);
    }

    #[test]
    fn test_pocket_aces_converges() {
        let est = Estimator::new(&cards("hA dA"), &[]).unwrap()
            .simulations(5000)
            .showdown(Showdown::Kickers)
            .run(&mut rng(85))
            .unwrap();
        assert_prob_in!(est.probability(), 0.80, 0.90);
    }

    #[test]
    fn test_category_wins_subset_of_kicker_wins() {
        // the same seed deals the same trials, and a category win is always a kicker win
        let base = Estimator::new(&cards("hA dA"), &cards("h7 d8 c9")).unwrap().opponents(2).simulations(1000);
        let cat = base.clone().showdown(Showdown::Category).run(&mut rng(11)).unwrap();
        let kick = base.showdown(Showdown::Kickers).run(&mut rng(11)).unwrap();
        assert!(cat.wins <= kick.wins, "{:?} vs {:?}", cat, kick);
    }

    #[test]
    fn test_seeded_reproducible() {
        let est = Estimator::new(&cards("sK sQ"), &cards("s2 s3")).unwrap().opponents(2).simulations(400);
        let a = est.run(&mut rng(42)).unwrap();
        let b = est.run(&mut rng(42)).unwrap();
        assert_eq!(a, b);

        let hole = cards("sK sQ");
        let p1 = calculate_win_probability(&hole, &[], 2, 400, &mut crate::rng_from_seed(Some("same"))).unwrap();
        let p2 = calculate_win_probability(&hole, &[], 2, 400, &mut crate::rng_from_seed(Some("same"))).unwrap();
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_parallel() {
        let est = Estimator::new(&cards("hA dA"), &cards("h7 d8 c9")).unwrap()
            .opponents(3)
            .simulations(1001)
            .showdown(Showdown::Kickers);

        let a = est.run_parallel("par", 4).unwrap();
        let b = est.run_parallel("par", 4).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trials, 1001);
        assert_eq!(a.requested, 1001);
        assert_prob_in!(a.probability(), 0.0, 1.0);

        // more threads than trials leaves some partitions empty
        let few = est.clone().simulations(3).run_parallel("par", 8).unwrap();
        assert_eq!(few.trials, 3);
    }

    #[test]
    fn test_stopped_runs() {
        let stop = StopSignal::new();
        stop.stop();
        let est = Estimator::new(&cards("hA dA"), &[]).unwrap().simulations(1000).stop(stop.clone());
        let res = est.run(&mut rng(1)).unwrap();
        assert!(res.interrupted);
        assert_eq!((res.trials, res.wins, res.requested), (0, 0, 1000));
        assert_eq!(res.probability(), 0.0);

        let par = est.run_parallel("stop", 3).unwrap();
        assert!(par.interrupted);
        assert_eq!(par.trials, 0);

        let expired = StopSignal::with_deadline(Instant::now());
        let res = Estimator::new(&cards("hA dA"), &[]).unwrap().stop(expired).run(&mut rng(1)).unwrap();
        assert!(res.interrupted);
        assert_eq!(res.trials, 0);

        let roomy = StopSignal::with_timeout(Duration::from_secs(3600));
        let res = Estimator::new(&cards("hA dA"), &[]).unwrap().simulations(50).stop(roomy).run(&mut rng(1)).unwrap();
        assert!(!res.interrupted);
        assert_eq!(res.trials, 50);
    }

    #[test]
    fn test_huge_opponent_count() {
        let hole = cards("hA dA");
        assert_eq!(calculate_win_probability(&hole, &[], usize::MAX, 5, &mut rng(3)).unwrap(), 0.0);
        assert_eq!(calculate_win_probability(&hole, &[], 1usize << 40, 5, &mut rng(3)).unwrap(), 0.0);

        let est = Estimator::new(&hole, &cards("h7 d8 c9")).unwrap().opponents(usize::MAX).simulations(5).run_parallel("big", 2).unwrap();
        assert_eq!(est.trials, 5);
    }

    #[test]
    fn test_no_card_dealt_twice() {
        let setups = [("hA dA", "", 1), ("hA dA", "h7 d8 c9", 3), ("sK sQ", "s2 s3 s4 hJ", 9), ("c5 d5", "h5 s5 hK dQ cJ", 5), ("h2 c3", "hA", 22)];
        let mut opponents = Vec::new();
        for (hole, board, num) in setups {
            let est = Estimator::new(&cards(hole), &cards(board)).unwrap().opponents(num);
            let known = CardMask::from_many(&cards(hole)) | CardMask::from_many(&cards(board));
            for seed in 0..200 {
                let board = est.deal(&mut opponents, &mut rng(seed));
                assert_eq!(opponents.len(), num);
                assert_eq!(board.count(), BOARD_SIZE);
                assert!(board.contains(est.community), "board lost a community card");

                // every hand and the new board cards are disjoint from each other and from the known cards
                let mut seen = known;
                for &dealt in opponents.iter().chain([board & !est.community].iter()) {
                    assert_eq!((seen & dealt).count(), 0, "card reused in {} with seed {}", dealt, seed);
                    seen = seen | dealt;
                }
                assert!(opponents.iter().all(|opp| opp.count() == HOLE_SIZE));
                assert_eq!(seen.count(), known.count() + HOLE_SIZE * num + BOARD_SIZE - est.community.count());
            }
        }
    }

    #[test]
    fn test_deck_underflow_skips() {
        let mut opponents = Vec::new();

        // 50 unknown cards seat 25 opponents, leaving nothing for the board
        let est = Estimator::new(&cards("hA dA"), &[]).unwrap().opponents(30);
        for seed in 0..20 {
            let board = est.deal(&mut opponents, &mut rng(seed));
            assert_eq!(opponents.len(), 25);
            assert_eq!(board, CardMask::NONE);
        }

        // 47 unknown cards seat 23, and the single card left cannot finish the flop
        let est = Estimator::new(&cards("hA dA"), &cards("h7 d8 c9")).unwrap().opponents(30);
        let board = est.deal(&mut opponents, &mut rng(1));
        assert_eq!(opponents.len(), 23);
        assert_eq!(board, CardMask::from_many(&cards("h7 d8 c9")));
    }

    #[test]
    fn test_timeout_overflow() {
        let never = StopSignal::with_timeout(Duration::MAX);
        assert!(!never.is_stopped());
        never.stop();
        assert!(never.is_stopped());
    }

    #[test]
    fn test_current_hand() {
        let est = Estimator::new(&cards("hA dA"), &cards("h7 d8 c9")).unwrap();
        assert_eq!(est.current_hand().name(), "pair");
        let est = Estimator::new(&cards("hA dA"), &[]).unwrap();
        assert_eq!(est.current_hand(), Evaluation::NotEnoughCards);
    }

    #[test]
    fn test_estimate_display() {
        let est = Estimate { wins: 17, trials: 20, requested: 20, interrupted: false };
        assert_eq!(est.to_string(), "85%");
        assert_eq!(format!("{:.1}", est), "85.0%");
        assert_eq!(Estimate::default().to_string(), "0%");
    }

    #[test]
    fn test_config_serde() {
        let config: SimConfig = serde_json::from_str(r#"{"opponents": 3, "showdown": "kickers"}"#).unwrap();
        assert_eq!(config, SimConfig { opponents: 3, simulations: 100, showdown: Showdown::Kickers });
        assert_eq!(serde_json::from_str::<SimConfig>("{}").unwrap(), SimConfig::default());
    }
}
