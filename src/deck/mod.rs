//! Defines the standard deck of cards and masks for working with unordered sets of them
//!
//! Cards are packed into a single `u8` index (`rank + 13 * suit`), and sets of cards are bitmasks over those indices, which makes mask arithmetic the natural way to build decks, exclude known cards, and deal without replacement.
//!
//! The text form of a card is suit-first, e.g. `hA`, `d10`, `s2`.
//!

use rand::Rng;

use core::fmt;
use std::fmt::{Debug, Display};
use std::str::FromStr;
use std::ops::{BitOr, BitAnd, Not};

use serde::{Serialize, Deserialize};

// a helper that counts the number of items in a sequence of macro arguments
macro_rules! count_items {
    () => { 0 };
    ($head:ident $(, $tail:ident)*) => { 1 + count_items!($($tail),*) };
}

// a macro that defines a 'kind', which is a packed enumeration of items with associated data per each
macro_rules! make_kind {
    (
        $kind:ident($type:ident) : $repr:ty {
            $( $name:ident => $data:expr ),* $(,)?
        }
    ) => {
        #[repr($repr)]
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub enum $kind {
            $( $name , )*
        }

        impl $kind {
            pub const NUM: usize = count_items!($( $name ),*);
            pub const ALL: [Self; Self::NUM] = [
                $( Self::$name , )*
            ];

            pub const DATA: &'static [$type; Self::NUM] = &[
                $( $data, )*
            ];

            pub const fn index(self) -> $repr {
                self as $repr
            }

            pub const fn from_index(index: $repr) -> Self {
                Self::ALL[index as usize]
            }

            pub const fn data(self) -> &'static $type {
                &Self::DATA[self.index() as usize]
            }
        }

        impl Display for $kind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.data().text)
            }
        }

        impl FromStr for $kind {
            type Err = &'static str;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL.iter()
                    .copied()
                    .find(|k| k.data().text == s)
                    .ok_or("invalid variant")
            }
        }
    };
}

macro_rules! make_kind_prod {
    (
        $kind:ident : $repr:ty = ($lname:ident: $lkind:ty) * ($rname:ident: $rkind:ty)
    ) => {
        // packed combination of two kinds into a single integer
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $kind($repr);

        impl $kind {
            pub const NUM: usize = <$lkind>::NUM * <$rkind>::NUM;
            pub const ALL: [Self; Self::NUM] = {
                let mut all = [Self(0); Self::NUM];
                let mut i = 0;
                while i < Self::NUM {
                    all[i] = Self::from_index(i as $repr);
                    i += 1;
                }
                all
            };

            pub const fn new($lname: $lkind, $rname: $rkind) -> Self {
                Self::from_index($lname.index() + $rname.index() * <$lkind>::NUM as $repr)
            }

            pub const fn from_index(index: $repr) -> Self {
                Self(index)
            }

            pub const fn index(self) -> $repr {
                self.0
            }

            pub const fn $lname(self) -> $lkind {
                <$lkind>::ALL[self.0 as usize % <$lkind>::NUM]
            }

            pub const fn $rname(self) -> $rkind {
                <$rkind>::ALL[self.0 as usize / <$lkind>::NUM]
            }
        }
    };
}

macro_rules! make_mask {
    (
        $(#[$attr:meta])* $mask:ident : $repr:ty = { $name:ident: $kind:ty }
    ) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        $(#[$attr])*
        pub struct $mask($repr);

        impl $mask {
            pub const NONE: Self = Self::new(0);
            pub const FULL: Self = Self::new(((1 as $repr) << <$kind>::NUM) - 1);

            pub const fn new(bits: $repr) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> $repr {
                self.0
            }

            pub fn from_many(many: &[$kind]) -> Self {
                many.iter().fold(Self::NONE, |mask, &k| mask | Self::from(k))
            }

            pub const fn empty(&self) -> bool {
                self.bits() == 0
            }

            pub const fn count(&self) -> usize {
                self.bits().count_ones() as usize
            }

            pub const fn contains(&self, other: Self) -> bool {
                (self.bits() & other.bits()) == other.bits()
            }

            pub const fn inverse(&self) -> Self {
                Self::new(Self::FULL.bits() ^ self.bits())
            }

            /// The `n`-th member in ascending index order, if there are more than `n` members
            pub fn nth(&self, n: usize) -> Option<$kind> {
                let mut bits = self.bits();
                for _ in 0..n {
                    if bits == 0 {
                        return None;
                    }
                    // clear the lowest set bit
                    bits &= bits - 1;
                }
                if bits == 0 {
                    None
                } else {
                    Some(<$kind>::from_index(bits.trailing_zeros() as _))
                }
            }

            pub fn iter(&self) -> impl Iterator<Item = $kind> {
                let mask = *self;
                <$kind>::ALL.into_iter().filter(move |&k| mask.contains(Self::from(k)))
            }

            pub fn iter_reverse(&self) -> impl Iterator<Item = $kind> {
                let mask = *self;
                <$kind>::ALL.into_iter().rev().filter(move |&k| mask.contains(Self::from(k)))
            }

            pub fn top(&self) -> Option<$kind> { self.iter_reverse().next() }

            pub fn bottom(&self) -> Option<$kind> { self.iter().next() }
        }

        impl BitOr for $mask {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self::new(self.bits() | other.bits())
            }
        }

        impl BitAnd for $mask {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self::new(self.bits() & other.bits())
            }
        }

        // inverse
        impl Not for $mask {
            type Output = Self;
            fn not(self) -> Self {
                self.inverse()
            }
        }

        impl From<$kind> for $mask {
            fn from($name: $kind) -> Self {
                Self::new((1 as $repr) << $name.index())
            }
        }

        impl Display for $mask {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // to display, just emit all the members of the mask as a string
                for k in self.iter_reverse() {
                    write!(f, "{}", k)?;
                }
                Ok(())
            }
        }

        impl Debug for $mask {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}::from(\"", stringify!($mask))?;
                for (i, k) in self.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", k)?;
                }
                write!(f, "\")")?;
                Ok(())
            }
        }

        impl FromStr for $mask {
            type Err = &'static str;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut mask = Self::NONE;
                for token in s.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
                    for k in parse_run::<$kind>(token)? {
                        mask = mask | Self::from(k);
                    }
                }
                Ok(mask)
            }
        }

        #[cfg(test)]
        impl From<&str> for $mask {
            fn from(s: &str) -> Self {
                Self::from_str(s).unwrap()
            }
        }
    }
}

/// Longest text form of any rank, suit, or card (`h10`)
const MAX_TEXT_LEN: usize = 3;

/// Split a run of concatenated tokens (like `hAd10`) by greedily matching the longest valid prefix
fn parse_run<K: FromStr>(run: &str) -> Result<Vec<K>, &'static str> {
    let mut out = Vec::new();
    let mut rest = run;
    'outer: while !rest.is_empty() {
        for len in (1..=MAX_TEXT_LEN.min(rest.len())).rev() {
            if let Some(Ok(k)) = rest.get(..len).map(K::from_str) {
                out.push(k);
                rest = &rest[len..];
                continue 'outer;
            }
        }
        return Err("invalid token in card list");
    }
    Ok(out)
}

/// Per-rank data
pub struct RankData {
    pub text: &'static str,
}

make_kind! {
    Rank(RankData) : u8 {
        Two      => RankData { text: "2" },
        Three    => RankData { text: "3" },
        Four     => RankData { text: "4" },
        Five     => RankData { text: "5" },
        Six      => RankData { text: "6" },
        Seven    => RankData { text: "7" },
        Eight    => RankData { text: "8" },
        Nine     => RankData { text: "9" },
        Ten      => RankData { text: "10" },
        Jack     => RankData { text: "J" },
        Queen    => RankData { text: "Q" },
        King     => RankData { text: "K" },
        Ace      => RankData { text: "A" },
    }
}

/// Per-suit data
pub struct SuitData {
    pub text: &'static str,
}

make_kind! {
    Suit(SuitData) : u8 {
        Hearts   => SuitData { text: "h" },
        Diamonds => SuitData { text: "d" },
        Clubs    => SuitData { text: "c" },
        Spades   => SuitData { text: "s" },
    }
}

make_kind_prod! {
    Card : u8 = (rank: Rank) * (suit: Suit)
}

impl Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit(), self.rank())
    }
}

impl FromStr for Card {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // suit letter first, then the rank token
        match (s.get(..1), s.get(1..)) {
            (Some(suit), Some(rank)) if !rank.is_empty() => {
                Ok(Self::new(Rank::from_str(rank)?, Suit::from_str(suit)?))
            }
            _ => Err("invalid card"),
        }
    }
}

make_mask! {
    /// An unordered set of ranks
    RankMask : u16 = { rank: Rank }
}

make_mask! {
    /// An unordered set of cards, which can contain anywhere between 0 and 52 cards
    CardMask : u64 = { card: Card }
}

impl CardMask {

    pub fn to_vec(self) -> Vec<Card> {
        self.iter().collect()
    }
}

/// A deck of cards, which is the full 52 cards minus whatever was excluded when it was created
///
/// Dealing removes cards from the deck, so a copy of a deck can be dealt from freely without touching the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deck {
    cards: CardMask,
}

impl Deck {

    /// The cards still in the deck
    pub fn cards(&self) -> CardMask {
        self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.count()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(card.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = Card> {
        self.cards.iter()
    }

    /// Deal `num` cards uniformly at random and remove them from the deck
    ///
    /// If fewer than `num` cards remain, nothing is dealt and the deck is left as is.
    pub fn deal<R: Rng>(&mut self, num: usize, rng: &mut R) -> Option<CardMask> {
        let dealt = sample_cards(self.cards, num, rng)?;
        self.cards = self.cards & !dealt;
        Some(dealt)
    }
}

/// Create a deck of all 52 cards, minus the cards in `exclude`
pub fn create_deck(exclude: CardMask) -> Deck {
    Deck { cards: CardMask::FULL & !exclude }
}

/// Randomly samples `num` cards from `src`, a set of available cards (unordered, without replacement)
///
/// Returns `None` if `src` has fewer than `num` cards. The RNG is called exactly `num` times.
pub fn sample_cards<R: Rng>(src: CardMask, num: usize, rng: &mut R) -> Option<CardMask> {
    if src.count() < num {
        return None;
    }

    let mut left = src;
    let mut res = CardMask::NONE;
    for _ in 0..num {
        // pick uniformly among whatever is left, by position within the mask
        let card = left.nth(rng.random_range(0..left.count()))?;
        res = res | CardMask::from(card);
        left = left & !CardMask::from(card);
    }
    Some(res)
}

/// Parse a list of cards in the same forms a [CardMask] accepts, keeping order and duplicates
pub fn parse_cards(s: &str) -> Result<Vec<Card>, &'static str> {
    let mut cards = Vec::new();
    for token in s.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        cards.extend(parse_run::<Card>(token)?);
    }
    Ok(cards)
}

/// Format a list of cards as space-separated tokens, e.g. `hA dK`
pub fn format_cards(cards: &[Card]) -> String {
    cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
}
