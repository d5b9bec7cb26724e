//! Combinatorial utilities, such as binomial coefficients and enumeration of r-length subsets (combinations)
use num::{Integer, PrimInt};

/// Binomial coefficient C(n, k)
pub fn binom<T: PrimInt + Integer>(n: T, k: T) -> T {
    // check out-of-bounds cases, which are considered to be 0
    if k < T::zero() || k > n {
        return T::zero();
    }

    // now, compute it iteratively by multiplying and dividing
    let mut res = T::one();
    let mut i = T::zero();
    while i < k {
        res = res * (n - i) / (i + T::one());
        i = i + T::one();
    }
    res
}

/// All `r`-length subsequences of `items`, each keeping the original relative order and using no element twice
///
/// There are exactly C(len, r) of them. `r == 0` gives the single empty subsequence, and `r > len` gives none.
pub fn combinations<T: Clone>(items: &[T], r: usize) -> Vec<Vec<T>> {
    if r == 0 {
        return vec![Vec::new()];
    }
    if items.len() < r {
        return Vec::new();
    }

    let mut res = Vec::new();
    for i in 0..=items.len() - r {
        // every combination starting with items[i] continues with an (r-1)-combination from strictly later items
        for rest in combinations(&items[i + 1..], r - 1) {
            let mut combo = Vec::with_capacity(r);
            combo.push(items[i].clone());
            combo.extend(rest);
            res.push(combo);
        }
    }
    res
}

/// An iterator over the index arrays of all `R`-subsets of `0..n`, in the same lexicographic order as [combinations]
///
/// This never allocates, which matters when it is run for every hand in a simulation.
#[derive(Debug, Clone)]
pub struct Combinations<const R: usize> {
    n: usize,
    indices: [usize; R],
    started: bool,
    done: bool,
}

impl<const R: usize> Combinations<R> {
    pub fn new(n: usize) -> Self {
        let mut indices = [0; R];
        for (i, idx) in indices.iter_mut().enumerate() {
            *idx = i;
        }
        Self { n, indices, started: false, done: R > n }
    }
}

impl<const R: usize> Iterator for Combinations<R> {
    type Item = [usize; R];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices);
        }

        // find the rightmost position that can still be advanced
        let Some(i) = (0..R).rev().find(|&i| self.indices[i] != i + self.n - R) else {
            self.done = true;
            return None;
        };
        self.indices[i] += 1;
        for j in i + 1..R {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.indices)
    }
}
