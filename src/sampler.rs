//! Batched Bernoulli event sampling.
//!
//! Recombination decides one weighted boolean per inter-locus gap, which adds
//! up to a lot of draws per offspring. This module amortizes that cost: the
//! uniform-probability case skips between successes with a geometric
//! distribution instead of drawing every trial, and the heterogeneous case
//! falls back to one draw per trial. Both paths produce independent outcomes
//! and are observationally indistinguishable to callers.

use rand::Rng;
use rand_distr::Geometric;

/// Sample `len` independent Bernoulli outcomes, all with probability `p`.
///
/// Probabilities 0 and 1 are handled exactly. For intermediate `p` the
/// positions of successes are generated by geometric skip-sampling, so the
/// cost scales with the number of successes rather than the number of trials.
pub fn sample_uniform<R: Rng + ?Sized>(p: f64, len: usize, rng: &mut R) -> Vec<bool> {
    debug_assert!((0.0..=1.0).contains(&p));
    if len == 0 || p <= 0.0 {
        return vec![false; len];
    }
    if p >= 1.0 {
        return vec![true; len];
    }

    let mut outcomes = vec![false; len];
    // Geometric(p) yields the number of failures before the next success.
    let geo = Geometric::new(p).expect("probability checked above");
    let mut pos = 0usize;
    loop {
        let skip: u64 = rng.sample(geo);
        pos += skip as usize;
        if pos >= len {
            break;
        }
        outcomes[pos] = true;
        pos += 1;
    }
    outcomes
}

/// Sample one independent Bernoulli outcome per entry of `probs`.
///
/// Chooses the uniform fast path when every probability is identical.
pub fn sample<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> Vec<bool> {
    if probs.is_empty() {
        return Vec::new();
    }
    let first = probs[0];
    if probs.iter().all(|&p| p == first) {
        return sample_uniform(first, probs.len(), rng);
    }
    probs
        .iter()
        .map(|&p| {
            debug_assert!((0.0..=1.0).contains(&p));
            if p <= 0.0 {
                false
            } else if p >= 1.0 {
                true
            } else {
                rng.random::<f64>() < p
            }
        })
        .collect()
}
