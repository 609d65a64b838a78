//! Random input generation for the `generate` subcommand.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::Input;

/// Ranks are a uniform random permutation of `1..=n`; weights are uniform in
/// `[0, 1)`, or all 1 with `unit_weights`.
pub fn generate(n: usize, seed: Option<u64>, unit_weights: bool) -> Input {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut rank: Vec<usize> = (1..=n).collect();
    rank.shuffle(&mut rng);

    let weight = if unit_weights {
        vec![1.0; n]
    } else {
        (0..n).map(|_| rng.gen::<f64>()).collect()
    };

    Input { rank, weight }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_permutation() {
        let input = generate(257, Some(7), false);
        let mut sorted = input.rank.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=257).collect::<Vec<_>>());
        assert!(input.weight.iter().all(|&w| (0.0..1.0).contains(&w)));
    }

    #[test]
    fn test_generate_seeded_is_reproducible() {
        let a = generate(100, Some(42), false);
        let b = generate(100, Some(42), false);
        assert_eq!(a.rank, b.rank);
        assert_eq!(a.weight, b.weight);
    }

    #[test]
    fn test_unit_weights() {
        let input = generate(10, Some(1), true);
        assert_eq!(input.weight, vec![1.0; 10]);
    }
}
