// ============================================================
// Layer 4 — Seeded Subsampler
// ============================================================
// Picks a random subset of a split for quick runs
// (`--train-limit` / `--test-limit`).
//
// The shuffle is a Fisher-Yates via rand::seq::SliceRandom,
// driven by a StdRng seeded from the run seed, so the same
// seed always selects the same digits.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::digit::DigitSplit;

/// Return at most `limit` digits of `split`, chosen at random.
///
/// A `limit` of `None`, or one at least as large as the split,
/// returns the split unchanged (and unshuffled).
pub fn take_random(split: DigitSplit, limit: Option<usize>, seed: u64) -> DigitSplit {
    let total = split.len();
    let limit = match limit {
        Some(limit) if limit < total => limit,
        _ => return split,
    };

    let mut rng     = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..total).collect();
    indices.shuffle(&mut rng);
    indices.truncate(limit);

    tracing::debug!("Subsampled {} of {} digits (seed {})", limit, total, seed);

    split.select(&indices)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::digit::PIXELS_PER_IMAGE;

    fn split_of(n: usize) -> DigitSplit {
        let images = (0..n).flat_map(|i| vec![i as u8; PIXELS_PER_IMAGE]).collect();
        let labels = (0..n).map(|i| (i % 10) as u8).collect();
        DigitSplit::new(images, labels)
    }

    #[test]
    fn test_limit_size() {
        let subset = take_random(split_of(50), Some(12), 7);
        assert_eq!(subset.len(), 12);
        assert_eq!(subset.images.len(), 12 * PIXELS_PER_IMAGE);
    }

    #[test]
    fn test_same_seed_same_subset() {
        let a = take_random(split_of(40), Some(5), 1337);
        let b = take_random(split_of(40), Some(5), 1337);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.images, b.images);
    }

    #[test]
    fn test_pairs_stay_aligned() {
        let subset = take_random(split_of(30), Some(10), 3);
        for i in 0..subset.len() {
            // Image i was filled with its original index
            let original = subset.image(i).unwrap()[0] as usize;
            assert_eq!(subset.labels[i] as usize, original % 10);
        }
    }

    #[test]
    fn test_no_limit_is_identity() {
        let split = split_of(8);
        assert_eq!(take_random(split.clone(), None, 0).labels, split.labels);
        assert_eq!(take_random(split.clone(), Some(100), 0).labels, split.labels);
    }
}
