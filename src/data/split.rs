//! Seeded train/test split.

use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with `seed` and hold out `ceil(n_rows * test_fraction)` rows.
///
/// The held-out count is clamped so both sides keep at least one row.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> Result<Split, String> {
    if n_rows < 2 {
        return Err(format!("Need at least 2 rows to split, got {n_rows}"));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(format!("Test fraction must be in (0, 1), got {test_fraction}"));
    }
    let n_test = (n_rows as f64 * test_fraction).ceil() as usize;
    let n_test = n_test.clamp(1, n_rows - 1);

    let mut permutation: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(n_test);
    Ok(Split {
        train,
        test: permutation,
    })
}
