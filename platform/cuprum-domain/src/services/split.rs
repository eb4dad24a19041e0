use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffled hold-out split. `ceil(test_size * n)` rows go to the test side; the
/// shuffle is seeded so the same `(n, test_size, seed)` always yields the same split.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<SplitIndices, String> {
    if !test_size.is_finite() || test_size <= 0.0 || test_size >= 1.0 {
        return Err(format!("test_size must be in (0, 1), got {test_size}"));
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(format!(
            "not enough rows to split: rows={n} test_size={test_size} (train={n_train}, test={n_test})"
        ));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(SplitIndices {
        train,
        test: indices,
    })
}
