//! Gradient-boosted regression trees with the squared-error objective.
//!
//! Each round fits a `gbdt` [`DecisionTree`] to the residuals of the current
//! ensemble, on a row sample and a column sample drawn once per tree.
//! `gbdt::gradient_boost::GBDT` draws its samples from `thread_rng`, so the rounds
//! are driven here from one seeded `StdRng` instead: a fixed `(data, params)` pair
//! always produces the same model.

use crate::services::features::FeatureMatrix;
use gbdt::config::Loss;
use gbdt::decision_tree::{Data, DataVec, DecisionTree, TrainingCache, ValueType};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Feature orderings are sorted once per tree and shared by every node split.
const CACHE_LEVEL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoosterParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub subsample: f64,
    pub colsample_bytree: f64,
    /// Nodes with this many rows or fewer become leaves.
    pub min_leaf_size: usize,
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 8,
            subsample: 0.9,
            colsample_bytree: 0.9,
            min_leaf_size: 1,
            seed: 0,
        }
    }
}

impl BoosterParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.n_estimators == 0 {
            return Err("n_estimators must be >= 1".to_string());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err("learning_rate must be finite and > 0".to_string());
        }
        if self.max_depth == 0 || u32::try_from(self.max_depth).is_err() {
            return Err(format!("max_depth must be in [1, {}]", u32::MAX));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err("subsample must be in (0, 1]".to_string());
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return Err("colsample_bytree must be in (0, 1]".to_string());
        }
        if self.min_leaf_size == 0 {
            return Err("min_leaf_size must be >= 1".to_string());
        }
        Ok(())
    }

    fn rows_per_tree(&self, n_rows: usize) -> usize {
        ((self.subsample * n_rows as f64).floor() as usize).clamp(1, n_rows)
    }

    fn columns_per_tree(&self, n_features: usize) -> usize {
        ((self.colsample_bytree * n_features as f64).floor() as usize).clamp(1, n_features)
    }
}

/// A tree together with the feature columns it was trained on.
#[derive(Debug)]
struct Round {
    columns: Vec<usize>,
    tree: DecisionTree,
}

#[derive(Debug)]
pub struct GradientBoostedRegressor {
    base_score: f64,
    learning_rate: f64,
    n_features: usize,
    rounds: Vec<Round>,
}

impl GradientBoostedRegressor {
    pub fn fit(x: &FeatureMatrix, y: &[f64], params: &BoosterParams) -> Result<Self, String> {
        params.validate()?;
        if x.is_empty() {
            return Err("cannot fit a model on 0 rows".to_string());
        }
        if x.n_rows() != y.len() {
            return Err(format!(
                "feature rows ({}) and targets ({}) differ in length",
                x.n_rows(),
                y.len()
            ));
        }
        if x.n_features() == 0 {
            return Err("cannot fit a model without features".to_string());
        }
        if let Some(idx) = y.iter().position(|v| !v.is_finite()) {
            return Err(format!("target value at row {idx} is not finite"));
        }
        let max_depth = u32::try_from(params.max_depth)
            .map_err(|_| format!("max_depth {} is out of range", params.max_depth))?;

        let n = x.n_rows();
        let n_features = x.n_features();
        let rows_per_tree = params.rows_per_tree(n);
        let columns_per_tree = params.columns_per_tree(n_features);
        let base_score = y.iter().sum::<f64>() / n as f64;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut predictions = vec![base_score; n];
        let mut rounds = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let rows = draw(&mut rng, n, rows_per_tree);
            let columns = draw(&mut rng, n_features, columns_per_tree);
            let residuals: Vec<f64> = y
                .iter()
                .zip(&predictions)
                .map(|(target, pred)| target - pred)
                .collect();
            let data = training_data(x, &columns, &residuals);

            let mut tree = DecisionTree::new();
            tree.set_feature_size(columns.len());
            tree.set_max_depth(max_depth);
            tree.set_min_leaf_size(params.min_leaf_size);
            tree.set_loss(Loss::SquaredError);
            let mut cache = TrainingCache::get_cache(columns.len(), &data, CACHE_LEVEL);
            tree.fit_n(&data, &rows, &mut cache);

            for (pred, step) in predictions.iter_mut().zip(tree.predict(&data)) {
                *pred += params.learning_rate * f64::from(step);
            }
            rounds.push(Round { columns, tree });
        }

        Ok(Self {
            base_score,
            learning_rate: params.learning_rate,
            n_features,
            rounds,
        })
    }

    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>, String> {
        if x.is_empty() {
            return Ok(Vec::new());
        }
        if x.n_features() != self.n_features {
            return Err(format!(
                "model expects {} features, got {}",
                self.n_features,
                x.n_features()
            ));
        }

        let mut predictions = vec![self.base_score; x.n_rows()];
        for round in &self.rounds {
            let steps = round.tree.predict(&test_data(x, &round.columns));
            for (pred, step) in predictions.iter_mut().zip(steps) {
                *pred += self.learning_rate * f64::from(step);
            }
        }
        Ok(predictions)
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn n_trees(&self) -> usize {
        self.rounds.len()
    }
}

/// `amount` distinct indices from `0..len`, ascending. Leaves the RNG untouched
/// when every index is taken.
fn draw(rng: &mut StdRng, len: usize, amount: usize) -> Vec<usize> {
    if amount >= len {
        return (0..len).collect();
    }
    let mut picked = index::sample(rng, len, amount).into_vec();
    picked.sort_unstable();
    picked
}

fn project(row: &[f64], columns: &[usize]) -> Vec<ValueType> {
    columns.iter().map(|&col| row[col] as ValueType).collect()
}

fn training_data(x: &FeatureMatrix, columns: &[usize], residuals: &[f64]) -> DataVec {
    residuals
        .iter()
        .enumerate()
        .map(|(idx, &residual)| {
            Data::new_training_data(project(x.row(idx), columns), 1.0, residual as ValueType, None)
        })
        .collect()
}

fn test_data(x: &FeatureMatrix, columns: &[usize]) -> DataVec {
    (0..x.n_rows())
        .map(|idx| Data::new_test_data(project(x.row(idx), columns), None))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{draw, BoosterParams, GradientBoostedRegressor};
    use crate::services::features::FeatureMatrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn synthetic(n: usize) -> (FeatureMatrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![(i % 17) as f64, (i / 17) as f64, (i % 5) as f64])
            .collect();
        let y = rows
            .iter()
            .map(|r| 100.0 + 3.0 * r[0] - 2.0 * r[1] + if r[2] > 2.0 { 25.0 } else { 0.0 })
            .collect();
        (FeatureMatrix::from_rows(&rows).expect("matrix"), y)
    }

    fn mse(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>() / a.len() as f64
    }

    #[test]
    fn default_params_match_fixed_hyperparameters() {
        let params = BoosterParams::default();
        assert_eq!(params.n_estimators, 100);
        assert_eq!(params.max_depth, 8);
        assert_eq!(params.min_leaf_size, 1);
        assert!((params.learning_rate - 0.1).abs() < 1e-12);
        assert!((params.subsample - 0.9).abs() < 1e-12);
        assert!((params.colsample_bytree - 0.9).abs() < 1e-12);
        assert_eq!(params.columns_per_tree(4), 3);
        assert_eq!(params.columns_per_tree(1), 1);
        assert_eq!(params.rows_per_tree(48), 43);
        assert_eq!(params.rows_per_tree(1), 1);
    }

    #[test]
    fn draw_is_sorted_distinct_and_seeded() {
        let a = draw(&mut StdRng::seed_from_u64(7), 50, 45);
        let b = draw(&mut StdRng::seed_from_u64(7), 50, 45);
        assert_eq!(a, b);
        assert_eq!(a.len(), 45);
        assert!(a.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(a.iter().all(|&idx| idx < 50));
        assert_eq!(draw(&mut StdRng::seed_from_u64(7), 4, 4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn boosting_reduces_training_error() {
        let (x, y) = synthetic(200);
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let baseline = mse(&vec![mean; y.len()], &y);

        let model = GradientBoostedRegressor::fit(&x, &y, &BoosterParams::default()).expect("fit");
        let preds = model.predict(&x).expect("predict");
        assert_eq!(model.n_trees(), 100);
        assert!((model.base_score() - mean).abs() < 1e-9);
        assert!(mse(&preds, &y) < baseline * 0.05);
    }

    #[test]
    fn same_seed_same_predictions() {
        let (x, y) = synthetic(120);
        let params = BoosterParams::default();
        let a = GradientBoostedRegressor::fit(&x, &y, &params).expect("fit");
        let b = GradientBoostedRegressor::fit(&x, &y, &params).expect("fit");
        assert_eq!(a.predict(&x).expect("a"), b.predict(&x).expect("b"));
    }

    #[test]
    fn no_sampling_path_is_deterministic_regardless_of_seed() {
        let (x, y) = synthetic(60);
        let base = BoosterParams {
            subsample: 1.0,
            colsample_bytree: 1.0,
            n_estimators: 10,
            ..BoosterParams::default()
        };
        let a = GradientBoostedRegressor::fit(&x, &y, &base).expect("fit");
        let b = GradientBoostedRegressor::fit(&x, &y, &BoosterParams { seed: 99, ..base })
            .expect("fit");
        assert_eq!(a.predict(&x).expect("a"), b.predict(&x).expect("b"));
    }

    #[test]
    fn rejects_invalid_inputs() {
        let (x, y) = synthetic(10);
        let bad = BoosterParams {
            learning_rate: 0.0,
            ..BoosterParams::default()
        };
        assert!(GradientBoostedRegressor::fit(&x, &y, &bad).is_err());
        let bad = BoosterParams {
            min_leaf_size: 0,
            ..BoosterParams::default()
        };
        assert!(GradientBoostedRegressor::fit(&x, &y, &bad).is_err());
        assert!(GradientBoostedRegressor::fit(&x, &y[..5], &BoosterParams::default()).is_err());

        let empty = FeatureMatrix::from_rows(&[]).expect("empty");
        assert!(GradientBoostedRegressor::fit(&empty, &[], &BoosterParams::default()).is_err());

        let mut with_nan = y.clone();
        with_nan[3] = f64::NAN;
        let err = GradientBoostedRegressor::fit(&x, &with_nan, &BoosterParams::default())
            .expect_err("nan target");
        assert!(err.contains("row 3"));
    }

    #[test]
    fn predict_rejects_wrong_width() {
        let (x, y) = synthetic(30);
        let model = GradientBoostedRegressor::fit(
            &x,
            &y,
            &BoosterParams {
                n_estimators: 2,
                ..BoosterParams::default()
            },
        )
        .expect("fit");
        let narrow = FeatureMatrix::from_rows(&[vec![1.0]]).expect("matrix");
        assert!(model.predict(&narrow).is_err());
        let empty = FeatureMatrix::from_rows(&[]).expect("empty");
        assert_eq!(model.predict(&empty).expect("empty"), Vec::<f64>::new());
    }
}
