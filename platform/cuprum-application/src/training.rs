use crate::acquisition::PriceTable;
use crate::config::ModelConfig;
use cuprum_domain::services::features::{build_dataset, select_values};
use cuprum_domain::services::gbt::GradientBoostedRegressor;
use cuprum_domain::services::regression_metrics::RegressionScores;
use cuprum_domain::services::split::train_test_split;
use serde::Serialize;
use std::time::Instant;
use tracing::info_span;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingOutcome {
    pub n_train: usize,
    pub n_test: usize,
    pub r2: f64,
    /// Square root of R², reported as the model score. NaN when R² < 0.
    pub sqrt_r2: f64,
    pub rmse: f64,
    pub mae: f64,
    pub predictions: Vec<f64>,
    pub actuals: Vec<f64>,
}

/// Fits the booster on a seeded hold-out split and scores it on the held-out rows.
/// The model is not kept.
pub fn train_and_evaluate(table: &PriceTable, config: &ModelConfig) -> Result<TrainingOutcome, String> {
    let _span = info_span!(
        "train",
        rows = table.len(),
        n_estimators = config.n_estimators,
        max_depth = config.max_depth,
        split_seed = config.split_seed,
        model_seed = config.model_seed
    )
    .entered();

    let (x, y) = build_dataset(&table.records)?;
    let split = train_test_split(x.n_rows(), config.test_size, config.split_seed)
        .map_err(|err| format!("insufficient data after cleaning: {err}"))?;
    tracing::info!(
        n_train = split.train.len(),
        n_test = split.test.len(),
        "split price table"
    );

    let x_train = x.select_rows(&split.train);
    let y_train = select_values(&y, &split.train);
    let x_test = x.select_rows(&split.test);
    let y_test = select_values(&y, &split.test);

    let fit_start = Instant::now();
    let model = GradientBoostedRegressor::fit(&x_train, &y_train, &config.booster_params())?;
    let fit_ms = fit_start.elapsed().as_millis() as f64;
    metrics::histogram!("cuprum.train.fit_ms").record(fit_ms);
    tracing::info!(trees = model.n_trees(), base_score = model.base_score(), fit_ms, "fitted model");

    let predictions = model.predict(&x_test)?;
    let scores = RegressionScores::compute(&y_test, &predictions)?;
    if scores.r2 < 0.0 {
        tracing::warn!(r2 = scores.r2, "negative R² on held-out rows; sqrt(R²) is NaN");
    }
    tracing::info!(
        r2 = scores.r2,
        sqrt_r2 = scores.sqrt_r2,
        rmse = scores.rmse,
        mae = scores.mae,
        "evaluated model"
    );
    metrics::gauge!("cuprum.train.r2").set(scores.r2);
    metrics::gauge!("cuprum.train.rmse").set(scores.rmse);

    Ok(TrainingOutcome {
        n_train: split.train.len(),
        n_test: split.test.len(),
        r2: scores.r2,
        sqrt_r2: scores.sqrt_r2,
        rmse: scores.rmse,
        mae: scores.mae,
        predictions,
        actuals: y_test,
    })
}
