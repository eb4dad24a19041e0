use serde::Serialize;

/// Hold-out scores for one trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionScores {
    pub r2: f64,
    pub sqrt_r2: f64,
    pub rmse: f64,
    pub mae: f64,
    pub n: usize,
}

impl RegressionScores {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self, String> {
        ensure_same_len(y_true, y_pred)?;
        let r2 = r2_score(y_true, y_pred)?;
        Ok(Self {
            r2,
            sqrt_r2: sqrt_r2(r2),
            rmse: rmse(y_true, y_pred)?,
            mae: mae(y_true, y_pred)?,
            n: y_true.len(),
        })
    }
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// Fewer than two samples give `NaN`. A constant target gives `1.0` for a perfect
/// prediction and `0.0` otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64, String> {
    ensure_same_len(y_true, y_pred)?;
    if y_true.len() < 2 {
        return Ok(f64::NAN);
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Square root of R². Negative R² has no real root and yields `NaN`.
pub fn sqrt_r2(r2: f64) -> f64 {
    if r2 < 0.0 {
        f64::NAN
    } else {
        r2.sqrt()
    }
}

pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64, String> {
    ensure_same_len(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(f64::NAN);
    }
    let sse: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    Ok((sse / y_true.len() as f64).sqrt())
}

pub fn mae(y_true: &[f64], y_pred: &[f64]) -> Result<f64, String> {
    ensure_same_len(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(f64::NAN);
    }
    let sae: f64 = y_true.iter().zip(y_pred).map(|(y, p)| (y - p).abs()).sum();
    Ok(sae / y_true.len() as f64)
}

fn ensure_same_len(y_true: &[f64], y_pred: &[f64]) -> Result<(), String> {
    if y_true.len() != y_pred.len() {
        return Err(format!(
            "y_true and y_pred differ in length ({} vs {})",
            y_true.len(),
            y_pred.len()
        ));
    }
    Ok(())
}
